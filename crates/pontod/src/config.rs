use std::path::PathBuf;
use std::str::FromStr;

use ponto_core::DEFAULT_SIMILARITY_THRESHOLD;

const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_FOR_PRODUCTION";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Daemon configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address (default: 0.0.0.0:8000).
    pub bind_addr: String,
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
    /// Directory where enrollment and punch photos are written.
    pub photos_dir: PathBuf,
    /// Directory containing det_10g.onnx and w600k_r50.onnx.
    pub model_dir: PathBuf,
    /// Minimum similarity for an accepted punch. Stricter deployments raise it.
    pub similarity_threshold: f32,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    /// The single static credential.
    pub admin_username: String,
    pub admin_password: String,
    /// Request body limit for selfie uploads.
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from `PONTO_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            bind_addr: string("PONTO_BIND_ADDR", "0.0.0.0:8000"),
            db_path: PathBuf::from(string("PONTO_DB_PATH", "ponto.db")),
            photos_dir: PathBuf::from(string("PONTO_PHOTOS_DIR", "data/photos")),
            model_dir: lookup("PONTO_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(ponto_core::default_model_dir),
            similarity_threshold: threshold(&lookup),
            jwt_secret: string("PONTO_JWT_SECRET", DEFAULT_JWT_SECRET),
            admin_username: string("PONTO_ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME),
            admin_password: string("PONTO_ADMIN_PASSWORD", DEFAULT_ADMIN_PASSWORD),
            max_upload_bytes: parse_var(&lookup, "PONTO_MAX_UPLOAD_BYTES").unwrap_or(10 * 1024 * 1024),
        }
    }

    /// Names of settings still at their shipped, publicly known values.
    pub fn insecure_defaults(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            out.push("PONTO_JWT_SECRET");
        }
        if self.admin_password == DEFAULT_ADMIN_PASSWORD {
            out.push("PONTO_ADMIN_PASSWORD");
        }
        out
    }
}

/// Similarity scores live in [-1, 1]; anything else falls back to the default.
fn threshold(lookup: &impl Fn(&str) -> Option<String>) -> f32 {
    const KEY: &str = "PONTO_SIMILARITY_THRESHOLD";
    let Some(raw) = lookup(KEY) else {
        return DEFAULT_SIMILARITY_THRESHOLD;
    };
    match raw.trim().parse::<f32>() {
        Ok(t) if t.is_finite() && (-1.0..=1.0).contains(&t) => t,
        _ => {
            tracing::warn!(
                var = KEY,
                value = %raw,
                fallback = DEFAULT_SIMILARITY_THRESHOLD,
                "threshold must be a number in [-1, 1]"
            );
            DEFAULT_SIMILARITY_THRESHOLD
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[("PONTO_MODEL_DIR", "/models")]);
        assert_eq!(config.bind_addr, "0.0.0.0:8000");
        assert_eq!(config.db_path, PathBuf::from("ponto.db"));
        assert_eq!(config.photos_dir, PathBuf::from("data/photos"));
        assert_eq!(config.model_dir, PathBuf::from("/models"));
        assert!((config.similarity_threshold - 0.80).abs() < 1e-6);
        assert_eq!(config.insecure_defaults(), vec!["PONTO_JWT_SECRET", "PONTO_ADMIN_PASSWORD"]);
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("PONTO_SIMILARITY_THRESHOLD", "0.9"),
            ("PONTO_JWT_SECRET", "s3cret"),
            ("PONTO_ADMIN_PASSWORD", "hunter2"),
            ("PONTO_MAX_UPLOAD_BYTES", "1024"),
        ]);
        assert!((config.similarity_threshold - 0.9).abs() < 1e-6);
        assert_eq!(config.max_upload_bytes, 1024);
        assert!(config.insecure_defaults().is_empty());
    }

    #[test]
    fn test_out_of_range_threshold_falls_back() {
        for raw in ["NaN", "inf", "80", "-1.5"] {
            let config = config_with(&[("PONTO_SIMILARITY_THRESHOLD", raw)]);
            assert_eq!(config.similarity_threshold, DEFAULT_SIMILARITY_THRESHOLD, "{raw}");
        }
        let config = config_with(&[("PONTO_SIMILARITY_THRESHOLD", "1")]);
        assert_eq!(config.similarity_threshold, 1.0);
    }

    #[test]
    fn test_unparsable_threshold_falls_back() {
        let config = config_with(&[("PONTO_SIMILARITY_THRESHOLD", "strict")]);
        assert!((config.similarity_threshold - DEFAULT_SIMILARITY_THRESHOLD).abs() < 1e-6);
    }
}
