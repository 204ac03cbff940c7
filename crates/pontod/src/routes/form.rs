//! Multipart upload parsing shared by the enrollment and punch routes.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;

use crate::error::{ApiError, ApiResult};

/// File field carrying the photo.
pub const SELFIE_FIELD: &str = "selfie";

/// Text fields plus the selfie bytes of one multipart request.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    selfie: Option<Vec<u8>>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == SELFIE_FIELD {
                form.selfie = Some(field.bytes().await?.to_vec());
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    /// Selfie bytes; an absent or empty part is a validation error.
    pub fn selfie(&self) -> ApiResult<&[u8]> {
        match self.selfie.as_deref() {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(ApiError::validation("field 'selfie' is required")),
        }
    }

    /// Optional text field; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn required_text(&self, name: &str) -> ApiResult<String> {
        self.text(name)
            .ok_or_else(|| ApiError::validation(format!("field '{name}' is required")))
    }

    /// Optional parsed field; present but unparsable is a validation error.
    pub fn parsed<T: FromStr>(&self, name: &str) -> ApiResult<Option<T>> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ApiError::validation(format!("field '{name}' is malformed: {raw}"))),
        }
    }

    /// Optional coordinate in degrees, finite and within `±limit`.
    pub fn coordinate(&self, name: &str, limit: f64) -> ApiResult<Option<f64>> {
        match self.parsed::<f64>(name)? {
            Some(v) if !v.is_finite() || v.abs() > limit => Err(ApiError::validation(format!(
                "field '{name}' must be within ±{limit}, got {v}"
            ))),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)], selfie: Option<&[u8]>) -> UploadForm {
        UploadForm {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            selfie: selfie.map(|s| s.to_vec()),
        }
    }

    #[test]
    fn test_blank_text_is_absent() {
        let f = form(&[("document", "  "), ("name", " Ana ")], None);
        assert_eq!(f.text("document"), None);
        assert_eq!(f.text("name").as_deref(), Some("Ana"));
        assert!(f.required_text("email").is_err());
    }

    #[test]
    fn test_parsed_fields() {
        let f = form(&[("lat", "-23.5"), ("lon", "west")], None);
        assert_eq!(f.parsed::<f64>("lat").unwrap(), Some(-23.5));
        assert_eq!(f.parsed::<f64>("missing").unwrap(), None);
        assert!(f.parsed::<f64>("lon").is_err());
    }

    #[test]
    fn test_coordinates_must_be_finite_and_in_range() {
        let f = form(
            &[("lat", "-23.5"), ("lon", "NaN"), ("alt", "inf"), ("far", "91")],
            None,
        );
        assert_eq!(f.coordinate("lat", 90.0).unwrap(), Some(-23.5));
        assert_eq!(f.coordinate("missing", 90.0).unwrap(), None);
        assert!(f.coordinate("lon", 180.0).is_err());
        assert!(f.coordinate("alt", 180.0).is_err());
        assert!(f.coordinate("far", 90.0).is_err());
        assert_eq!(f.coordinate("far", 180.0).unwrap(), Some(91.0));
    }

    #[test]
    fn test_selfie_required() {
        assert!(form(&[], None).selfie().is_err());
        assert!(form(&[], Some(b"")).selfie().is_err());
        assert_eq!(form(&[], Some(b"jpeg")).selfie().unwrap(), b"jpeg");
    }
}
