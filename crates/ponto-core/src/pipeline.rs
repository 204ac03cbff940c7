//! Synchronous detect → align → embed pipeline over an uploaded image.

use std::path::{Path, PathBuf};

use crate::detector::{self, FaceDetector};
use crate::provider::ProviderError;
use crate::recognizer::FaceRecognizer;
use crate::types::Embedding;

/// SCRFD detection model file inside the model directory.
pub const DETECTOR_MODEL_FILE: &str = "det_10g.onnx";
/// ArcFace recognition model file inside the model directory.
pub const RECOGNIZER_MODEL_FILE: &str = "w600k_r50.onnx";

/// Default model directory: `$XDG_DATA_HOME/ponto/models`, else `~/.local/share/ponto/models`.
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("ponto")
        .join("models")
}

/// Loaded detector + recognizer pair.
pub struct FacePipeline {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl FacePipeline {
    /// Load both ONNX models from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, ProviderError> {
        let detector = FaceDetector::load(&model_dir.join(DETECTOR_MODEL_FILE).to_string_lossy())?;
        let recognizer = FaceRecognizer::load(&model_dir.join(RECOGNIZER_MODEL_FILE).to_string_lossy())?;
        Ok(Self { detector, recognizer })
    }

    /// Embed the largest face in `image`, or `None` when no face is found.
    pub fn embed(&mut self, image: &[u8]) -> Result<Option<Embedding>, ProviderError> {
        let rgb = image::load_from_memory(image)
            .map_err(|e| ProviderError::InvalidImage(e.to_string()))?
            .to_rgb8();

        let faces = self.detector.detect(&rgb)?;
        let Some(face) = detector::largest_face(&faces) else {
            tracing::debug!(width = rgb.width(), height = rgb.height(), "no face detected");
            return Ok(None);
        };

        tracing::debug!(
            faces = faces.len(),
            confidence = face.confidence,
            area = face.area(),
            "largest face selected"
        );

        Ok(Some(self.recognizer.extract(&rgb, face)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_reports_missing_detector_model() {
        let err = FacePipeline::load(Path::new("/nonexistent/ponto-models")).err().unwrap();
        assert!(matches!(
            err,
            ProviderError::Detector(crate::detector::DetectorError::ModelNotFound(_))
        ));
    }
}
