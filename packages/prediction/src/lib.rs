#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crop recommendation for the agromap backend.
//!
//! Wraps a pretrained classifier: the caller supplies resolved signal
//! values plus farm metadata, this crate encodes the categorical state,
//! assembles the feature vector in the exact order the model was
//! trained with, invokes the classifier, and decodes the integer label
//! back to a crop name. The feature order is load-bearing — a
//! reordering corrupts every prediction with no detectable error, which
//! is why [`features`] pins it with a golden test.

pub mod encoder;
pub mod features;
pub mod labels;
pub mod model;

use std::path::Path;

use chrono::Datelike;
use thiserror::Error;

use crate::features::{FarmMetadata, SignalReadings};
use crate::labels::Crop;
use crate::model::{CropClassifier, ForestModel};

/// Errors from prediction operations.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// A categorical value was not seen during training.
    ///
    /// Client-input class: the request named a category the encoder has
    /// no code for.
    #[error("unknown category {value:?}: not present in the trained encoder")]
    UnknownCategory {
        /// The value that could not be encoded.
        value: String,
    },

    /// The classifier produced a label outside the crop map.
    ///
    /// Internal-fault class: the label map is total over the trained
    /// output domain, so this means a corrupt or mismatched artifact.
    #[error("classifier produced out-of-domain label {code}")]
    OutOfDomain {
        /// The unmapped label.
        code: u8,
    },

    /// The model artifact could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The model artifact could not be deserialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The model artifact deserialized but is structurally invalid.
    #[error("invalid model artifact: {message}")]
    Artifact {
        /// What the validation found.
        message: String,
    },
}

/// The prediction adapter: encoder + classifier + label map.
pub struct Predictor {
    model: Box<dyn CropClassifier>,
}

impl Predictor {
    /// Wraps an already-loaded classifier.
    #[must_use]
    pub fn new(model: Box<dyn CropClassifier>) -> Self {
        Self { model }
    }

    /// Loads the forest artifact from disk and validates it.
    ///
    /// Meant to run once at process start so a bad artifact fails the
    /// boot, not the first request.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError`] if the artifact cannot be read,
    /// parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, PredictionError> {
        let model = ForestModel::load(path)?;
        log::info!(
            "loaded crop model from {}: {} trees, {} classes",
            path.display(),
            model.tree_count(),
            model.class_count()
        );
        Ok(Self::new(Box::new(model)))
    }

    /// Recommends a crop for the given signal values and metadata.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::UnknownCategory`] when the state was
    /// not seen in training, or [`PredictionError::OutOfDomain`] when
    /// the classifier output has no crop mapping.
    pub fn recommend(
        &self,
        signals: &SignalReadings,
        metadata: &FarmMetadata,
    ) -> Result<Crop, PredictionError> {
        let state_code = encoder::encode_state(&metadata.state)?;
        let year = chrono::Utc::now().year();
        let vector = features::assemble(state_code, year, signals, metadata);
        let label = self.model.predict(&vector)?;
        let crop = Crop::from_code(label)
            .map_err(|_| PredictionError::OutOfDomain { code: label })?;
        log::debug!("recommended {crop} for state {}", metadata.state);
        Ok(crop)
    }
}
