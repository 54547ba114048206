//! Crop Classification Model
//!
//! The recommender treats the classifier as a capability: feature row in,
//! class distribution out. `CropModel` is that seam. The stock implementation
//! is `ModelArtifact`, a JSON export of a fitted scikit-learn estimator:
//!
//! ```json
//! {
//!   "kind": "gaussian_nb" | "random_forest",
//!   "feature_names": ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"],
//!   "classes": ["apple", ...],      // optional, defaults to CROP_LABELS
//!   ...estimator parameters...
//! }
//! ```
//!
//! Artifacts are validated once at load time so that inference itself cannot
//! index out of bounds.

pub mod gaussian_nb;
pub mod random_forest;

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::features::{FeatureRecord, FEATURE_NAMES, N_FEATURES};
use crate::labels::default_labels;

pub use gaussian_nb::GaussianNb;
pub use random_forest::{DecisionTree, RandomForest};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("failed to load model artifact: {0:#}")]
    Load(#[from] anyhow::Error),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Feature row → probability per label
///
/// `predict_proba` must return exactly one value per entry of `labels()`, in
/// the same order.
pub trait CropModel: Send + Sync {
    fn labels(&self) -> &[String];

    fn predict_proba(&self, features: &FeatureRecord) -> Result<Vec<f64>, ModelError>;

    /// Short name of the estimator family, for logs and health checks
    fn kind(&self) -> &'static str {
        "custom"
    }
}

/// Estimator parameters, tagged by `kind`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    GaussianNb(GaussianNb),
    RandomForest(RandomForest),
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    feature_names: Vec<String>,
    #[serde(default)]
    classes: Option<Vec<String>>,
    #[serde(flatten)]
    estimator: Estimator,
}

/// A validated model loaded from JSON
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    classes: Vec<String>,
    estimator: Estimator,
}

impl ModelArtifact {
    /// Load and validate a model artifact from disk
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact: {:?}", path))?;

        let artifact = Self::from_json(&contents)?;

        tracing::info!(
            "Loaded {} model from {:?} ({} classes)",
            artifact.kind(),
            path,
            artifact.classes.len()
        );

        Ok(artifact)
    }

    /// Parse and validate an artifact from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let raw: RawArtifact = serde_json::from_str(json)
            .with_context(|| "Failed to parse model artifact JSON")?;

        if raw.feature_names.len() != N_FEATURES
            || raw.feature_names.iter().zip(FEATURE_NAMES).any(|(a, b)| a != b)
        {
            return Err(ModelError::InvalidArtifact(format!(
                "feature_names must be {:?}, got {:?}",
                FEATURE_NAMES, raw.feature_names
            )));
        }

        Self::new(raw.classes.unwrap_or_else(default_labels), raw.estimator)
    }

    /// Wrap an in-memory estimator, validating it against `classes`
    pub fn new(classes: Vec<String>, estimator: Estimator) -> Result<Self, ModelError> {
        if classes.is_empty() {
            return Err(ModelError::InvalidArtifact("classes must not be empty".into()));
        }

        match &estimator {
            Estimator::GaussianNb(nb) => nb.validate(classes.len())?,
            Estimator::RandomForest(forest) => forest.validate(classes.len())?,
        }

        Ok(ModelArtifact { classes, estimator })
    }
}

impl CropModel for ModelArtifact {
    fn labels(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureRecord) -> Result<Vec<f64>, ModelError> {
        let x = features.to_array();
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::Inference(format!(
                "non-finite feature value in {:?}",
                x
            )));
        }

        let probs = match &self.estimator {
            Estimator::GaussianNb(nb) => nb.predict_proba(&x),
            Estimator::RandomForest(forest) => forest.predict_proba(&x),
        };

        // Finite but extreme features can overflow the likelihoods
        if probs.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::Inference(format!(
                "{} produced non-finite probabilities for {:?}",
                self.kind(),
                x
            )));
        }

        Ok(probs)
    }

    fn kind(&self) -> &'static str {
        match self.estimator {
            Estimator::GaussianNb(_) => "gaussian_nb",
            Estimator::RandomForest(_) => "random_forest",
        }
    }
}
