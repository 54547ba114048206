//! Crop Recommender
//!
//! Seasonal crop recommendation on top of a pre-trained classifier.
//!
//! Module layout:
//! - `season`: Kharif/Rabi/Summer climate adjustment
//! - `features`: model input row in training column order
//! - `model`: `CropModel` trait + JSON model artifacts (Gaussian NB, random forest)
//! - `ranker`: label pairing and top-3 ranking
//! - `recommender`: the full request → response pipeline
//! - `catalogue`: static crop profiles
//! - `api_server`: Axum HTTP API (feature `api`)

pub mod catalogue;
pub mod features;
pub mod labels;
pub mod model;
pub mod ranker;
pub mod recommender;
pub mod season;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use features::{FeatureRecord, FEATURE_NAMES};
pub use labels::CROP_LABELS;
pub use model::{CropModel, ModelArtifact, ModelError};
pub use ranker::{rank_positional, ContractError, Recommendation, TOP_K};
pub use recommender::{PredictionRequest, PredictionResponse, RecommendError, Recommender};
pub use season::{AdjustedClimate, Season};

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
