//! Crop Recommendation Pipeline
//!
//! adjust climate for season → build feature row → model → pair labels → top 3
//!
//! The result depends only on the request and the loaded model, so identical
//! requests always produce identical responses.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::features::FeatureRecord;
use crate::model::{CropModel, ModelError};
use crate::ranker::{pair_labels, rank, ContractError, Recommendation};
use crate::season::{AdjustedClimate, Season};

/// Body of `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "K")]
    pub k: f64,
    pub ph: f64,
    pub annual_temp: f64,
    pub annual_humidity: f64,
    pub annual_rainfall: f64,
    /// "Kharif", "Rabi" or "Summer"; anything else means no adjustment
    pub season: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub success: bool,
    pub recommendations: Vec<Recommendation>,
    pub adjusted_climate: AdjustedClimateView,
}

/// Rounded climate values as returned to clients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedClimateView {
    pub temp: f64,
    pub hum: f64,
    pub rain: f64,
}

impl From<AdjustedClimate> for AdjustedClimateView {
    fn from(climate: AdjustedClimate) -> Self {
        let rounded = climate.rounded();
        AdjustedClimateView {
            temp: rounded.temp,
            hum: rounded.hum,
            rain: rounded.rain,
        }
    }
}

#[derive(Debug, Error)]
pub enum RecommendError {
    /// The model and its label list disagree; a deployment problem, not bad input
    #[error("model contract violated: {0}")]
    ModelContract(#[from] ContractError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Seasonal adjustment + model + ranking
#[derive(Clone)]
pub struct Recommender {
    model: Arc<dyn CropModel>,
}

impl Recommender {
    pub fn new(model: Arc<dyn CropModel>) -> Self {
        Recommender { model }
    }

    pub fn model(&self) -> &dyn CropModel {
        self.model.as_ref()
    }

    pub fn recommend(&self, request: &PredictionRequest) -> Result<PredictionResponse, RecommendError> {
        let season = Season::parse(&request.season);
        let climate = season.adjust(
            request.annual_temp,
            request.annual_humidity,
            request.annual_rainfall,
        );

        let features = FeatureRecord::new(request.n, request.p, request.k, request.ph, &climate);
        let probabilities = self.model.predict_proba(&features)?;

        let labels = self.model.labels();
        if let Some((label, &value)) = labels
            .iter()
            .zip(&probabilities)
            .find(|(_, p)| !p.is_finite())
        {
            return Err(ContractError::NonFiniteProbability {
                label: label.clone(),
                value,
            }
            .into());
        }

        let entries = pair_labels(labels, &probabilities)?;
        let recommendations = rank(&entries)?;

        tracing::debug!(
            "Season {} → top pick {} ({:.1}%)",
            season,
            recommendations[0].crop,
            recommendations[0].confidence
        );

        Ok(PredictionResponse {
            success: true,
            recommendations,
            adjusted_climate: climate.into(),
        })
    }
}
