//! Model Input Features
//!
//! The crop model was trained on the Kaggle crop recommendation table whose
//! columns run `N, P, K, temperature, humidity, ph, rainfall`. Note that `ph`
//! sits after humidity there, not next to the soil nutrients as in the
//! request payload.

use crate::season::AdjustedClimate;
use serde::Serialize;

/// Column order expected by every model artifact
pub const FEATURE_NAMES: [&str; 7] = ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

pub const N_FEATURES: usize = FEATURE_NAMES.len();

/// One row of model input
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub n: f64,
    pub p: f64,
    pub k: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl FeatureRecord {
    /// Build from soil readings and season-adjusted climate
    pub fn new(n: f64, p: f64, k: f64, ph: f64, climate: &AdjustedClimate) -> Self {
        FeatureRecord {
            n,
            p,
            k,
            temperature: climate.temp,
            humidity: climate.hum,
            ph,
            rainfall: climate.rain,
        }
    }

    /// Feature vector in `FEATURE_NAMES` order
    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            self.n,
            self.p,
            self.k,
            self.temperature,
            self.humidity,
            self.ph,
            self.rainfall,
        ]
    }
}
