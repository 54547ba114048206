//! Crop Catalogue
//!
//! Short agronomic notes for each crop the stock model can recommend:
//! time to harvest and practical cultivation tips (Telangana-oriented).

use serde::Serialize;

use crate::labels::{capitalize, CROP_LABELS};

/// Static profile of one crop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropProfile {
    pub crop: String,
    pub duration: &'static str,
    pub tips: &'static str,
}

/// (label, duration, tips), in `CROP_LABELS` order
const PROFILES: [(&str, &str, &str); 22] = [
    ("apple", "180-240 Days", "Best attempted in higher altitudes; protect from heat stress; needs chilling hours."),
    ("banana", "300-365 Days", "Plant tissue culture varieties; avoid water stagnation; use bunch covers to protect fruit."),
    ("blackgram", "60-75 Days", "Sow in Kharif or Rabi; inoculate with Rhizobium; avoid excess nitrogen."),
    ("chickpea", "90-120 Days", "Use desi varieties; apply sulphur if soil is deficient; control pod borer."),
    ("coconut", "6-8 Years to first harvest", "Plant tall varieties; provide good drainage; apply organic manure regularly."),
    ("coffee", "3-4 Years to first harvest", "Shade-grown varieties only; requires high rainfall and cool climate; protect from frost."),
    ("cotton", "150-180 Days", "Avoid waterlogging; use boron spray for better boll opening."),
    ("grapes", "120-150 Days (per season)", "Use drip irrigation; prune regularly; protect bunches from birds and sunburn."),
    ("jute", "120-150 Days", "Needs standing water like rice; not recommended in most areas."),
    ("kidneybeans", "90-120 Days", "Sow in cooler months; inoculate with Rhizobium."),
    ("lentil", "80-110 Days", "Use early maturing varieties; apply phosphorus."),
    ("maize", "90-110 Days", "Plant in rows; apply zinc sulphate if deficiency seen."),
    ("mango", "3-5 Years to first harvest", "Use high-density planting; protect from hoppers."),
    ("mothbeans", "60-90 Days", "Good for intercropping."),
    ("mungbean", "60-75 Days", "Harvest when pods turn brown."),
    ("muskmelon", "70-90 Days", "Use mulch; protect from fruit fly."),
    ("orange", "8-10 Months", "Use drip system; apply micronutrients."),
    ("papaya", "9-12 Months", "Avoid waterlogging."),
    ("pigeonpeas", "120-180 Days", "Intercrop with short-duration crops."),
    ("pomegranate", "150-180 Days (fruit development)", "Use drip irrigation."),
    ("rice", "105-150 Days", "Ensure consistent flooding."),
    ("watermelon", "70-90 Days", "Avoid overwatering."),
];

fn to_profile(&(label, duration, tips): &(&'static str, &'static str, &'static str)) -> CropProfile {
    CropProfile {
        crop: capitalize(label),
        duration,
        tips,
    }
}

/// All profiles in label order
pub fn all_profiles() -> Vec<CropProfile> {
    PROFILES.iter().map(to_profile).collect()
}

/// Look up a crop by name, case-insensitively
pub fn profile(name: &str) -> Option<CropProfile> {
    let needle = name.trim().to_lowercase();
    PROFILES
        .iter()
        .find(|(label, _, _)| *label == needle)
        .map(to_profile)
}
