//! Seasonal Climate Adjustment
//!
//! Shifts annual climate averages towards the conditions of a growing season
//! before they reach the crop model. Temperature and humidity get additive
//! deltas; rainfall is scaled to the share that falls inside the season.
//!
//! | Season | temp  | humidity | rainfall |
//! |--------|-------|----------|----------|
//! | Kharif | +2.0  | +20.0    | ×0.8     |
//! | Rabi   | −5.0  | −10.0    | ×0.1     |
//! | Summer | +8.0  | −20.0    | ×0.05    |
//! | other  | —     | —        | —        |
//!
//! No clamping is applied, so humidity can leave the 0-100 range for extreme
//! inputs.

use serde::Serialize;
use std::fmt;

/// Indian cropping season
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Season {
    /// Monsoon season (sown June-July)
    Kharif,

    /// Winter season (sown October-November)
    Rabi,

    /// Zaid / summer season (sown March-June)
    Summer,

    /// Anything else, kept verbatim. Adjustment is a no-op.
    Other(String),
}

impl Season {
    /// Parse a season tag. Matching is exact and case-sensitive.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "Kharif" => Season::Kharif,
            "Rabi" => Season::Rabi,
            "Summer" => Season::Summer,
            other => Season::Other(other.to_string()),
        }
    }

    /// (temp delta, humidity delta, rainfall multiplier)
    fn policy(&self) -> (f64, f64, f64) {
        match self {
            Season::Kharif => (2.0, 20.0, 0.8),
            Season::Rabi => (-5.0, -10.0, 0.1),
            Season::Summer => (8.0, -20.0, 0.05),
            Season::Other(_) => (0.0, 0.0, 1.0),
        }
    }

    /// Apply this season's adjustment to raw annual climate values
    pub fn adjust(&self, temp: f64, humidity: f64, rainfall: f64) -> AdjustedClimate {
        if let Season::Other(tag) = self {
            tracing::debug!("Unrecognized season {:?}, climate left unadjusted", tag);
            return AdjustedClimate { temp, hum: humidity, rain: rainfall };
        }

        let (d_temp, d_hum, rain_factor) = self.policy();
        AdjustedClimate {
            temp: temp + d_temp,
            hum: humidity + d_hum,
            rain: rainfall * rain_factor,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Kharif => write!(f, "Kharif"),
            Season::Rabi => write!(f, "Rabi"),
            Season::Summer => write!(f, "Summer"),
            Season::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// Season-adjusted climate features
///
/// Field names match the `adjusted_climate` object of the prediction response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdjustedClimate {
    pub temp: f64,
    pub hum: f64,
    pub rain: f64,
}

impl AdjustedClimate {
    /// Copy with every value rounded to 1 decimal (for display)
    pub fn rounded(&self) -> Self {
        AdjustedClimate {
            temp: round_to_tenth(self.temp),
            hum: round_to_tenth(self.hum),
            rain: round_to_tenth(self.rain),
        }
    }
}

/// Round to 1 decimal place, ties to even
///
/// Rounds the exact binary value, so 12.35 (stored as 12.3499999...) gives
/// 12.3. Only values that are exactly halfway, like 0.25, go to even.
pub fn round_to_tenth(value: f64) -> f64 {
    let scaled = value * 10.0;
    if !scaled.is_finite() || scaled.abs() >= MAX_EXACT_INT {
        return value;
    }

    let floor = scaled.floor();
    let rounded = if scaled - floor == 0.5 {
        // The product may have been rounded onto the midpoint. The fused
        // multiply-add recovers its exact error.
        let error = value.mul_add(10.0, -scaled);
        if error > 0.0 {
            floor + 1.0
        } else if error < 0.0 {
            floor
        } else {
            scaled.round_ties_even()
        }
    } else {
        scaled.round()
    };

    rounded / 10.0
}

/// Above this magnitude every f64 is an integer
const MAX_EXACT_INT: f64 = 4_503_599_627_370_496.0; // 2^52

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_known_seasons() {
        assert_eq!(Season::parse("Kharif"), Season::Kharif);
        assert_eq!(Season::parse("Rabi"), Season::Rabi);
        assert_eq!(Season::parse("Summer"), Season::Summer);
        assert_eq!(Season::parse("kharif"), Season::Other("kharif".to_string()));
        assert_eq!(Season::parse(""), Season::Other(String::new()));
    }

    #[test]
    fn test_kharif_adjustment() {
        let adj = Season::Kharif.adjust(25.0, 60.0, 100.0).rounded();
        assert_relative_eq!(adj.temp, 27.0);
        assert_relative_eq!(adj.hum, 80.0);
        assert_relative_eq!(adj.rain, 80.0);
    }

    #[test]
    fn test_rabi_adjustment() {
        let adj = Season::Rabi.adjust(25.0, 60.0, 100.0).rounded();
        assert_relative_eq!(adj.temp, 20.0);
        assert_relative_eq!(adj.hum, 50.0);
        assert_relative_eq!(adj.rain, 10.0);
    }

    #[test]
    fn test_summer_adjustment() {
        let adj = Season::Summer.adjust(25.0, 60.0, 100.0).rounded();
        assert_relative_eq!(adj.temp, 33.0);
        assert_relative_eq!(adj.hum, 40.0);
        assert_relative_eq!(adj.rain, 5.0);
    }

    #[test]
    fn test_unknown_season_passes_through() {
        for tag in ["Unknown", "", "RABI", "Zaid"] {
            let adj = Season::parse(tag).adjust(25.3, 61.7, 103.9);
            assert_eq!(adj, AdjustedClimate { temp: 25.3, hum: 61.7, rain: 103.9 });
        }
    }

    #[test]
    fn test_no_clamping() {
        // Summer humidity goes negative for arid inputs
        let adj = Season::Summer.adjust(40.0, 10.0, 0.0);
        assert_relative_eq!(adj.hum, -10.0);
        assert_relative_eq!(adj.temp, 48.0);
        assert_relative_eq!(adj.rain, 0.0);
    }

    #[test]
    fn test_round_to_tenth() {
        assert_relative_eq!(round_to_tenth(12.34), 12.3);
        assert_relative_eq!(round_to_tenth(12.36), 12.4);
        assert_relative_eq!(round_to_tenth(-4.96), -5.0);
        // Exact binary ties go to even
        assert_eq!(round_to_tenth(0.25), 0.2);
        assert_eq!(round_to_tenth(0.75), 0.8);
        assert_eq!(round_to_tenth(-0.25), -0.2);
    }

    #[test]
    fn test_round_to_tenth_uses_stored_value() {
        // These sit just below the midpoint in binary, so they round down
        assert_eq!(round_to_tenth(12.35), 12.3);
        assert_eq!(round_to_tenth(0.35), 0.3);
        assert_eq!(round_to_tenth(1.15), 1.1);
        assert_eq!(round_to_tenth(-12.35), -12.3);
        // and these just above, so they round up
        assert_eq!(round_to_tenth(0.45), 0.5);
        assert_eq!(round_to_tenth(2.45), 2.5);
    }

    #[test]
    fn test_round_to_tenth_keeps_huge_values() {
        assert_eq!(round_to_tenth(1e308), 1e308);
        assert_eq!(round_to_tenth(-1e308), -1e308);
        assert_eq!(round_to_tenth(1e20), 1e20);
        assert!(round_to_tenth(f64::NAN).is_nan());
    }

    #[test]
    fn test_huge_climate_stays_finite_when_rounded() {
        let adj = Season::parse("Unknown").adjust(1e308, 60.0, 100.0).rounded();
        assert!(adj.temp.is_finite());
        assert_eq!(adj.temp, 1e308);
    }

    #[test]
    fn test_display_roundtrips_tag() {
        assert_eq!(Season::Rabi.to_string(), "Rabi");
        assert_eq!(Season::parse("Monsoon").to_string(), "Monsoon");
    }
}
