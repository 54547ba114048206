//! Crop Label Set
//!
//! The 22 classes of the Kaggle crop recommendation dataset, in the order the
//! stock model was trained with (alphabetical, as produced by sklearn's
//! `LabelEncoder`). Artifacts that omit `classes` are assumed to use this order.

pub const CROP_LABELS: [&str; 22] = [
    "apple", "banana", "blackgram", "chickpea", "coconut", "coffee", "cotton",
    "grapes", "jute", "kidneybeans", "lentil", "maize", "mango", "mothbeans",
    "mungbean", "muskmelon", "orange", "papaya", "pigeonpeas", "pomegranate",
    "rice", "watermelon",
];

/// Default label list as owned strings
pub fn default_labels() -> Vec<String> {
    CROP_LABELS.iter().map(|s| s.to_string()).collect()
}

/// Upper-case the first character, leave the rest untouched
///
/// `"kidneybeans"` → `"Kidneybeans"`, `"rice"` → `"Rice"`.
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
