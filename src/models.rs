use serde::{Serialize, Deserialize};

/// Product condition as the prediction service expects it on the wire.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[default]
    New,
    Used,
    Refurbished,
}

impl Condition {
    /// Maps a radio-group value to a condition; anything unrecognized
    /// falls back to the default, same as an unselected group.
    pub fn from_value(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "used" => Condition::Used,
            "refurbished" => Condition::Refurbished,
            _ => Condition::New,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PredictionRequest {
    pub product_name: String,
    pub original_price: f64,
    pub main_category: String,
    pub condition: Condition,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

/// The prediction endpoint answers with either an estimate or an
/// application-level error in an otherwise well-formed body.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PredictionResponse {
    Priced {
        prediction: f64,
        price_range: PriceRange,
        confidence: String,
    },
    Failed { error: String },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchResultItem {
    pub product_name: String,
    pub main_category: String,
    pub current_price: f64,
    pub original_price: f64,
}

/// Per-product market lookup used by the pre-submit validation pass.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ProductData {
    Known {
        current_price: f64,
        original_price: f64,
    },
    Missing { error: String },
}

/// One entry from the latest-predictions feed. The backend may emit
/// partially-populated rows; the panel skips anything missing its
/// input or its prediction.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LatestPrediction {
    #[serde(default)]
    pub input_data: Option<PredictionRequest>,
    #[serde(default)]
    pub prediction: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}
