use crate::domain::agronomy::{Fertilizer, Season};
use serde::Serialize;

pub const SUFFICIENT_MESSAGE: &str = "No fertilizer needed, soil nutrients are sufficient.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Recommendation {
    Sufficient(SufficientSoil),
    Dosage(FertilizerDosage),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SufficientSoil {
    #[serde(rename = "Crop")]
    pub crop: String,
    #[serde(rename = "Message")]
    pub message: &'static str,
}

impl SufficientSoil {
    pub fn new(crop: impl Into<String>) -> Self {
        Self {
            crop: crop.into(),
            message: SUFFICIENT_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FertilizerDosage {
    #[serde(rename = "Crop")]
    pub crop: String,
    #[serde(rename = "Season")]
    pub season: Season,
    #[serde(rename = "Ideal Temp (°C)")]
    pub ideal_temperature_c: f64,
    #[serde(rename = "Ideal Humidity (%)")]
    pub ideal_humidity_pct: f64,
    #[serde(rename = "Recommended Fertilizer")]
    pub fertilizer: Fertilizer,
    #[serde(rename = "Amount (kg/ha)")]
    pub amount_kg_per_ha: f64,
    /// Present only when the caller supplied a land size.
    #[serde(flatten)]
    pub purchase: Option<PurchasePlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchasePlan {
    #[serde(rename = "Land Size (ha)")]
    pub land_size_ha: f64,
    #[serde(rename = "Total Amount (kg)")]
    pub total_amount_kg: f64,
    #[serde(rename = "Bags Required")]
    pub bags: u64,
    #[serde(rename = "Total Cost")]
    pub total_cost: f64,
}

impl Recommendation {
    pub fn crop(&self) -> &str {
        match self {
            Recommendation::Sufficient(s) => &s.crop,
            Recommendation::Dosage(d) => &d.crop,
        }
    }

    pub fn fertilizer(&self) -> Option<Fertilizer> {
        match self {
            Recommendation::Sufficient(_) => None,
            Recommendation::Dosage(d) => Some(d.fertilizer),
        }
    }
}
