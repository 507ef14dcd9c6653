use crate::domain::agronomy::{Fertilizer, Nutrient, Season, BAG_WEIGHT_KG};
use crate::domain::contract::RecommendationRequest;
use crate::domain::recommendation::{
    FertilizerDosage, PurchasePlan, Recommendation, SufficientSoil,
};
use crate::reference::{CropIdealProfile, CropTable};
use thiserror::Error;

/// Every way a recommendation request can be rejected. The display text is the
/// message returned to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
    #[error("Crop '{0}' not found in dataset.")]
    UnknownCrop(String),

    #[error("Invalid season '{0}'. Choose from Kharif, Rabi, Zaid.")]
    InvalidSeason(String),

    #[error("{0}")]
    BadInput(String),
}

/// Per-nutrient shortfall against the crop's ideal levels, clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientDeficits {
    pub n: f64,
    pub p: f64,
    pub k: f64,
}

impl NutrientDeficits {
    pub fn between(
        ideal: &CropIdealProfile,
        current_n: f64,
        current_p: f64,
        current_k: f64,
    ) -> Self {
        Self {
            n: (ideal.ideal_n - current_n).max(0.0),
            p: (ideal.ideal_p - current_p).max(0.0),
            k: (ideal.ideal_k - current_k).max(0.0),
        }
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::N => self.n,
            Nutrient::P => self.p,
            Nutrient::K => self.k,
        }
    }

    pub fn is_sufficient(&self) -> bool {
        Nutrient::ALL.iter().all(|&x| self.get(x) == 0.0)
    }

    /// Nutrient with the largest deficit, or `None` when nothing is lacking.
    ///
    /// Scans N, P, K in that order and only replaces the current pick on a strictly
    /// larger deficit, so equal deficits resolve to N before P before K.
    pub fn dominant(&self) -> Option<(Nutrient, f64)> {
        let mut best: Option<(Nutrient, f64)> = None;
        for nutrient in Nutrient::ALL {
            let deficit = self.get(nutrient);
            if deficit <= 0.0 {
                continue;
            }
            match best {
                Some((_, current)) if deficit <= current => {}
                _ => best = Some((nutrient, deficit)),
            }
        }
        best
    }
}

impl PurchasePlan {
    /// Scales a per-hectare dose to a field and rounds up to whole bags.
    ///
    /// Fails when the field is so large that the bag count no longer fits in a `u64`.
    pub fn for_area(
        fertilizer: Fertilizer,
        amount_kg_per_ha: f64,
        land_size_ha: f64,
    ) -> Result<Self, RecommendError> {
        let total = amount_kg_per_ha * land_size_ha;
        let bags = (total / BAG_WEIGHT_KG).ceil();
        if !total.is_finite() || bags >= u64::MAX as f64 {
            return Err(RecommendError::BadInput(format!(
                "field 'land_size' is too large (got {land_size_ha})"
            )));
        }
        let bags = bags as u64;
        Ok(Self {
            land_size_ha,
            total_amount_kg: round2(total),
            bags,
            total_cost: bags as f64 * fertilizer.bag_price(),
        })
    }
}

/// Picks one fertilizer for the crop's largest nutrient deficit and sizes the dose.
///
/// Non-finite readings and unknown crops are rejected first. A soil with no deficit yields
/// [`Recommendation::Sufficient`] before the season is looked at; otherwise an
/// unrecognised season rejects the whole request.
pub fn recommend(
    table: &CropTable,
    request: &RecommendationRequest,
) -> Result<Recommendation, RecommendError> {
    request.validate()?;

    let ideal = table
        .get(&request.crop)
        .ok_or_else(|| RecommendError::UnknownCrop(request.crop.clone()))?;

    let deficits = NutrientDeficits::between(
        ideal,
        request.current_n,
        request.current_p,
        request.current_k,
    );

    let Some((nutrient, deficit)) = deficits.dominant() else {
        return Ok(Recommendation::Sufficient(SufficientSoil::new(&request.crop)));
    };

    let fertilizer = nutrient.fertilizer();
    let amount = deficit / fertilizer.nutrient_fraction();
    let purchase = request
        .land_size_ha
        .map(|land| PurchasePlan::for_area(fertilizer, amount, land))
        .transpose()?;

    let season = Season::parse(&request.season)
        .ok_or_else(|| RecommendError::InvalidSeason(request.season.clone()))?;

    Ok(Recommendation::Dosage(FertilizerDosage {
        crop: request.crop.clone(),
        season,
        ideal_temperature_c: season.ideal_temperature_c(),
        ideal_humidity_pct: season.ideal_humidity_pct(),
        fertilizer,
        amount_kg_per_ha: round2(amount),
        purchase,
    }))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
