use crate::recommend::RecommendError;
use serde_json::{Map, Value};

/// A single validated recommendation query.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub crop: String,
    pub season: String,
    /// `None` selects per-hectare mode: no totals, bags or cost.
    pub land_size_ha: Option<f64>,
    pub current_n: f64,
    pub current_p: f64,
    pub current_k: f64,
}

impl RecommendationRequest {
    /// Validates a raw request body.
    ///
    /// `N`, `P`, `K` and `land_size` accept JSON numbers or numeric strings.
    /// A `null` land size is treated the same as an absent one.
    pub fn from_json(body: &Value) -> Result<Self, RecommendError> {
        let obj = body
            .as_object()
            .ok_or_else(|| RecommendError::BadInput("request body must be a JSON object".into()))?;

        let crop = required_string(obj, "crop")?;
        let season = required_string(obj, "season")?;
        let current_n = required_number(obj, "N")?;
        let current_p = required_number(obj, "P")?;
        let current_k = required_number(obj, "K")?;

        let land_size_ha = match obj.get("land_size") {
            None | Some(Value::Null) => None,
            Some(v) => Some(coerce_number("land_size", v)?),
        };

        let request = Self {
            crop,
            season,
            land_size_ha,
            current_n,
            current_p,
            current_k,
        };
        request.validate()?;
        Ok(request)
    }

    /// Rejects non-finite soil readings and a negative or non-finite land size.
    pub fn validate(&self) -> Result<(), RecommendError> {
        let readings = [
            ("N", self.current_n),
            ("P", self.current_p),
            ("K", self.current_k),
        ];
        for (field, value) in readings {
            if !value.is_finite() {
                return Err(RecommendError::BadInput(format!(
                    "field '{field}' must be numeric"
                )));
            }
        }
        if let Some(land) = self.land_size_ha {
            if !land.is_finite() || land < 0.0 {
                return Err(RecommendError::BadInput(format!(
                    "field 'land_size' must be non-negative (got {land})"
                )));
            }
        }
        Ok(())
    }
}

fn required<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value, RecommendError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(RecommendError::BadInput(format!(
            "missing field '{field}'"
        ))),
        Some(v) => Ok(v),
    }
}

fn required_string(obj: &Map<String, Value>, field: &str) -> Result<String, RecommendError> {
    required(obj, field)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RecommendError::BadInput(format!("field '{field}' must be a string")))
}

fn required_number(obj: &Map<String, Value>, field: &str) -> Result<f64, RecommendError> {
    coerce_number(field, required(obj, field)?)
}

fn coerce_number(field: &str, value: &Value) -> Result<f64, RecommendError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(x) if x.is_finite() => Ok(x),
        _ => Err(RecommendError::BadInput(format!(
            "field '{field}' must be numeric"
        ))),
    }
}
