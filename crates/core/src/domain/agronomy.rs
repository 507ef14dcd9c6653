use serde::Serialize;
use std::fmt;

/// Fertilizer is sold in bags of this weight.
pub const BAG_WEIGHT_KG: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    N,
    P,
    K,
}

impl Nutrient {
    /// Scan order for deficit selection. Earlier entries win ties.
    pub const ALL: [Nutrient; 3] = [Nutrient::N, Nutrient::P, Nutrient::K];

    pub fn fertilizer(self) -> Fertilizer {
        match self {
            Nutrient::N => Fertilizer::Urea,
            Nutrient::P => Fertilizer::Ssp,
            Nutrient::K => Fertilizer::Mop,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Fertilizer {
    #[serde(rename = "Urea")]
    Urea,
    #[serde(rename = "SSP")]
    Ssp,
    #[serde(rename = "MOP")]
    Mop,
}

impl Fertilizer {
    pub fn name(self) -> &'static str {
        match self {
            Fertilizer::Urea => "Urea",
            Fertilizer::Ssp => "SSP",
            Fertilizer::Mop => "MOP",
        }
    }

    /// Share of the product's mass that is the active nutrient.
    pub fn nutrient_fraction(self) -> f64 {
        match self {
            Fertilizer::Urea => 0.46,
            Fertilizer::Ssp => 0.16,
            Fertilizer::Mop => 0.60,
        }
    }

    /// Price of one `BAG_WEIGHT_KG` bag.
    pub fn bag_price(self) -> f64 {
        match self {
            Fertilizer::Urea => 268.0,
            Fertilizer::Ssp => 500.0,
            Fertilizer::Mop => 1700.0,
        }
    }
}

impl fmt::Display for Fertilizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Season {
    Kharif,
    Rabi,
    Zaid,
}

impl Season {
    pub const ALL: [Season; 3] = [Season::Kharif, Season::Rabi, Season::Zaid];

    /// Exact, case-sensitive match on the season name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Zaid => "Zaid",
        }
    }

    pub fn ideal_temperature_c(self) -> f64 {
        match self {
            Season::Kharif => 30.0,
            Season::Rabi => 20.0,
            Season::Zaid => 35.0,
        }
    }

    pub fn ideal_humidity_pct(self) -> f64 {
        match self {
            Season::Kharif => 80.0,
            Season::Rabi => 50.0,
            Season::Zaid => 60.0,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
