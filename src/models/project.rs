use serde::{Deserialize, Serialize};

/// Unit of measure for a project rate category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    #[default]
    PerSqFt,
    PerSqYd,
    Flat,
}

impl std::fmt::Display for RateBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateBasis::PerSqFt => write!(f, "per sq.ft"),
            RateBasis::PerSqYd => write!(f, "per sq.yd"),
            RateBasis::Flat => write!(f, "flat"),
        }
    }
}

/// One of the project's rate categories, e.g. "Basic rate" at 4500 per sq.ft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rate {
    pub label: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub basis: RateBasis,
}

/// A preferential location charge (corner plot, park facing, road width).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlcCharge {
    pub label: String,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// A real-estate development listing with descriptive and pricing fields.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Project {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, alias = "size")]
    pub plot_size: Option<String>,
    /// Unit mix, e.g. "2 & 3 BHK". Legacy shapes used `config` or `configs`.
    #[serde(default, alias = "config", alias = "configs")]
    pub configuration: Option<String>,
    #[serde(default)]
    pub blocks: Option<u32>,
    #[serde(default)]
    pub floors: Option<u32>,
    #[serde(default)]
    pub units: Option<u32>,
    #[serde(default)]
    pub architect: Option<String>,
    #[serde(default, alias = "desc")]
    pub description: Option<String>,
    #[serde(default)]
    pub rates: Vec<Rate>,
    #[serde(default)]
    pub plc: Vec<PlcCharge>,
    /// Floor-rise charge applies per floor above this floor.
    #[serde(default)]
    pub frc_above_floor: Option<u32>,
    #[serde(default)]
    pub frc_per_floor: Option<f64>,
    #[serde(default, alias = "price")]
    pub approx_price: Option<String>,
}
