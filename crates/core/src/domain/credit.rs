use serde::{Deserialize, Serialize};

use crate::domain::seller::SellerId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreditId(pub String);

impl CreditId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CreditId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A marketplace listing. Reference data; never mutated after seeding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    pub credit_id: CreditId,
    pub project_type: String,
    pub price_usd: f64,
    pub demand_score: f64,
    pub emissions_offset_tons: f64,
    pub seller_id: SellerId,
}

impl Credit {
    /// Tons offset per dollar, with prices below one dollar clamped to one.
    pub fn offset_per_dollar(&self) -> f64 {
        self.emissions_offset_tons / self.price_usd.max(1.0)
    }
}
