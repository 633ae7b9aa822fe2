use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::DomainError;

/// Keys owned by the store; caller-supplied values for them are discarded.
const RESERVED_KEYS: [&str; 2] = ["user_id", "timestamp"];

/// A user's saved carbon footprint calculation.
///
/// The calculator's document is kept verbatim in `data`; only `user_id` and
/// `timestamp` are managed here. Serializes flat, so clients read back the
/// same keys they wrote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserFootprint {
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl UserFootprint {
    /// Applies an upsert: top-level keys of `update` replace those already
    /// stored, other stored keys survive, and the timestamp is refreshed.
    pub fn merged(
        existing: Option<UserFootprint>,
        user_id: &str,
        update: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(DomainError::InvariantViolation("user_id is required".to_string()));
        }
        if update.is_empty() {
            return Err(DomainError::InvariantViolation("footprint_data is required".to_string()));
        }

        let mut data = existing.map(|footprint| footprint.data).unwrap_or_default();
        for (key, value) in update {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            data.insert(key, value);
        }

        Ok(Self { user_id: user_id.to_string(), timestamp: now, data })
    }

    pub fn summary(&self) -> FootprintSummary {
        FootprintSummary::from_data(&self.data)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectorEmission {
    pub name: String,
    pub value: f64,
    pub percentage: f64,
}

/// Typed view over the calculator fields the chat agents care about.
#[derive(Clone, Debug, PartialEq)]
pub struct FootprintSummary {
    pub total_emissions: f64,
    pub dominant_sector: String,
    pub suggested_credits: f64,
    pub tree_equivalent: f64,
    pub breakdown: Vec<SectorEmission>,
}

impl FootprintSummary {
    pub fn from_data(data: &Map<String, Value>) -> Self {
        let breakdown = data
            .get("breakdown")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| SectorEmission {
                        name: item
                            .get("name")
                            .and_then(Value::as_str)
                            .unwrap_or("Unknown")
                            .to_string(),
                        value: number(item.get("value")),
                        percentage: number(item.get("percentage")),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            total_emissions: number(data.get("totalEmissions")),
            dominant_sector: data
                .get("dominantSector")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            suggested_credits: number(data.get("suggestedCredits")),
            tree_equivalent: number(data.get("treeEquivalent")),
            breakdown,
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            format!(
                "Annual Carbon Footprint: {:.2} tonnes CO2 equivalent",
                self.total_emissions
            ),
            format!("Dominant Sector: {}", self.dominant_sector),
            format!("Suggested Credits to Offset: {:.0}", self.suggested_credits),
            format!("Equivalent to Trees Needed to Offset: {:.0}", self.tree_equivalent),
        ];

        if !self.breakdown.is_empty() {
            lines.push("\nBreakdown by Category:".to_string());
            for sector in &self.breakdown {
                lines.push(format!(
                    "  • {}: {:.2} tonnes ({:.1}%)",
                    sector.name, sector.value, sector.percentage
                ));
            }
        }

        lines.join("\n")
    }
}

pub const NO_FOOTPRINT_MESSAGE: &str = "No carbon footprint has been calculated yet.";

/// Renders an optional footprint for inclusion in an agent prompt.
pub fn format_footprint_for_chat(footprint: Option<&UserFootprint>) -> String {
    match footprint {
        Some(footprint) => footprint.summary().render(),
        None => NO_FOOTPRINT_MESSAGE.to_string(),
    }
}

fn number(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(0.0)
}
