use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Buyer, Role::Seller];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Buyer => "Buyer",
            Self::Seller => "Seller",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "buyer" | "b" => Ok(Self::Buyer),
            "seller" | "s" => Ok(Self::Seller),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// Buyer persona used to tailor credit recommendations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub profile_key: String,
    pub label: String,
    pub budget_usd: f64,
    pub priority: String,
    pub preferred_project_types: Vec<String>,
    pub risk_tolerance: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuyerProfile {
    pub company: String,
    pub industry: String,
    pub location: String,
    pub monthly_emissions: f64,
    pub annual_emissions: f64,
    pub credits_retired: u64,
    pub net_zero_target_year: Option<u16>,
    pub esg_maturity: String,
}

/// Where a buyer stands in their offset journey.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuyerState {
    ScaledWithTarget,
    TargetWithRetirements,
    TargetOnly,
    EarlyJourney,
}

impl BuyerState {
    pub fn summary(&self) -> &'static str {
        match self {
            Self::ScaledWithTarget => {
                "You have a clear net-zero target and have already retired credits, \
                 but your emissions scale suggests you will benefit from consistent, high-quality offsets."
            }
            Self::TargetWithRetirements => {
                "You have a net-zero target and prior retirements, which puts you in a strong position \
                 to optimize for quality and verification."
            }
            Self::TargetOnly => {
                "You have a net-zero target in place, so the next step is aligning purchases to credible \
                 credits and measurable impact."
            }
            Self::EarlyJourney => {
                "You are early in your offset journey, so establishing a baseline and selecting verified credits \
                 will provide the most value."
            }
        }
    }
}

/// Annual emissions at or above this many tons count as a large emitter.
pub const LARGE_EMITTER_TONS: f64 = 3000.0;

impl BuyerProfile {
    pub fn state(&self) -> BuyerState {
        let has_retired = self.credits_retired > 0;
        let has_target = self.net_zero_target_year.is_some();

        match (has_retired, has_target) {
            (true, true) if self.annual_emissions >= LARGE_EMITTER_TONS => {
                BuyerState::ScaledWithTarget
            }
            (true, true) => BuyerState::TargetWithRetirements,
            (_, true) => BuyerState::TargetOnly,
            _ => BuyerState::EarlyJourney,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SellerProfile {
    pub organization: String,
    pub project_type: String,
    pub credits_listed: u64,
    pub verification_standard: String,
    pub trust_score: f64,
    pub credit_vintage: String,
    pub market_demand: String,
}

/// Role-keyed persona attached to a chat session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum SessionProfile {
    Buyer(BuyerProfile),
    Seller(SellerProfile),
}

impl SessionProfile {
    pub fn role(&self) -> Role {
        match self {
            Self::Buyer(_) => Role::Buyer,
            Self::Seller(_) => Role::Seller,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BuyerProfile, BuyerState, Role, SessionProfile};

    fn buyer(credits_retired: u64, target: Option<u16>, annual_emissions: f64) -> BuyerProfile {
        BuyerProfile {
            company: "EcoBuild Pvt Ltd".to_string(),
            industry: "Construction".to_string(),
            location: "India".to_string(),
            monthly_emissions: annual_emissions / 12.0,
            annual_emissions,
            credits_retired,
            net_zero_target_year: target,
            esg_maturity: "medium".to_string(),
        }
    }

    #[test]
    fn buyer_state_prefers_scale_when_target_and_retirements_exist() {
        assert_eq!(buyer(1200, Some(2035), 5400.0).state(), BuyerState::ScaledWithTarget);
        assert_eq!(buyer(1200, Some(2035), 3000.0).state(), BuyerState::ScaledWithTarget);
        assert_eq!(buyer(1200, Some(2035), 2999.0).state(), BuyerState::TargetWithRetirements);
    }

    #[test]
    fn buyer_state_without_target_is_early_journey() {
        assert_eq!(buyer(0, Some(2040), 100.0).state(), BuyerState::TargetOnly);
        assert_eq!(buyer(500, None, 9000.0).state(), BuyerState::EarlyJourney);
        assert_eq!(buyer(0, None, 0.0).state(), BuyerState::EarlyJourney);
    }

    #[test]
    fn role_parses_short_and_long_forms() {
        assert_eq!("Buyer".parse::<Role>().ok(), Some(Role::Buyer));
        assert_eq!(" s ".parse::<Role>().ok(), Some(Role::Seller));
        assert!("broker".parse::<Role>().is_err());
    }

    #[test]
    fn session_profile_is_tagged_by_role() {
        let profile = SessionProfile::Buyer(buyer(10, Some(2035), 100.0));
        let json = serde_json::to_value(&profile).expect("serialize");

        assert_eq!(json["role"], "buyer");
        assert_eq!(json["company"], "EcoBuild Pvt Ltd");

        let decoded: SessionProfile = serde_json::from_value(json).expect("deserialize");
        assert_eq!(decoded.role(), Role::Buyer);
    }
}
