//! Reference dataset for the marketplace: listings, sellers, buyer personas,
//! session personas and the theory knowledge base.
//!
//! The database is seeded from here, and the in-memory repositories serve it
//! directly.

use crate::domain::credit::{Credit, CreditId};
use crate::domain::profile::{BuyerProfile, SellerProfile, SessionProfile, UserProfile};
use crate::domain::seller::{Seller, SellerId};
use crate::domain::theory::TheoryEntry;

struct CreditRow {
    credit_id: &'static str,
    project_type: &'static str,
    price_usd: f64,
    demand_score: f64,
    emissions_offset_tons: f64,
    seller_id: &'static str,
}

const CREDITS: &[CreditRow] = &[
    CreditRow {
        credit_id: "CC-1001",
        project_type: "Solar",
        price_usd: 12.5,
        demand_score: 78.0,
        emissions_offset_tons: 1.2,
        seller_id: "S-100",
    },
    CreditRow {
        credit_id: "CC-1002",
        project_type: "Wind",
        price_usd: 10.0,
        demand_score: 72.0,
        emissions_offset_tons: 1.1,
        seller_id: "S-101",
    },
    CreditRow {
        credit_id: "CC-1003",
        project_type: "Forest Conservation",
        price_usd: 18.0,
        demand_score: 91.0,
        emissions_offset_tons: 2.4,
        seller_id: "S-102",
    },
    CreditRow {
        credit_id: "CC-1004",
        project_type: "Direct Air Capture",
        price_usd: 145.0,
        demand_score: 64.0,
        emissions_offset_tons: 3.8,
        seller_id: "S-103",
    },
    CreditRow {
        credit_id: "CC-1005",
        project_type: "Cookstove Efficiency",
        price_usd: 7.5,
        demand_score: 86.0,
        emissions_offset_tons: 1.6,
        seller_id: "S-104",
    },
    CreditRow {
        credit_id: "CC-1006",
        project_type: "Mangrove Restoration",
        price_usd: 22.0,
        demand_score: 88.0,
        emissions_offset_tons: 2.9,
        seller_id: "S-102",
    },
    CreditRow {
        credit_id: "CC-1007",
        project_type: "Solar",
        price_usd: 9.0,
        demand_score: 69.0,
        emissions_offset_tons: 1.0,
        seller_id: "S-100",
    },
    CreditRow {
        credit_id: "CC-1008",
        project_type: "Renewables",
        price_usd: 14.0,
        demand_score: 75.0,
        emissions_offset_tons: 1.3,
        seller_id: "S-101",
    },
    CreditRow {
        credit_id: "CC-1009",
        project_type: "Forest Conservation",
        price_usd: 16.5,
        demand_score: 83.0,
        emissions_offset_tons: 2.1,
        seller_id: "S-104",
    },
    CreditRow {
        credit_id: "CC-1010",
        project_type: "Cookstove Efficiency",
        price_usd: 6.0,
        demand_score: 80.0,
        emissions_offset_tons: 1.4,
        seller_id: "S-104",
    },
];

struct SellerRow {
    seller_id: &'static str,
    name: &'static str,
    past_sales_volume: u64,
    trust_score: f64,
    verification_status: &'static str,
    past_performance: &'static str,
}

const SELLERS: &[SellerRow] = &[
    SellerRow {
        seller_id: "S-100",
        name: "HelioCarbon Markets",
        past_sales_volume: 12_500,
        trust_score: 91.0,
        verification_status: "Verified",
        past_performance: "Consistent delivery, low dispute rate",
    },
    SellerRow {
        seller_id: "S-101",
        name: "WindRiver Credits",
        past_sales_volume: 9_800,
        trust_score: 87.0,
        verification_status: "Verified",
        past_performance: "Strong demand, on-time issuance",
    },
    SellerRow {
        seller_id: "S-102",
        name: "Amazonia Guardians",
        past_sales_volume: 15_200,
        trust_score: 93.0,
        verification_status: "Verified",
        past_performance: "High impact projects, third-party audits",
    },
    SellerRow {
        seller_id: "S-103",
        name: "ArcticAir DAC",
        past_sales_volume: 2_100,
        trust_score: 78.0,
        verification_status: "Provisional",
        past_performance: "Innovative tech, limited volume history",
    },
    SellerRow {
        seller_id: "S-104",
        name: "BrightFlame Stoves",
        past_sales_volume: 18_400,
        trust_score: 95.0,
        verification_status: "Verified",
        past_performance: "Top community impact, very low disputes",
    },
];

struct PersonaRow {
    profile_key: &'static str,
    label: &'static str,
    budget_usd: f64,
    priority: &'static str,
    preferred_project_types: &'static [&'static str],
    risk_tolerance: &'static str,
}

const PERSONAS: &[PersonaRow] = &[
    PersonaRow {
        profile_key: "corporate_buyer",
        label: "Corporate Buyer",
        budget_usd: 100_000.0,
        priority: "Reliability and auditability",
        preferred_project_types: &["Forest Conservation", "Renewables"],
        risk_tolerance: "Low",
    },
    PersonaRow {
        profile_key: "startup",
        label: "Startup",
        budget_usd: 15_000.0,
        priority: "Cost-effective offsets",
        preferred_project_types: &["Solar", "Cookstove Efficiency"],
        risk_tolerance: "Medium",
    },
    PersonaRow {
        profile_key: "individual",
        label: "Individual Climate-Conscious Buyer",
        budget_usd: 2_000.0,
        priority: "High impact per dollar",
        preferred_project_types: &["Forest Conservation", "Mangrove Restoration"],
        risk_tolerance: "Medium",
    },
    PersonaRow {
        profile_key: "ngo",
        label: "NGO",
        budget_usd: 50_000.0,
        priority: "Community and biodiversity co-benefits",
        preferred_project_types: &["Cookstove Efficiency", "Mangrove Restoration"],
        risk_tolerance: "Low",
    },
];

const THEORY: &[(&str, &str)] = &[
    (
        "carbon_credit_basics",
        "A carbon credit represents one metric ton of CO2-equivalent emissions reduced, avoided, \
         or removed. Buyers use credits to compensate for emissions they cannot eliminate directly.",
    ),
    (
        "carbon_markets",
        "Carbon markets connect buyers and sellers of credits. Pricing is influenced by demand, \
         project quality, verification, and co-benefits such as biodiversity or community impact.",
    ),
    (
        "voluntary_vs_compliance",
        "Voluntary markets are optional and used by companies or individuals to meet sustainability goals. \
         Compliance markets are regulated and require emitters to meet legal caps.",
    ),
    (
        "sdg_13",
        "SDG 13 is the UN Sustainable Development Goal focused on Climate Action. Projects that reduce emissions \
         or build climate resilience often align with SDG 13.",
    ),
    (
        "emissions_accounting",
        "Emissions accounting measures greenhouse gases in CO2-equivalent terms. It typically considers scope 1 \
         (direct), scope 2 (energy), and scope 3 (value chain) emissions.",
    ),
];

pub fn credits() -> Vec<Credit> {
    CREDITS
        .iter()
        .map(|row| Credit {
            credit_id: CreditId(row.credit_id.to_string()),
            project_type: row.project_type.to_string(),
            price_usd: row.price_usd,
            demand_score: row.demand_score,
            emissions_offset_tons: row.emissions_offset_tons,
            seller_id: SellerId(row.seller_id.to_string()),
        })
        .collect()
}

pub fn sellers() -> Vec<Seller> {
    SELLERS
        .iter()
        .map(|row| Seller {
            seller_id: SellerId(row.seller_id.to_string()),
            name: row.name.to_string(),
            past_sales_volume: row.past_sales_volume,
            trust_score: row.trust_score,
            verification_status: row.verification_status.to_string(),
            past_performance: row.past_performance.to_string(),
        })
        .collect()
}

pub fn user_profiles() -> Vec<UserProfile> {
    PERSONAS
        .iter()
        .map(|row| UserProfile {
            profile_key: row.profile_key.to_string(),
            label: row.label.to_string(),
            budget_usd: row.budget_usd,
            priority: row.priority.to_string(),
            preferred_project_types: row
                .preferred_project_types
                .iter()
                .map(|project_type| project_type.to_string())
                .collect(),
            risk_tolerance: row.risk_tolerance.to_string(),
        })
        .collect()
}

pub fn theory() -> Vec<TheoryEntry> {
    THEORY
        .iter()
        .map(|(topic, content)| TheoryEntry {
            topic: topic.to_string(),
            content: content.to_string(),
        })
        .collect()
}

pub fn session_profiles() -> Vec<SessionProfile> {
    vec![
        SessionProfile::Buyer(BuyerProfile {
            company: "EcoBuild Pvt Ltd".to_string(),
            industry: "Construction".to_string(),
            location: "India".to_string(),
            monthly_emissions: 450.0,
            annual_emissions: 5_400.0,
            credits_retired: 1_200,
            net_zero_target_year: Some(2035),
            esg_maturity: "medium".to_string(),
        }),
        SessionProfile::Seller(SellerProfile {
            organization: "GreenForest Initiative".to_string(),
            project_type: "Afforestation".to_string(),
            credits_listed: 5_000,
            verification_standard: "Gold Standard".to_string(),
            trust_score: 82.0,
            credit_vintage: "2023".to_string(),
            market_demand: "high".to_string(),
        }),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{credits, sellers, session_profiles, theory, user_profiles};
    use crate::domain::profile::Role;

    #[test]
    fn identifiers_are_unique() {
        let credit_ids: HashSet<_> = credits().into_iter().map(|c| c.credit_id).collect();
        assert_eq!(credit_ids.len(), credits().len());

        let seller_ids: HashSet<_> = sellers().into_iter().map(|s| s.seller_id).collect();
        assert_eq!(seller_ids.len(), sellers().len());

        let persona_keys: HashSet<_> = user_profiles().into_iter().map(|p| p.profile_key).collect();
        assert_eq!(persona_keys.len(), 4);

        let topics: HashSet<_> = theory().into_iter().map(|entry| entry.topic).collect();
        assert_eq!(topics.len(), theory().len());
    }

    #[test]
    fn every_listing_references_a_known_seller() {
        let seller_ids: HashSet<_> = sellers().into_iter().map(|s| s.seller_id).collect();
        assert!(credits().iter().all(|credit| seller_ids.contains(&credit.seller_id)));
    }

    #[test]
    fn session_profiles_cover_both_roles() {
        let roles: Vec<Role> = session_profiles().iter().map(|p| p.role()).collect();
        assert_eq!(roles, vec![Role::Buyer, Role::Seller]);
    }
}
