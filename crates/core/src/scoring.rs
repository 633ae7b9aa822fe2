//! Ranking formulas for listings and sellers

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::credit::Credit;
use crate::domain::seller::{Seller, SellerId};

/// Weights for the value score used by market analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueWeights {
    /// Weight for demand score (default: 0.60)
    pub demand: f64,
    /// Weight for offset tons per dollar (default: 0.40)
    pub offset_per_dollar: f64,
}

impl Default for ValueWeights {
    fn default() -> Self {
        Self { demand: 0.6, offset_per_dollar: 0.4 }
    }
}

/// Weights for the recommendation score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationWeights {
    /// Weight for demand score (default: 0.40)
    pub demand: f64,
    /// Weight for the seller's computed trust (default: 0.35)
    pub trust: f64,
    /// Weight for offset tons per dollar (default: 0.25)
    pub impact_per_dollar: f64,
}

impl Default for RecommendationWeights {
    fn default() -> Self {
        Self { demand: 0.4, trust: 0.35, impact_per_dollar: 0.25 }
    }
}

/// Sales volume per trust point of boost.
const VOLUME_PER_TRUST_POINT: f64 = 1000.0;
/// Cap on the volume boost added to a seller's trust score.
const MAX_VOLUME_BOOST: f64 = 5.0;

#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    value_weights: ValueWeights,
    recommendation_weights: RecommendationWeights,
}

/// A listing ranked for a buyer, paired with its seller when one is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCredit<'a> {
    pub score: f64,
    pub credit: &'a Credit,
    pub seller: Option<&'a Seller>,
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Higher demand and more tons offset per dollar both raise value.
    pub fn value_score(&self, credit: &Credit) -> f64 {
        self.value_weights.demand * credit.demand_score
            + self.value_weights.offset_per_dollar * credit.offset_per_dollar()
    }

    /// Seller trust with a small, capped boost for sales volume.
    pub fn trust_score(&self, seller: Option<&Seller>) -> f64 {
        let Some(seller) = seller else {
            return 0.0;
        };
        let volume_boost =
            (seller.past_sales_volume as f64 / VOLUME_PER_TRUST_POINT).min(MAX_VOLUME_BOOST);
        seller.trust_score + volume_boost
    }

    pub fn recommendation_score(&self, credit: &Credit, seller: Option<&Seller>) -> f64 {
        self.recommendation_weights.demand * credit.demand_score
            + self.recommendation_weights.trust * self.trust_score(seller)
            + self.recommendation_weights.impact_per_dollar * credit.offset_per_dollar()
    }

    /// Listings ordered by value score, best first. Ties keep input order.
    pub fn rank_by_value<'a>(&self, credits: &'a [Credit]) -> Vec<&'a Credit> {
        let mut ranked = credits.iter().collect::<Vec<_>>();
        ranked.sort_by(|a, b| descending(self.value_score(a), self.value_score(b)));
        ranked
    }

    /// Every listing scored for a buyer, best first, truncated to `limit`.
    pub fn recommend<'a>(
        &self,
        credits: &'a [Credit],
        sellers: &'a [Seller],
        limit: usize,
    ) -> Vec<ScoredCredit<'a>> {
        let by_id = index_sellers(sellers);
        let mut scored = credits
            .iter()
            .map(|credit| {
                let seller = by_id.get(&credit.seller_id).copied();
                ScoredCredit { score: self.recommendation_score(credit, seller), credit, seller }
            })
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| descending(a.score, b.score));
        scored.truncate(limit);
        scored
    }

    /// Sellers ordered by computed trust, best first; equal scores fall back
    /// to the higher seller id.
    pub fn top_trusted_sellers<'a>(&self, sellers: &'a [Seller], limit: usize) -> Vec<&'a Seller> {
        let mut ranked = sellers.iter().collect::<Vec<_>>();
        ranked.sort_by(|a, b| {
            descending(self.trust_score(Some(a)), self.trust_score(Some(b)))
                .then_with(|| b.seller_id.cmp(&a.seller_id))
        });
        ranked.truncate(limit);
        ranked
    }
}

/// Listings ordered by raw demand, best first. Ties keep input order.
pub fn top_by_demand(credits: &[Credit], limit: usize) -> Vec<&Credit> {
    let mut ranked = credits.iter().collect::<Vec<_>>();
    ranked.sort_by(|a, b| descending(a.demand_score, b.demand_score));
    ranked.truncate(limit);
    ranked
}

/// Listing counts per project type, in order of first appearance.
pub fn project_type_distribution(credits: &[Credit]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for credit in credits {
        match counts.iter_mut().find(|(project_type, _)| *project_type == credit.project_type) {
            Some((_, count)) => *count += 1,
            None => counts.push((credit.project_type.clone(), 1)),
        }
    }
    counts
}

pub fn index_sellers(sellers: &[Seller]) -> HashMap<&SellerId, &Seller> {
    sellers.iter().map(|seller| (&seller.seller_id, seller)).collect()
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::domain::credit::CreditId;

    fn credit(id: &str, price: f64, demand: f64, offset: f64, seller: &str) -> Credit {
        Credit {
            credit_id: CreditId(id.to_string()),
            project_type: "Solar".to_string(),
            price_usd: price,
            demand_score: demand,
            emissions_offset_tons: offset,
            seller_id: SellerId(seller.to_string()),
        }
    }

    fn seller(id: &str, trust: f64, volume: u64) -> Seller {
        Seller {
            seller_id: SellerId(id.to_string()),
            name: format!("Seller {id}"),
            past_sales_volume: volume,
            trust_score: trust,
            verification_status: "Verified".to_string(),
            past_performance: String::new(),
        }
    }

    #[test]
    fn value_score_blends_demand_and_offset_per_dollar() {
        let calculator = ScoreCalculator::new();
        let score = calculator.value_score(&credit("C-1", 10.0, 80.0, 5.0, "S-1"));
        assert!((score - (0.6 * 80.0 + 0.4 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn sub_dollar_prices_are_clamped_to_one() {
        let calculator = ScoreCalculator::new();
        let cheap = credit("C-1", 0.25, 0.0, 2.0, "S-1");
        assert!((calculator.value_score(&cheap) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn trust_boost_is_capped_and_missing_seller_scores_zero() {
        let calculator = ScoreCalculator::new();
        assert!((calculator.trust_score(Some(&seller("S-1", 80.0, 2_500))) - 82.5).abs() < 1e-9);
        assert!((calculator.trust_score(Some(&seller("S-1", 80.0, 90_000))) - 85.0).abs() < 1e-9);
        assert_eq!(calculator.trust_score(None), 0.0);
    }

    #[test]
    fn recommendation_prefers_trusted_sellers_and_tolerates_unknown_ones() {
        let calculator = ScoreCalculator::new();
        let credits = vec![
            credit("C-1", 10.0, 80.0, 1.0, "S-1"),
            credit("C-2", 10.0, 80.0, 1.0, "S-2"),
            credit("C-3", 10.0, 80.0, 1.0, "S-missing"),
        ];
        let sellers = vec![seller("S-1", 70.0, 0), seller("S-2", 90.0, 0)];

        let ranked = calculator.recommend(&credits, &sellers, 3);

        let ids = ranked.iter().map(|r| r.credit.credit_id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["C-2", "C-1", "C-3"]);
        assert!(ranked[2].seller.is_none());
        let expected = 0.4 * 80.0 + 0.35 * 90.0 + 0.25 * 0.1;
        assert!((ranked[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn demand_ranking_is_stable_for_ties() {
        let credits = vec![
            credit("C-1", 10.0, 50.0, 1.0, "S-1"),
            credit("C-2", 10.0, 70.0, 1.0, "S-1"),
            credit("C-3", 10.0, 70.0, 1.0, "S-1"),
        ];
        let ids = top_by_demand(&credits, 2)
            .into_iter()
            .map(|c| c.credit_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["C-2", "C-3"]);
    }

    #[test]
    fn trusted_sellers_break_ties_by_higher_id() {
        let calculator = ScoreCalculator::new();
        let sellers = vec![seller("S-1", 90.0, 0), seller("S-2", 90.0, 0), seller("S-3", 95.0, 0)];
        let ids = calculator
            .top_trusted_sellers(&sellers, 3)
            .into_iter()
            .map(|s| s.seller_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["S-3", "S-2", "S-1"]);
    }

    #[test]
    fn distribution_keeps_first_appearance_order() {
        let mut credits = vec![
            credit("C-1", 1.0, 1.0, 1.0, "S-1"),
            credit("C-2", 1.0, 1.0, 1.0, "S-1"),
            credit("C-3", 1.0, 1.0, 1.0, "S-1"),
        ];
        credits[1].project_type = "Wind".to_string();

        assert_eq!(
            project_type_distribution(&credits),
            vec![("Solar".to_string(), 2), ("Wind".to_string(), 1)]
        );
    }

    #[test]
    fn reference_catalog_ranks_brightflame_as_most_trusted() {
        let calculator = ScoreCalculator::new();
        let sellers = catalog::sellers();
        let top = calculator.top_trusted_sellers(&sellers, 3);
        let names = top.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["BrightFlame Stoves", "Amazonia Guardians", "HelioCarbon Markets"]);
    }
}
