use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use greenearth_core::catalog;
use greenearth_core::domain::credit::Credit;
use greenearth_core::domain::footprint::UserFootprint;
use greenearth_core::domain::profile::{Role, SessionProfile, UserProfile};
use greenearth_core::domain::seller::Seller;
use greenearth_core::domain::theory::TheoryEntry;

use super::{FootprintRepository, MarketRepository, RepositoryError};

/// Reference data held in memory. `Default` serves the built-in catalog.
pub struct InMemoryMarketRepository {
    credits: Vec<Credit>,
    sellers: Vec<Seller>,
    user_profiles: Vec<UserProfile>,
    theory: Vec<TheoryEntry>,
    session_profiles: Vec<SessionProfile>,
}

impl InMemoryMarketRepository {
    pub fn new(
        credits: Vec<Credit>,
        sellers: Vec<Seller>,
        user_profiles: Vec<UserProfile>,
        theory: Vec<TheoryEntry>,
        session_profiles: Vec<SessionProfile>,
    ) -> Self {
        Self { credits, sellers, user_profiles, theory, session_profiles }
    }
}

impl Default for InMemoryMarketRepository {
    fn default() -> Self {
        Self::new(
            catalog::credits(),
            catalog::sellers(),
            catalog::user_profiles(),
            catalog::theory(),
            catalog::session_profiles(),
        )
    }
}

#[async_trait::async_trait]
impl MarketRepository for InMemoryMarketRepository {
    async fn credits(&self) -> Result<Vec<Credit>, RepositoryError> {
        Ok(self.credits.clone())
    }

    async fn sellers(&self) -> Result<Vec<Seller>, RepositoryError> {
        Ok(self.sellers.clone())
    }

    async fn user_profiles(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        Ok(self.user_profiles.clone())
    }

    async fn theory(&self) -> Result<Vec<TheoryEntry>, RepositoryError> {
        Ok(self.theory.clone())
    }

    async fn session_profile(&self, role: Role) -> Result<Option<SessionProfile>, RepositoryError> {
        Ok(self.session_profiles.iter().find(|profile| profile.role() == role).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryFootprintRepository {
    footprints: RwLock<HashMap<String, UserFootprint>>,
}

#[async_trait::async_trait]
impl FootprintRepository for InMemoryFootprintRepository {
    async fn save(
        &self,
        user_id: &str,
        update: Map<String, Value>,
    ) -> Result<UserFootprint, RepositoryError> {
        let mut footprints = self.footprints.write().await;
        let existing = footprints.get(user_id.trim()).cloned();
        let footprint = UserFootprint::merged(existing, user_id, update, Utc::now())?;
        footprints.insert(footprint.user_id.clone(), footprint.clone());
        Ok(footprint)
    }

    async fn get(&self, user_id: &str) -> Result<Option<UserFootprint>, RepositoryError> {
        let footprints = self.footprints.read().await;
        Ok(footprints.get(user_id.trim()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use greenearth_core::domain::profile::Role;

    use crate::repositories::{
        FootprintRepository, InMemoryFootprintRepository, InMemoryMarketRepository,
        MarketRepository,
    };

    #[tokio::test]
    async fn in_memory_market_serves_catalog() {
        let repo = InMemoryMarketRepository::default();

        assert_eq!(repo.credits().await.expect("credits").len(), 10);
        assert_eq!(repo.sellers().await.expect("sellers").len(), 5);
        assert!(repo.session_profile(Role::Seller).await.expect("seller").is_some());
    }

    #[tokio::test]
    async fn in_memory_market_without_session_profiles_returns_none() {
        let repo = InMemoryMarketRepository::new(vec![], vec![], vec![], vec![], vec![]);
        assert_eq!(repo.session_profile(Role::Buyer).await.expect("buyer"), None);
    }

    #[tokio::test]
    async fn in_memory_footprint_merges_and_trims_user_id() {
        let repo = InMemoryFootprintRepository::default();
        let first = json!({"totalEmissions": 3.0, "dominantSector": "Food"});
        let second = json!({"totalEmissions": 2.0});

        repo.save(" u-9 ", first.as_object().cloned().unwrap_or_default()).await.expect("save");
        let merged =
            repo.save("u-9", second.as_object().cloned().unwrap_or_default()).await.expect("save");

        assert_eq!(merged.data["dominantSector"], "Food");
        assert_eq!(merged.data["totalEmissions"], 2.0);
        assert_eq!(repo.get("u-9").await.expect("get"), Some(merged));
    }
}
