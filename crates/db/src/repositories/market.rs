use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use greenearth_core::domain::credit::{Credit, CreditId};
use greenearth_core::domain::profile::{Role, SessionProfile, UserProfile};
use greenearth_core::domain::seller::{Seller, SellerId};
use greenearth_core::domain::theory::TheoryEntry;

use super::{MarketRepository, RepositoryError};
use crate::DbPool;

pub struct SqlMarketRepository {
    pool: DbPool,
}

impl SqlMarketRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode<T>(result: Result<T, sqlx::Error>) -> Result<T, RepositoryError> {
    result.map_err(|e| RepositoryError::Decode(e.to_string()))
}

fn row_to_credit(row: &SqliteRow) -> Result<Credit, RepositoryError> {
    Ok(Credit {
        credit_id: CreditId(decode(row.try_get("credit_id"))?),
        project_type: decode(row.try_get("project_type"))?,
        price_usd: decode(row.try_get("price_usd"))?,
        demand_score: decode(row.try_get("demand_score"))?,
        emissions_offset_tons: decode(row.try_get("emissions_offset_tons"))?,
        seller_id: SellerId(decode(row.try_get("seller_id"))?),
    })
}

fn row_to_seller(row: &SqliteRow) -> Result<Seller, RepositoryError> {
    let past_sales_volume: i64 = decode(row.try_get("past_sales_volume"))?;
    Ok(Seller {
        seller_id: SellerId(decode(row.try_get("seller_id"))?),
        name: decode(row.try_get("name"))?,
        past_sales_volume: u64::try_from(past_sales_volume).map_err(|_| {
            RepositoryError::Decode(format!("negative past_sales_volume {past_sales_volume}"))
        })?,
        trust_score: decode(row.try_get("trust_score"))?,
        verification_status: decode(row.try_get("verification_status"))?,
        past_performance: decode(row.try_get("past_performance"))?,
    })
}

fn row_to_user_profile(row: &SqliteRow) -> Result<UserProfile, RepositoryError> {
    let preferred: String = decode(row.try_get("preferred_project_types"))?;
    let preferred_project_types = serde_json::from_str::<Vec<String>>(&preferred)
        .map_err(|e| RepositoryError::Decode(format!("preferred_project_types: {e}")))?;

    Ok(UserProfile {
        profile_key: decode(row.try_get("profile_key"))?,
        label: decode(row.try_get("label"))?,
        budget_usd: decode(row.try_get("budget_usd"))?,
        priority: decode(row.try_get("priority"))?,
        preferred_project_types,
        risk_tolerance: decode(row.try_get("risk_tolerance"))?,
    })
}

#[async_trait::async_trait]
impl MarketRepository for SqlMarketRepository {
    async fn credits(&self) -> Result<Vec<Credit>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT credit_id, project_type, price_usd, demand_score, emissions_offset_tons, seller_id
             FROM credit
             ORDER BY position, credit_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_credit).collect()
    }

    async fn sellers(&self) -> Result<Vec<Seller>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT seller_id, name, past_sales_volume, trust_score, verification_status, past_performance
             FROM seller
             ORDER BY position, seller_id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_seller).collect()
    }

    async fn user_profiles(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT profile_key, label, budget_usd, priority, preferred_project_types, risk_tolerance
             FROM buyer_persona
             ORDER BY position, profile_key",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_user_profile).collect()
    }

    async fn theory(&self) -> Result<Vec<TheoryEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT topic, content FROM theory_topic ORDER BY position, topic")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(TheoryEntry {
                    topic: decode(row.try_get("topic"))?,
                    content: decode(row.try_get("content"))?,
                })
            })
            .collect()
    }

    async fn session_profile(&self, role: Role) -> Result<Option<SessionProfile>, RepositoryError> {
        let row = sqlx::query("SELECT payload FROM session_profile WHERE role = ?")
            .bind(role.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = decode(row.try_get("payload"))?;
        let profile = serde_json::from_str::<SessionProfile>(&payload)
            .map_err(|e| RepositoryError::Decode(format!("session_profile `{}`: {e}", role.as_str())))?;

        if profile.role() != role {
            return Err(RepositoryError::Decode(format!(
                "session_profile row `{}` holds a `{}` payload",
                role.as_str(),
                profile.role().as_str()
            )));
        }
        Ok(Some(profile))
    }
}

#[cfg(test)]
mod tests {
    use greenearth_core::catalog;
    use greenearth_core::domain::profile::{Role, SessionProfile};

    use super::SqlMarketRepository;
    use crate::fixtures::ReferenceDataset;
    use crate::repositories::MarketRepository;
    use crate::{connect_with_settings, migrations, DbPool};

    async fn seeded_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        ReferenceDataset::load(&pool).await.expect("seed");
        pool
    }

    #[tokio::test]
    async fn reads_back_catalog_in_order() {
        let repo = SqlMarketRepository::new(seeded_pool().await);

        assert_eq!(repo.credits().await.expect("credits"), catalog::credits());
        assert_eq!(repo.sellers().await.expect("sellers"), catalog::sellers());
        assert_eq!(repo.user_profiles().await.expect("profiles"), catalog::user_profiles());
        assert_eq!(repo.theory().await.expect("theory"), catalog::theory());
    }

    #[tokio::test]
    async fn session_profile_is_selected_by_role() {
        let repo = SqlMarketRepository::new(seeded_pool().await);

        let buyer = repo.session_profile(Role::Buyer).await.expect("buyer profile");
        assert!(matches!(buyer, Some(SessionProfile::Buyer(ref profile)) if profile.company == "EcoBuild Pvt Ltd"));

        let seller = repo.session_profile(Role::Seller).await.expect("seller profile");
        assert!(matches!(seller, Some(SessionProfile::Seller(_))));
    }

    #[tokio::test]
    async fn empty_database_yields_empty_reference_data() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        let repo = SqlMarketRepository::new(pool);

        assert!(repo.credits().await.expect("credits").is_empty());
        assert_eq!(repo.session_profile(Role::Buyer).await.expect("buyer"), None);
    }
}
