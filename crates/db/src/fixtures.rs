//! Reference dataset seeding and its verification contract.
//!
//! Seeding inserts the built-in catalog with `ON CONFLICT DO NOTHING`, so it is
//! safe to run on every start. Rows an operator edited are left alone.

use greenearth_core::catalog;
use greenearth_core::domain::profile::Role;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

pub struct ReferenceDataset;

/// Rows inserted by one `load` call. Zero everywhere on a re-run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedCounts {
    pub credits: u64,
    pub sellers: u64,
    pub user_profiles: u64,
    pub theory_topics: u64,
    pub session_profiles: u64,
}

impl SeedCounts {
    pub fn total(&self) -> u64 {
        self.credits + self.sellers + self.user_profiles + self.theory_topics + self.session_profiles
    }
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

impl ReferenceDataset {
    pub async fn load(pool: &DbPool) -> Result<SeedCounts, RepositoryError> {
        let mut tx = pool.begin_with("BEGIN IMMEDIATE").await?;
        let mut counts = SeedCounts::default();

        for (position, seller) in catalog::sellers().iter().enumerate() {
            let volume = i64::try_from(seller.past_sales_volume).map_err(|_| {
                RepositoryError::Decode(format!("sales volume overflow for `{}`", seller.seller_id))
            })?;
            counts.sellers += sqlx::query(
                "INSERT INTO seller
                    (seller_id, position, name, past_sales_volume, trust_score,
                     verification_status, past_performance)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(seller_id) DO NOTHING",
            )
            .bind(seller.seller_id.as_str())
            .bind(position as i64)
            .bind(&seller.name)
            .bind(volume)
            .bind(seller.trust_score)
            .bind(&seller.verification_status)
            .bind(&seller.past_performance)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for (position, credit) in catalog::credits().iter().enumerate() {
            counts.credits += sqlx::query(
                "INSERT INTO credit
                    (credit_id, position, project_type, price_usd, demand_score,
                     emissions_offset_tons, seller_id)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(credit_id) DO NOTHING",
            )
            .bind(credit.credit_id.as_str())
            .bind(position as i64)
            .bind(&credit.project_type)
            .bind(credit.price_usd)
            .bind(credit.demand_score)
            .bind(credit.emissions_offset_tons)
            .bind(credit.seller_id.as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for (position, profile) in catalog::user_profiles().iter().enumerate() {
            let preferred = serde_json::to_string(&profile.preferred_project_types)
                .map_err(|e| RepositoryError::Decode(e.to_string()))?;
            counts.user_profiles += sqlx::query(
                "INSERT INTO buyer_persona
                    (profile_key, position, label, budget_usd, priority,
                     preferred_project_types, risk_tolerance)
                 VALUES (?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(profile_key) DO NOTHING",
            )
            .bind(&profile.profile_key)
            .bind(position as i64)
            .bind(&profile.label)
            .bind(profile.budget_usd)
            .bind(&profile.priority)
            .bind(preferred)
            .bind(&profile.risk_tolerance)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for (position, entry) in catalog::theory().iter().enumerate() {
            counts.theory_topics += sqlx::query(
                "INSERT INTO theory_topic (topic, position, content)
                 VALUES (?, ?, ?)
                 ON CONFLICT(topic) DO NOTHING",
            )
            .bind(&entry.topic)
            .bind(position as i64)
            .bind(&entry.content)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for profile in catalog::session_profiles() {
            let payload =
                serde_json::to_string(&profile).map_err(|e| RepositoryError::Decode(e.to_string()))?;
            counts.session_profiles += sqlx::query(
                "INSERT INTO session_profile (role, payload)
                 VALUES (?, ?)
                 ON CONFLICT(role) DO NOTHING",
            )
            .bind(profile.role().as_str())
            .bind(payload)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;

        tracing::info!(
            event_name = "db.seed.reference_loaded",
            inserted = counts.total(),
            credits = counts.credits,
            sellers = counts.sellers,
            "reference dataset loaded"
        );
        Ok(counts)
    }

    /// Checks that every catalog key is present. Extra operator rows are allowed.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let credit_ids = catalog::credits()
            .into_iter()
            .map(|credit| credit.credit_id.0)
            .collect::<Vec<_>>();
        checks.push(("credits", all_keys_present(pool, "credit", "credit_id", &credit_ids).await?));

        let seller_ids =
            catalog::sellers().into_iter().map(|seller| seller.seller_id.0).collect::<Vec<_>>();
        checks.push(("sellers", all_keys_present(pool, "seller", "seller_id", &seller_ids).await?));

        let persona_keys =
            catalog::user_profiles().into_iter().map(|profile| profile.profile_key).collect::<Vec<_>>();
        checks.push((
            "user_profiles",
            all_keys_present(pool, "buyer_persona", "profile_key", &persona_keys).await?,
        ));

        let topics = catalog::theory().into_iter().map(|entry| entry.topic).collect::<Vec<_>>();
        checks.push(("theory_topics", all_keys_present(pool, "theory_topic", "topic", &topics).await?));

        let roles = Role::ALL.iter().map(|role| role.as_str().to_string()).collect::<Vec<_>>();
        checks.push((
            "session_profiles",
            all_keys_present(pool, "session_profile", "role", &roles).await?,
        ));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }
}

async fn all_keys_present(
    pool: &DbPool,
    table: &'static str,
    key_column: &'static str,
    keys: &[String],
) -> Result<bool, RepositoryError> {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE {key_column} = ?");
    for key in keys {
        let count: i64 = sqlx::query_scalar(&sql).bind(key).fetch_one(pool).await?;
        if count == 0 {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connect_with_settings, migrations};

    async fn migrated_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    #[tokio::test]
    async fn seeding_is_idempotent_and_verifiable() {
        let pool = migrated_pool().await;

        let first = ReferenceDataset::load(&pool).await.expect("load reference data");
        assert_eq!(
            first,
            SeedCounts {
                credits: 10,
                sellers: 5,
                user_profiles: 4,
                theory_topics: 5,
                session_profiles: 2,
            }
        );

        let second = ReferenceDataset::load(&pool).await.expect("reload reference data");
        assert_eq!(second.total(), 0);

        let verification = ReferenceDataset::verify(&pool).await.expect("verify");
        assert!(verification.all_present, "checks: {:?}", verification.checks);
    }

    #[tokio::test]
    async fn verification_fails_on_empty_database() {
        let pool = migrated_pool().await;

        let verification = ReferenceDataset::verify(&pool).await.expect("verify");
        assert!(!verification.all_present);
        assert!(verification.checks.iter().all(|(_, ok)| !ok));
    }

    #[tokio::test]
    async fn verification_flags_a_deleted_listing() {
        let pool = migrated_pool().await;
        ReferenceDataset::load(&pool).await.expect("load");
        sqlx::query("DELETE FROM credit WHERE credit_id = 'CC-1004'")
            .execute(&pool)
            .await
            .expect("delete listing");

        let verification = ReferenceDataset::verify(&pool).await.expect("verify");
        assert!(!verification.all_present);
        assert!(verification.checks.contains(&("credits", false)));
        assert!(verification.checks.contains(&("sellers", true)));
    }
}
