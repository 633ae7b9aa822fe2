use std::sync::Arc;

use greenearth_agent::{ChatRuntime, HttpLlmClient, LlmClient, LlmError};
use greenearth_core::config::{AppConfig, ConfigError, LoadOptions};
use greenearth_db::repositories::{RepositoryError, SqlFootprintRepository, SqlMarketRepository};
use greenearth_db::{connect_from_config, migrations, DbPool, ReferenceDataset};
use thiserror::Error;
use tracing::info;

use crate::health::LlmReadiness;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runtime: Arc<ChatRuntime>,
    pub llm: LlmReadiness,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("reference data seeding failed: {0}")]
    Seed(#[source] RepositoryError),
    #[error("llm client setup failed: {0}")]
    Llm(#[source] LlmError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_from_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let seeded = ReferenceDataset::load(&db_pool).await.map_err(BootstrapError::Seed)?;
    info!(
        event_name = "system.bootstrap.reference_seeded",
        correlation_id = "bootstrap",
        inserted = seeded.total(),
        "reference dataset ensured"
    );

    let llm_client = HttpLlmClient::from_config(&config.llm).map_err(BootstrapError::Llm)?;
    let llm = LlmReadiness {
        provider: config.llm.provider.as_str().to_string(),
        model: llm_client.model().to_string(),
        endpoint: llm_client.endpoint().to_string(),
    };
    info!(
        event_name = "system.bootstrap.llm_ready",
        correlation_id = "bootstrap",
        provider = %llm.provider,
        model = %llm.model,
        "llm client configured"
    );

    let runtime = ChatRuntime::new(
        Arc::new(llm_client),
        Arc::new(SqlMarketRepository::new(db_pool.clone())),
        Arc::new(SqlFootprintRepository::new(db_pool.clone())),
    );

    Ok(Application { config, db_pool, runtime: Arc::new(runtime), llm })
}

#[cfg(test)]
mod tests {
    use greenearth_core::config::{ConfigOverrides, LlmProvider, LoadOptions};
    use greenearth_core::domain::profile::Role;

    use crate::bootstrap::{bootstrap, BootstrapError};

    fn overrides(api_key: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                llm_provider: Some(LlmProvider::Groq),
                llm_api_key: Some(api_key.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_llm_api_key() {
        let result = bootstrap(overrides("   ")).await;

        let error = result.err().expect("blank api key must fail");
        assert!(matches!(error, BootstrapError::Config(_)));
        assert!(error.to_string().contains("llm.api_key"));
    }

    #[tokio::test]
    async fn bootstrap_migrates_seeds_and_wires_runtime() {
        let app = bootstrap(overrides("gsk-test")).await.expect("bootstrap should succeed");

        let credits = app.runtime.market().credits().await.expect("credits");
        assert_eq!(credits.len(), 10);

        let seller = app.runtime.market().session_profile(Role::Seller).await.expect("seller");
        assert!(seller.is_some());

        assert_eq!(app.llm.provider, "groq");
        assert!(app.llm.endpoint.ends_with("/chat/completions"));
    }
}
