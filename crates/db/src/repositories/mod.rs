use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use greenearth_core::domain::credit::Credit;
use greenearth_core::domain::footprint::UserFootprint;
use greenearth_core::domain::profile::{Role, SessionProfile, UserProfile};
use greenearth_core::domain::seller::Seller;
use greenearth_core::domain::theory::TheoryEntry;
use greenearth_core::errors::{ApplicationError, DomainError};

pub mod footprint;
pub mod market;
pub mod memory;

pub use footprint::SqlFootprintRepository;
pub use market::SqlMarketRepository;
pub use memory::{InMemoryFootprintRepository, InMemoryMarketRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Domain(error) => Self::Domain(error),
            other => Self::Persistence(other.to_string()),
        }
    }
}

/// Read-only reference data: listings, sellers, personas and theory topics.
/// Listing methods return records in catalog order.
#[async_trait]
pub trait MarketRepository: Send + Sync {
    async fn credits(&self) -> Result<Vec<Credit>, RepositoryError>;
    async fn sellers(&self) -> Result<Vec<Seller>, RepositoryError>;
    async fn user_profiles(&self) -> Result<Vec<UserProfile>, RepositoryError>;
    async fn theory(&self) -> Result<Vec<TheoryEntry>, RepositoryError>;
    async fn session_profile(&self, role: Role) -> Result<Option<SessionProfile>, RepositoryError>;
}

#[async_trait]
pub trait FootprintRepository: Send + Sync {
    /// Upserts `update` into the user's document and returns the stored result.
    async fn save(
        &self,
        user_id: &str,
        update: Map<String, Value>,
    ) -> Result<UserFootprint, RepositoryError>;

    async fn get(&self, user_id: &str) -> Result<Option<UserFootprint>, RepositoryError>;
}
