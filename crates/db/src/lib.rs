pub mod connection;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect_from_config, connect_with_settings, ping, DbPool};
pub use fixtures::{ReferenceDataset, SeedCounts, VerificationResult};
pub use repositories::{
    FootprintRepository, InMemoryFootprintRepository, InMemoryMarketRepository, MarketRepository,
    RepositoryError, SqlFootprintRepository, SqlMarketRepository,
};
