use greenearth_core::catalog;
use greenearth_core::domain::profile::Role;
use greenearth_db::repositories::{
    FootprintRepository, InMemoryFootprintRepository, InMemoryMarketRepository, MarketRepository,
    SqlFootprintRepository, SqlMarketRepository,
};
use greenearth_db::{connect_with_settings, migrations, DbPool, ReferenceDataset};
use serde_json::{json, Map, Value};

async fn seeded_pool() -> DbPool {
    let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("pool should connect");
    migrations::run_pending(&pool).await.expect("migrations should apply");
    ReferenceDataset::load(&pool).await.expect("reference data should load");
    pool
}

fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

async fn assert_market_contract(repository: &dyn MarketRepository) {
    assert_eq!(repository.credits().await.expect("credits"), catalog::credits());
    assert_eq!(repository.sellers().await.expect("sellers"), catalog::sellers());
    assert_eq!(repository.user_profiles().await.expect("profiles"), catalog::user_profiles());
    assert_eq!(repository.theory().await.expect("theory"), catalog::theory());

    for role in Role::ALL {
        let profile = repository.session_profile(role).await.expect("session profile");
        assert_eq!(profile.map(|profile| profile.role()), Some(role));
    }
}

async fn assert_footprint_contract(repository: &dyn FootprintRepository) {
    assert_eq!(repository.get("u-contract").await.expect("get"), None);

    repository
        .save("u-contract", object(json!({"totalEmissions": 7.5, "dominantSector": "Energy"})))
        .await
        .expect("first save");
    let merged = repository
        .save(" u-contract ", object(json!({"totalEmissions": 6.0, "user_id": "spoofed"})))
        .await
        .expect("second save");

    assert_eq!(merged.user_id, "u-contract");
    assert_eq!(merged.data.get("totalEmissions"), Some(&json!(6.0)));
    assert_eq!(merged.data.get("dominantSector"), Some(&json!("Energy")));
    assert!(!merged.data.contains_key("user_id"));

    let stored = repository.get("u-contract").await.expect("get").expect("stored footprint");
    assert_eq!(stored, merged);

    assert!(repository.save("u-contract", Map::new()).await.is_err());
    assert!(repository.save("   ", object(json!({"a": 1}))).await.is_err());
}

#[tokio::test]
async fn sql_and_memory_market_repositories_agree() {
    let pool = seeded_pool().await;

    assert_market_contract(&SqlMarketRepository::new(pool.clone())).await;
    assert_market_contract(&InMemoryMarketRepository::default()).await;

    pool.close().await;
}

#[tokio::test]
async fn sql_and_memory_footprint_repositories_agree() {
    let pool = seeded_pool().await;

    assert_footprint_contract(&SqlFootprintRepository::new(pool.clone())).await;
    assert_footprint_contract(&InMemoryFootprintRepository::default()).await;

    pool.close().await;
}
