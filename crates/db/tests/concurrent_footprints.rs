use std::sync::Arc;

use greenearth_db::repositories::{FootprintRepository, SqlFootprintRepository};
use greenearth_db::{connect_with_settings, migrations, DbPool};
use serde_json::{json, Map, Value};

const WRITERS: usize = 40;

async fn file_pool(dir: &tempfile::TempDir) -> DbPool {
    let url = format!("sqlite://{}", dir.path().join("footprints.db").display());
    let pool = connect_with_settings(&url, 5, 30).await.expect("pool should connect");
    migrations::run_pending(&pool).await.expect("migrations should apply");
    pool
}

fn update(key: String, value: usize) -> Map<String, Value> {
    let mut data = Map::new();
    data.insert(key, json!(value));
    data
}

async fn save_concurrently(
    repository: Arc<SqlFootprintRepository>,
    writes: Vec<(String, Map<String, Value>)>,
) -> Vec<String> {
    let handles = writes
        .into_iter()
        .map(|(user_id, data)| {
            let repository = repository.clone();
            tokio::spawn(async move { repository.save(&user_id, data).await })
        })
        .collect::<Vec<_>>();

    let mut errors = Vec::new();
    for handle in handles {
        match handle.await.expect("save task should not panic") {
            Ok(_) => {}
            Err(error) => errors.push(error.to_string()),
        }
    }
    errors
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_for_one_user_all_land() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = file_pool(&dir).await;
    let repository = Arc::new(SqlFootprintRepository::new(pool.clone()));

    let writes =
        (0..WRITERS).map(|i| ("u-shared".to_string(), update(format!("sector_{i}"), i))).collect();
    let errors = save_concurrently(repository.clone(), writes).await;

    assert!(errors.is_empty(), "saves failed: {errors:?}");
    let stored = repository.get("u-shared").await.expect("get").expect("stored footprint");
    assert_eq!(stored.data.len(), WRITERS, "every merged key should survive");

    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_saves_for_distinct_users_all_land() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pool = file_pool(&dir).await;
    let repository = Arc::new(SqlFootprintRepository::new(pool.clone()));

    let writes = (0..WRITERS)
        .map(|i| (format!("u-{i}"), update("totalEmissions".to_string(), i)))
        .collect();
    let errors = save_concurrently(repository.clone(), writes).await;

    assert!(errors.is_empty(), "saves failed: {errors:?}");
    for i in 0..WRITERS {
        let stored = repository.get(&format!("u-{i}")).await.expect("get").expect("stored");
        assert_eq!(stored.data.get("totalEmissions"), Some(&json!(i)));
    }

    pool.close().await;
}
