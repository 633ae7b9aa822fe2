use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use greenearth_db::{ping, DbPool};
use serde::Serialize;

/// What the server knows about its model backend. No request is made to it
/// during health checks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LlmReadiness {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
}

#[derive(Clone)]
pub struct HealthState {
    pub db_pool: DbPool,
    pub llm: LlmReadiness,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub database: HealthCheck,
    pub llm: HealthCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = database_check(&state.db_pool).await;
    let llm = llm_check(&state.llm);
    let ready = database.status == "ready" && llm.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "greenearth-server runtime initialized".to_string(),
        },
        database,
        llm,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn database_check(pool: &DbPool) -> HealthCheck {
    match ping(pool).await {
        Ok(()) => HealthCheck { status: "ready", detail: "database query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("database query failed: {error}") }
        }
    }
}

fn llm_check(llm: &LlmReadiness) -> HealthCheck {
    if llm.model.trim().is_empty() {
        return HealthCheck { status: "degraded", detail: "no llm model configured".to_string() };
    }
    HealthCheck {
        status: "ready",
        detail: format!("{} model `{}` via {}", llm.provider, llm.model, llm.endpoint),
    }
}
