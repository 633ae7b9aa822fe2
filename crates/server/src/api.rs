use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use greenearth_agent::features::{chat_options, ChatOption};
use greenearth_agent::{ChatReply, ChatRuntime, Intent};
use greenearth_core::domain::credit::Credit;
use greenearth_core::domain::footprint::UserFootprint;
use greenearth_core::domain::profile::{Role, UserProfile};
use greenearth_core::domain::seller::Seller;
use greenearth_core::errors::{ApplicationError, InterfaceError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::health::{health, HealthState};

const FOOTPRINT_SAVED: &str = "Footprint saved successfully";
const FOOTPRINT_NOT_FOUND: &str = "No footprint found for this user";

#[derive(Clone)]
pub struct ApiState {
    runtime: Arc<ChatRuntime>,
    health: HealthState,
}

impl ApiState {
    pub fn new(runtime: Arc<ChatRuntime>, health: HealthState) -> Self {
        Self { runtime, health }
    }
}

impl FromRef<ApiState> for HealthState {
    fn from_ref(state: &ApiState) -> Self {
        state.health.clone()
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/options", get(options))
        .route("/roles", get(roles))
        .route("/profiles", get(profiles))
        .route("/route", post(route_message))
        .route("/chat", post(chat))
        .route("/data/marketplace", get(marketplace))
        .route("/data/sellers", get(sellers))
        .route("/data/theory", get(theory))
        .route("/footprint/save", post(save_footprint))
        .route("/footprint/get/{user_id}", get(get_footprint))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

type ApiFailure = (StatusCode, Json<ApiError>);

fn bad_request(message: &str) -> ApiFailure {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError { error: message.to_string(), details: None, correlation_id: None }),
    )
}

fn failure(error: ApplicationError, correlation_id: &str, event_name: &'static str) -> ApiFailure {
    let interface = error.into_interface(correlation_id);
    let status = match &interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!(event_name, correlation_id, error = %interface, "request failed");
    } else {
        warn!(event_name, correlation_id, error = %interface, "request rejected");
    }

    (
        status,
        Json(ApiError {
            error: interface.user_message().to_string(),
            details: Some(interface.message().to_string()),
            correlation_id: Some(interface.correlation_id().to_string()),
        }),
    )
}

/// An unreadable body (wrong content type, bad JSON, mistyped field) is read
/// as an empty request, so field validation answers with a JSON error.
fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>, route: &'static str) -> T {
    match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(
                event_name = "api.request.unreadable_body",
                route,
                status = rejection.status().as_u16(),
                rejection = %rejection.body_text(),
                "treating unreadable request body as empty"
            );
            T::default()
        }
    }
}

fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[derive(Clone, Debug, Serialize)]
pub struct OptionsResponse {
    pub roles: Vec<&'static str>,
    pub options: Vec<ChatOption>,
}

pub async fn options() -> Json<OptionsResponse> {
    Json(OptionsResponse { roles: role_names(), options: chat_options() })
}

#[derive(Clone, Debug, Serialize)]
pub struct RolesResponse {
    pub roles: Vec<&'static str>,
}

pub async fn roles() -> Json<RolesResponse> {
    Json(RolesResponse { roles: role_names() })
}

fn role_names() -> Vec<&'static str> {
    Role::ALL.iter().map(Role::as_str).collect()
}

#[derive(Clone, Debug, Serialize)]
pub struct ProfilesResponse {
    pub profiles: BTreeMap<String, UserProfile>,
}

pub async fn profiles(
    State(state): State<ApiState>,
) -> Result<Json<ProfilesResponse>, ApiFailure> {
    let profiles = state
        .runtime
        .market()
        .user_profiles()
        .await
        .map_err(|error| failure(error.into(), &correlation_id(), "api.profiles.failed"))?;

    Ok(Json(ProfilesResponse {
        profiles: profiles
            .into_iter()
            .map(|profile| (profile.profile_key.clone(), profile))
            .collect(),
    }))
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteResponse {
    pub intent: Intent,
}

pub async fn route_message(
    State(state): State<ApiState>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RouteResponse>, ApiFailure> {
    let request = body_or_default(payload, "/route");
    let Some(message) = non_blank(request.message.as_deref()) else {
        return Err(bad_request("message is required"));
    };

    let correlation_id = correlation_id();
    let intent = state
        .runtime
        .route(message)
        .await
        .map_err(|error| failure(error, &correlation_id, "api.route.failed"))?;

    info!(
        event_name = "api.route.completed",
        correlation_id = %correlation_id,
        intent = %intent,
        "message classified"
    );
    Ok(Json(RouteResponse { intent }))
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Buyer persona key; overrides detection from the message.
    #[serde(default)]
    pub profile: Option<String>,
}

pub async fn chat(
    State(state): State<ApiState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiFailure> {
    let request = body_or_default(payload, "/chat");
    let Some(message) = non_blank(request.message.as_deref()) else {
        return Err(bad_request("message is required"));
    };

    let correlation_id = correlation_id();
    let role = match non_blank(request.role.as_deref()) {
        Some(raw) => match raw.parse::<Role>() {
            Ok(role) => Some(role),
            Err(error) => {
                warn!(
                    event_name = "api.chat.unknown_role",
                    correlation_id = %correlation_id,
                    error = %error,
                    "ignoring unknown role"
                );
                None
            }
        },
        None => None,
    };

    let session = state
        .runtime
        .session_for(role, request.user_id.as_deref())
        .await
        .map_err(|error| failure(error, &correlation_id, "api.chat.failed"))?;

    let reply = state
        .runtime
        .respond(message, &session, non_blank(request.profile.as_deref()))
        .await
        .map_err(|error| failure(error, &correlation_id, "api.chat.failed"))?;

    info!(
        event_name = "api.chat.completed",
        correlation_id = %correlation_id,
        intent = %reply.intent,
        "chat reply produced"
    );
    Ok(Json(reply))
}

#[derive(Clone, Debug, Serialize)]
pub struct MarketplaceResponse {
    pub marketplace: Vec<Credit>,
}

pub async fn marketplace(
    State(state): State<ApiState>,
) -> Result<Json<MarketplaceResponse>, ApiFailure> {
    let marketplace = state
        .runtime
        .market()
        .credits()
        .await
        .map_err(|error| failure(error.into(), &correlation_id(), "api.marketplace.failed"))?;
    Ok(Json(MarketplaceResponse { marketplace }))
}

#[derive(Clone, Debug, Serialize)]
pub struct SellersResponse {
    pub sellers: BTreeMap<String, Seller>,
}

pub async fn sellers(State(state): State<ApiState>) -> Result<Json<SellersResponse>, ApiFailure> {
    let sellers = state
        .runtime
        .market()
        .sellers()
        .await
        .map_err(|error| failure(error.into(), &correlation_id(), "api.sellers.failed"))?;

    Ok(Json(SellersResponse {
        sellers: sellers
            .into_iter()
            .map(|seller| (seller.seller_id.as_str().to_string(), seller))
            .collect(),
    }))
}

#[derive(Clone, Debug, Serialize)]
pub struct TheoryResponse {
    pub theory: BTreeMap<String, String>,
}

pub async fn theory(State(state): State<ApiState>) -> Result<Json<TheoryResponse>, ApiFailure> {
    let entries = state
        .runtime
        .market()
        .theory()
        .await
        .map_err(|error| failure(error.into(), &correlation_id(), "api.theory.failed"))?;

    Ok(Json(TheoryResponse {
        theory: entries.into_iter().map(|entry| (entry.topic, entry.content)).collect(),
    }))
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FootprintSaveRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub footprint_data: Option<Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FootprintResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: Option<UserFootprint>,
}

pub async fn save_footprint(
    State(state): State<ApiState>,
    payload: Result<Json<FootprintSaveRequest>, JsonRejection>,
) -> Result<Json<FootprintResponse>, ApiFailure> {
    let request = body_or_default(payload, "/footprint/save");
    let Some(user_id) = non_blank(request.user_id.as_deref()) else {
        return Err(bad_request("user_id is required"));
    };
    let data = match request.footprint_data {
        Some(Value::Object(data)) if !data.is_empty() => data,
        _ => return Err(bad_request("footprint_data is required")),
    };

    let correlation_id = correlation_id();
    let saved = state
        .runtime
        .footprints()
        .save(user_id, data)
        .await
        .map_err(|error| failure(error.into(), &correlation_id, "api.footprint.save_failed"))?;

    info!(
        event_name = "api.footprint.saved",
        correlation_id = %correlation_id,
        user_id = %saved.user_id,
        "footprint saved"
    );
    Ok(Json(FootprintResponse {
        status: "success",
        message: Some(FOOTPRINT_SAVED),
        data: Some(saved),
    }))
}

pub async fn get_footprint(
    State(state): State<ApiState>,
    Path(user_id): Path<String>,
) -> Result<Json<FootprintResponse>, ApiFailure> {
    let found = state
        .runtime
        .footprints()
        .get(&user_id)
        .await
        .map_err(|error| failure(error.into(), &correlation_id(), "api.footprint.get_failed"))?;

    Ok(Json(match found {
        Some(footprint) => FootprintResponse { status: "success", message: None, data: Some(footprint) },
        None => FootprintResponse {
            status: "not_found",
            message: Some(FOOTPRINT_NOT_FOUND),
            data: None,
        },
    }))
}
