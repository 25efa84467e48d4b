use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{json, Value};

use spl_chaincode::Operation;
use spl_types::{ClassLevel, ClassRecord, Profile};

use crate::error::{GatewayError, GatewayResult};
use crate::state::AppState;

/// Body of `POST /v1/profiles`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub user_id: String,
    pub class: ClassRecord,
    #[serde(default)]
    pub bc: Vec<String>,
}

/// Body of `PUT /v1/profiles/{user_id}/classes/{level}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateClassRequest {
    pub class: ClassRecord,
    #[serde(default)]
    pub bc: Vec<String>,
}

/// Body of `POST /v1/invoke`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub tx_id: String,
    /// Chaincode payload as returned; `null` for operations that return nothing.
    pub payload: Option<Box<RawValue>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub class: Option<String>,
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler() -> Json<Value> {
    let functions: Vec<_> = Operation::ALL.iter().map(Operation::name).collect();
    Json(json!({
        "name": "spl-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "functions": functions,
    }))
}

/// `GET /v1/profiles/{user_id}`: the query result array, or a single class
/// when `?class=` is given.
pub async fn get_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ProfileQuery>,
) -> GatewayResult<Response> {
    let level = query.class.as_deref().map(strict_level).transpose()?;
    let id = user_id.clone();
    let (_, results) = state
        .transact("getProfileByID", move |cc, store| cc.manager().get_by_id(store, &id))
        .await?;

    let Some(first) = results.first() else {
        return Err(GatewayError::ProfileNotFound(user_id));
    };
    match level {
        Some(level) => {
            let profile = first.profile()?;
            Ok(Json(profile.class(level).clone()).into_response())
        }
        None => Ok(Json(results).into_response()),
    }
}

/// `POST /v1/profiles`: create a profile whose grade 10 slot is `class`.
pub async fn create_profile_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateProfileRequest>,
) -> GatewayResult<(StatusCode, Json<Profile>)> {
    let (_, profile) = state
        .transact("initProfile", move |cc, store| {
            cc.manager().create(store, &req.user_id, req.class, req.bc)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// `PUT /v1/profiles/{user_id}/classes/{level}`: replace one class slot.
pub async fn update_class_handler(
    State(state): State<AppState>,
    Path((user_id, level)): Path<(String, String)>,
    Json(req): Json<UpdateClassRequest>,
) -> GatewayResult<Json<Profile>> {
    let level = strict_level(&level)?;
    let (_, profile) = state
        .transact("updateProfile", move |cc, store| {
            cc.manager().update(store, &user_id, req.class, req.bc, level)
        })
        .await?;
    Ok(Json(profile))
}

/// `DELETE /v1/profiles/{user_id}`.
pub async fn delete_profile_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> GatewayResult<StatusCode> {
    state
        .transact("deleteProfile", move |cc, store| cc.manager().delete(store, &user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /v1/invoke`: run a chaincode function with positional arguments.
pub async fn invoke_handler(
    State(state): State<AppState>,
    Json(req): Json<InvokeRequest>,
) -> GatewayResult<Json<InvokeResponse>> {
    let (tx_id, payload) = state
        .transact("invoke", move |cc, store| cc.execute(store, &req.function, &req.args))
        .await?;

    let payload = if payload.is_empty() {
        None
    } else {
        let raw = serde_json::from_slice::<Box<RawValue>>(&payload)
            .map_err(|e| GatewayError::Internal(format!("chaincode payload is not JSON: {e}")))?;
        Some(raw)
    };
    Ok(Json(InvokeResponse {
        tx_id: tx_id.to_string(),
        payload,
    }))
}

/// HTTP callers must name the slot exactly; the chaincode's catch-all
/// selector is only used on the raw invoke path.
fn strict_level(s: &str) -> GatewayResult<ClassLevel> {
    match s {
        "10" | "11" | "12" => Ok(ClassLevel::from_selector(s)),
        other => Err(GatewayError::BadRequest(format!(
            "class level must be 10, 11 or 12, got {other:?}"
        ))),
    }
}
