//! Rotas HTTP: um handler por operação da camada de dados

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use clinic_db::models::{
    Appointment, AppointmentCard, NewAppointment, Patient, PatientPayload, StatusUpdate,
    UserProfile,
};
use clinic_db::{appointments, patients, users, DbError};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::built_info;
use crate::config::ServerConfig;
use crate::error::ApiError;

/// Estado compartilhado pelos handlers; apenas o pool de conexões
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Monta o roteador completo com as camadas de CORS, compressão e trace
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let mut api = Router::new()
        .route("/api/health", get(health))
        .route("/api/patients", get(list_patients).post(create_patient))
        .route("/api/patients/:id", get(get_patient).patch(update_patient))
        .route(
            "/api/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route(
            "/api/appointments/:id",
            get(get_appointment).patch(update_appointment),
        )
        .route("/api/appointments/:id/status", patch(update_appointment))
        .route("/api/login", post(login));

    if let Some(dir) = &config.static_dir {
        // SPA: rotas desconhecidas caem no index.html
        let index = ServeFile::new(dir.join("index.html"));
        api = api.fallback_service(ServeDir::new(dir).fallback(index));
    }

    api.with_state(state)
        .layer(ConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": built_info::PKG_VERSION }))
}

async fn list_patients(State(state): State<AppState>) -> Result<Json<Vec<Patient>>, ApiError> {
    let patients = patients::list_patients(&state.pool)
        .await
        .map_err(ApiError::storage("Failed to fetch patients"))?;
    Ok(Json(patients))
}

async fn create_patient(
    State(state): State<AppState>,
    payload: Result<Json<PatientPayload>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Json(payload) = payload.map_err(ApiError::invalid_body("Failed to create patient"))?;
    let patient = patients::create_patient(&state.pool, payload)
        .await
        .map_err(ApiError::storage("Failed to create patient"))?;
    Ok(Json(patient))
}

async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let patient = patients::get_patient(&state.pool, &id)
        .await
        .map_err(ApiError::storage("Failed to fetch patient"))?;
    Ok(Json(patient))
}

async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    changes: Result<Json<PatientPayload>, JsonRejection>,
) -> Result<Json<Patient>, ApiError> {
    let Json(changes) = changes.map_err(ApiError::invalid_body("Failed to update patient"))?;
    let patient = patients::update_patient(&state.pool, &id, changes)
        .await
        .map_err(ApiError::storage("Failed to update patient"))?;
    Ok(Json(patient))
}

async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<AppointmentCard>>, ApiError> {
    let cards = appointments::list_appointment_cards(&state.pool)
        .await
        .map_err(ApiError::storage("Failed to fetch appointments"))?;
    Ok(Json(cards))
}

async fn create_appointment(
    State(state): State<AppState>,
    new: Result<Json<NewAppointment>, JsonRejection>,
) -> Result<Json<Appointment>, ApiError> {
    let Json(new) = new.map_err(ApiError::invalid_body("Failed to create appointment"))?;
    let appointment = appointments::create_appointment(&state.pool, new)
        .await
        .map_err(ApiError::storage("Failed to create appointment"))?;
    Ok(Json(appointment))
}

async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = appointments::get_appointment(&state.pool, &id)
        .await
        .map_err(ApiError::storage("Failed to fetch appointment"))?;
    Ok(Json(appointment))
}

async fn update_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    update: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<Appointment>, ApiError> {
    let Json(update) = update.map_err(ApiError::invalid_body("Failed to update appointment"))?;
    let appointment = appointments::update_status(&state.pool, &id, update)
        .await
        .map_err(ApiError::storage("Failed to update appointment"))?;
    Ok(Json(appointment))
}

async fn login(
    State(state): State<AppState>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<UserProfile>, ApiError> {
    let Json(request) = request.map_err(ApiError::invalid_body("Login failed"))?;
    match users::verify_credentials(&state.pool, &request.email, &request.password).await {
        Ok(profile) => Ok(Json(profile)),
        Err(DbError::Unauthorized) => Err(ApiError::Unauthorized),
        Err(other) => Err(ApiError::storage("Login failed")(other)),
    }
}
