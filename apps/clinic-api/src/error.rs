//! Conversão de falhas da camada de dados em respostas HTTP
//!
//! O cliente só recebe uma mensagem curta; a causa fica no log.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinic_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Credenciais inválidas")]
    Unauthorized,

    /// Qualquer outra falha, com a mensagem devolvida ao cliente
    #[error("{message}: {source}")]
    Storage {
        message: &'static str,
        #[source]
        source: DbError,
    },

    /// Corpo JSON ilegível ou sem campos obrigatórios
    #[error("{message}: {source}")]
    InvalidBody {
        message: &'static str,
        #[source]
        source: JsonRejection,
    },
}

impl ApiError {
    /// Adaptador para `map_err` que anexa a mensagem do endpoint
    pub fn storage(message: &'static str) -> impl FnOnce(DbError) -> ApiError {
        move |source| ApiError::Storage { message, source }
    }

    /// Mesmo adaptador para a rejeição do extrator `Json`
    pub fn invalid_body(message: &'static str) -> impl FnOnce(JsonRejection) -> ApiError {
        move |source| ApiError::InvalidBody { message, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Storage { .. } | ApiError::InvalidBody { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Unauthorized => {
                warn!("Tentativa de login recusada");
                "Invalid credentials"
            }
            ApiError::Storage { message, source } => {
                error!(error = %source, "{}", message);
                *message
            }
            ApiError::InvalidBody { message, source } => {
                warn!(error = %source, "{}: corpo da requisição inválido", message);
                *message
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
