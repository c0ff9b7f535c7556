//! Cliente HTTP da API da clínica

use async_trait::async_trait;
use clinic_db::models::{Appointment, AppointmentCard, Patient, StatusUpdate, UserProfile};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::poller::AppointmentFeed;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Falha na requisição HTTP: {0}")]
    Http(#[from] reqwest::Error),

    /// Login recusado; a mensagem vem do servidor
    #[error("{message}")]
    Unauthorized { message: String },

    #[error("Servidor respondeu {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Nenhum usuário conectado")]
    NotLoggedIn,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Acesso tipado aos endpoints `/api/*`
#[derive(Debug, Clone)]
pub struct ClinicClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClinicClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let fallback = status.canonical_reason().unwrap_or("erro desconhecido").to_string();
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or(fallback);

        if status == StatusCode::UNAUTHORIZED {
            Err(ClientError::Unauthorized { message })
        } else {
            Err(ClientError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let response = self
            .http
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::read(response).await
    }

    pub async fn patients(&self) -> Result<Vec<Patient>, ClientError> {
        let response = self.http.get(self.url("/api/patients")).send().await?;
        let patients: Vec<Patient> = Self::read(response).await?;
        debug!(count = patients.len(), "Pacientes recebidos");
        Ok(patients)
    }

    pub async fn appointments(&self) -> Result<Vec<AppointmentCard>, ClientError> {
        let response = self.http.get(self.url("/api/appointments")).send().await?;
        Self::read(response).await
    }

    pub async fn update_status(
        &self,
        id: &str,
        update: &StatusUpdate,
    ) -> Result<Appointment, ClientError> {
        let response = self
            .http
            .patch(self.url(&format!("/api/appointments/{}", id)))
            .json(update)
            .send()
            .await?;
        Self::read(response).await
    }
}

#[async_trait]
impl AppointmentFeed for ClinicClient {
    async fn fetch_appointments(&self) -> Result<Vec<AppointmentCard>, ClientError> {
        self.appointments().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_db::models::{Department, Role};
    use serde_json::json;
    use tokio_test::assert_ok;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn doctor_json() -> serde_json::Value {
        json!({
            "id": "u1",
            "email": "doctor@clinic.com",
            "name": "李華醫師",
            "role": "doctor",
            "createdAt": "2025-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_login_decodes_profile() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .and(body_json(json!({ "email": "doctor@clinic.com", "password": "password123" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(doctor_json()))
            .mount(&server)
            .await;

        let client = ClinicClient::new(server.uri());
        let user = assert_ok!(client.login("doctor@clinic.com", "password123").await);
        assert_eq!(user.role, Role::Doctor);
    }

    #[tokio::test]
    async fn test_login_failure_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
            )
            .mount(&server)
            .await;

        let client = ClinicClient::new(format!("{}/", server.uri()));
        match client.login("doctor@clinic.com", "wrong").await {
            Err(ClientError::Unauthorized { message }) => {
                assert_eq!(message, "Invalid credentials")
            }
            other => panic!("esperado Unauthorized, recebido {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_without_body_uses_reason() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/appointments"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ClinicClient::new(server.uri());
        match client.appointments().await {
            Err(ClientError::Server { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("esperado erro de servidor, recebido {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_appointments_decode_dashboard_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/appointments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "appointment-1",
                "day": 1,
                "category": "耳鼻喉科",
                "title": "陳小明 - 急性扁桃腺炎",
                "description": "",
                "tags": ["發燒"],
                "date": "09:00 AM",
                "physician": "李華醫師",
                "status": "pending"
            }])))
            .mount(&server)
            .await;

        let cards = assert_ok!(ClinicClient::new(server.uri()).appointments().await);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].category, Department::GeneralEnt);
    }

    #[tokio::test]
    async fn test_update_status_sends_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/appointments/appointment-1"))
            .and(body_json(json!({ "status": "completed" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "appointment-1",
                "patientId": "p1",
                "physicianId": null,
                "physician": "李華醫師",
                "day": 1,
                "scheduledAt": "2025-01-01T09:00:00Z",
                "category": "耳鼻喉科",
                "title": "陳小明 - 急性扁桃腺炎",
                "description": null,
                "tags": [],
                "status": "completed",
                "prescription": null,
                "createdAt": "2025-01-01T00:00:00Z",
                "updatedAt": "2025-01-01T10:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let update = StatusUpdate {
            status: "completed".to_string(),
            prescription: None,
        };
        let updated = assert_ok!(
            ClinicClient::new(server.uri())
                .update_status("appointment-1", &update)
                .await
        );
        assert_eq!(updated.status, "completed");
    }
}
