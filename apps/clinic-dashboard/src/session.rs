//! Sessão do usuário conectado
//!
//! Guarda apenas o usuário (sem token) e a tarefa de atualização das
//! consultas, que vive enquanto a sessão estiver aberta.

use clinic_db::models::{AppointmentCard, UserProfile};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

use crate::client::{ClientError, ClinicClient};
use crate::poller::{AppointmentFeed, AppointmentPoller};

/// Intervalo padrão entre atualizações do painel
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub base_url: String,
    pub poll_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

pub struct Session {
    client: Arc<ClinicClient>,
    poll_interval: Duration,
    user: Option<UserProfile>,
    poller: Option<AppointmentPoller>,
}

impl Session {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            client: Arc::new(ClinicClient::new(config.base_url.clone())),
            poll_interval: config.poll_interval,
            user: None,
            poller: None,
        }
    }

    pub fn client(&self) -> &ClinicClient {
        &self.client
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Autentica e inicia a atualização periódica das consultas.
    ///
    /// Em caso de falha a sessão permanece como estava.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<&UserProfile, ClientError> {
        let user = self.client.login(email, password).await?;
        info!(user_id = %user.id, role = %user.role, "Sessão iniciada");

        let feed: Arc<dyn AppointmentFeed> = self.client.clone();
        self.poller = Some(AppointmentPoller::spawn(feed, self.poll_interval));
        Ok(&*self.user.insert(user))
    }

    /// Encerra a sessão e cancela a atualização periódica
    pub fn logout(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
        if let Some(user) = self.user.take() {
            info!(user_id = %user.id, "Sessão encerrada");
        }
    }

    /// Última lista de consultas recebida (vazia fora da sessão)
    pub fn appointments(&self) -> Vec<AppointmentCard> {
        self.poller.as_ref().map(|p| p.latest()).unwrap_or_default()
    }

    pub fn subscribe(&self) -> Result<watch::Receiver<Vec<AppointmentCard>>, ClientError> {
        self.poller
            .as_ref()
            .map(|p| p.subscribe())
            .ok_or(ClientError::NotLoggedIn)
    }

    /// Pede uma atualização imediata, sem esperar o próximo intervalo
    pub fn refresh_appointments(&self) {
        if let Some(poller) = &self.poller {
            poller.refresh_now();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().map_or(false, |p| p.is_running())
    }
}
