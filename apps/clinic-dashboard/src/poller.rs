//! Atualização periódica das consultas exibidas no painel
//!
//! Substitui um canal de push: a cada intervalo (e sob demanda) a lista é
//! buscada de novo e publicada num `watch`. Falhas são registradas e a
//! última lista válida continua visível.

use async_trait::async_trait;
use clinic_db::models::AppointmentCard;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::client::ClientError;

/// Fonte das consultas do painel
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentFeed: Send + Sync {
    async fn fetch_appointments(&self) -> Result<Vec<AppointmentCard>, ClientError>;
}

/// Tarefa de atualização vinculada à sessão; cancelada no `cancel` ou no drop
pub struct AppointmentPoller {
    handle: JoinHandle<()>,
    refresh: Arc<Notify>,
    latest: watch::Receiver<Vec<AppointmentCard>>,
}

impl AppointmentPoller {
    /// Inicia a tarefa; a primeira busca acontece imediatamente
    pub fn spawn(feed: Arc<dyn AppointmentFeed>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(Vec::new());
        let refresh = Arc::new(Notify::new());
        let handle = tokio::spawn(poll_loop(feed, interval, Arc::clone(&refresh), tx));

        Self {
            handle,
            refresh,
            latest: rx,
        }
    }

    /// Pede uma busca fora do intervalo regular
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    /// Cópia da última lista publicada
    pub fn latest(&self) -> Vec<AppointmentCard> {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<AppointmentCard>> {
        self.latest.clone()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for AppointmentPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn poll_loop(
    feed: Arc<dyn AppointmentFeed>,
    interval: Duration,
    refresh: Arc<Notify>,
    tx: watch::Sender<Vec<AppointmentCard>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = refresh.notified() => {
                ticker.reset();
            }
        }

        match feed.fetch_appointments().await {
            Ok(cards) => {
                debug!(count = cards.len(), "Consultas atualizadas");
                if tx.send(cards).is_err() {
                    // Nenhum receptor restante
                    break;
                }
            }
            Err(e) => warn!(error = %e, "Falha ao atualizar consultas; mantendo lista anterior"),
        }
    }
}
