//! Estado transitório das telas: página atual, busca e prontuários carregados
//!
//! A sessão é recebida explicitamente por quem precisa de dados da API.

use clinic_db::models::AppointmentCard;
use tracing::warn;

use crate::display::{dashboard_stats, AppointmentDetail, DashboardStats, PatientRow};
use crate::filter::{filter_appointments, filter_patients, CategoryFilter};
use crate::page::{Page, SidebarItem};
use crate::session::Session;

#[derive(Debug, Default)]
pub struct Dashboard {
    page: Page,
    search_term: String,
    category: CategoryFilter,
    patients: Vec<PatientRow>,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn navigate(&mut self, item: SidebarItem) {
        self.page = item.into();
    }

    /// Abre o detalhe da consulta selecionada
    pub fn open_detail(&mut self, card: AppointmentCard) {
        self.page = Page::RecordDetail(AppointmentDetail::from(card));
    }

    /// Volta ao painel e pede uma atualização, pois a consulta pode ter mudado
    pub fn back_to_dashboard(&mut self, session: &Session) {
        self.page = Page::Dashboard;
        session.refresh_appointments();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    /// Busca os prontuários; em caso de falha mantém a lista anterior
    pub async fn load_patients(&mut self, session: &Session) {
        match session.client().patients().await {
            Ok(patients) => {
                self.patients = patients.into_iter().map(PatientRow::from).collect();
            }
            Err(e) => warn!(error = %e, "Falha ao carregar prontuários; mantendo lista anterior"),
        }
    }

    pub fn visible_patients(&self) -> Vec<&PatientRow> {
        filter_patients(&self.patients, &self.search_term)
    }

    pub fn visible_appointments(&self, session: &Session) -> Vec<AppointmentCard> {
        let cards = session.appointments();
        filter_appointments(&cards, &self.search_term, self.category)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn stats(&self, session: &Session) -> DashboardStats {
        dashboard_stats(&self.visible_appointments(session))
    }
}
