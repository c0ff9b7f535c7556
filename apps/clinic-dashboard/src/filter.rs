//! Filtros aplicados no cliente sobre listas já carregadas
//!
//! Busca por substring, sensível a maiúsculas e sem normalização;
//! termo vazio mantém a lista inteira.

use clinic_db::models::{AppointmentCard, Department};

use crate::display::PatientRow;

/// Filtro de especialidade da barra de ferramentas ("全部" = todas)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Department),
}

impl CategoryFilter {
    pub fn label(&self) -> &'static str {
        match self {
            CategoryFilter::All => "全部",
            CategoryFilter::Only(dept) => dept.label(),
        }
    }

    fn accepts(&self, dept: Department) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == dept,
        }
    }
}

/// Prontuários cujo nome, número de prontuário ou telefone contém o termo
pub fn filter_patients<'a>(rows: &'a [PatientRow], term: &str) -> Vec<&'a PatientRow> {
    rows.iter()
        .filter(|r| r.name.contains(term) || r.id.contains(term) || r.phone.contains(term))
        .collect()
}

/// Cartões da especialidade escolhida cujo título, descrição ou médico contém o termo
pub fn filter_appointments<'a>(
    cards: &'a [AppointmentCard],
    term: &str,
    category: CategoryFilter,
) -> Vec<&'a AppointmentCard> {
    cards
        .iter()
        .filter(|c| category.accepts(c.category))
        .filter(|c| {
            c.title.contains(term) || c.description.contains(term) || c.physician.contains(term)
        })
        .collect()
}
