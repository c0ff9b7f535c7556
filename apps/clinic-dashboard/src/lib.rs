//! Painel da clínica
//!
//! Camada de composição das telas sobre a API HTTP: sessão do usuário,
//! páginas, filtros locais e atualização periódica das consultas.

pub mod client;
pub mod dashboard;
pub mod display;
pub mod filter;
pub mod page;
pub mod poller;
pub mod session;

pub use client::{ClientError, ClinicClient};
pub use dashboard::Dashboard;
pub use filter::CategoryFilter;
pub use page::{Page, SidebarItem};
pub use session::{DashboardConfig, Session};
