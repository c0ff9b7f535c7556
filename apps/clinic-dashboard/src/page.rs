//! Páginas do painel como tipo soma

use crate::display::AppointmentDetail;

/// Item do menu lateral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarItem {
    Dashboard,
    Records,
    Inventory,
}

/// Página exibida; o detalhe sempre carrega a consulta selecionada
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Dashboard,
    Records,
    /// Módulo de estoque de medicamentos, ainda sem conteúdo
    Inventory,
    RecordDetail(AppointmentDetail),
}

impl Page {
    /// Item destacado no menu; o detalhe pertence ao painel
    pub fn sidebar_item(&self) -> SidebarItem {
        match self {
            Page::Dashboard | Page::RecordDetail(_) => SidebarItem::Dashboard,
            Page::Records => SidebarItem::Records,
            Page::Inventory => SidebarItem::Inventory,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Dashboard => "診所儀表板",
            Page::Records => "病歷資料管理",
            Page::Inventory => "藥品庫存",
            Page::RecordDetail(detail) => &detail.patient_name,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::Dashboard
    }
}

impl From<SidebarItem> for Page {
    fn from(item: SidebarItem) -> Self {
        match item {
            SidebarItem::Dashboard => Page::Dashboard,
            SidebarItem::Records => Page::Records,
            SidebarItem::Inventory => Page::Inventory,
        }
    }
}
