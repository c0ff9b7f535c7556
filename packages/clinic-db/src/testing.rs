//! Utilitários de teste: banco temporário e dados de exemplo

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::models::{Department, NewAppointment, NewUser, PatientPayload, Role};
use crate::{init_db_pool, DbConfig};

/// Banco SQLite migrado num diretório temporário.
///
/// O `TempDir` precisa viver enquanto o pool estiver em uso.
pub async fn temp_pool() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = tempfile::tempdir()?;
    let config = DbConfig {
        db_path: temp_dir.path().join("clinic-test.db").to_string_lossy().into_owned(),
        max_connections: 2,
        log_statements: false,
    };
    let pool = init_db_pool(&config).await?;
    Ok((temp_dir, pool))
}

pub fn patient(name: &str, id_number: &str) -> PatientPayload {
    PatientPayload {
        name: Some(name.to_string()),
        id_number: Some(id_number.to_string()),
        ..Default::default()
    }
}

pub fn doctor() -> NewUser {
    NewUser {
        email: "doctor@clinic.com".to_string(),
        password: "password123".to_string(),
        name: "李華醫師".to_string(),
        role: Role::Doctor,
        avatar: None,
    }
}

/// Consulta de exemplo; o fuso de `scheduled_at` é preservado
pub fn appointment<Tz: TimeZone>(
    patient_id: &str,
    title: &str,
    scheduled_at: DateTime<Tz>,
) -> NewAppointment {
    NewAppointment {
        id: None,
        patient_id: patient_id.to_string(),
        physician_id: None,
        physician: Some("王大明醫師".to_string()),
        day: 1,
        scheduled_at: scheduled_at.fixed_offset(),
        category: Department::GeneralEnt,
        title: title.to_string(),
        description: None,
        tags: vec!["發燒".to_string(), "抗生素治療".to_string()],
        status: None,
    }
}
