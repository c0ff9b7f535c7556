//! Clinic DB - Biblioteca compartilhada de acesso ao banco de dados da clínica
//!
//! Esta biblioteca fornece:
//! - Modelos de dados compartilhados (usuários, pacientes, consultas)
//! - Migrações automáticas do banco de dados
//! - Operações de acesso a dados usadas pela API
//! - Pool de conexão e funções de utilidades para SQLite

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::Path;
use tracing::info;

pub mod appointments;
pub mod error;
pub mod migrations;
pub mod models;
pub mod patients;
pub mod users;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::{DbError, DbResult};

/// Configuração da conexão com o banco de dados
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Caminho para o arquivo SQLite
    pub db_path: String,
    /// Número máximo de conexões no pool
    pub max_connections: u32,
    /// Registra cada comando SQL executado no log
    pub log_statements: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            db_path: "data/clinic.db".to_string(),
            max_connections: 5,
            log_statements: false,
        }
    }
}

/// Inicializa o pool de conexões SQLite e aplica as migrações pendentes
pub async fn init_db_pool(config: &DbConfig) -> Result<SqlitePool> {
    let db_path = Path::new(&config.db_path);

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .context("Falha ao criar diretório para banco de dados")?;
        }
    }

    let mut connection_options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true)
        .pragma("synchronous", "NORMAL");

    if !config.log_statements {
        connection_options = connection_options.disable_statement_logging();
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connection_options)
        .await
        .context("Falha ao conectar ao banco de dados SQLite")?;

    migrations::run_migrations(&pool)
        .await
        .context("Falha ao aplicar migrações")?;

    info!("Banco de dados inicializado com sucesso: {}", config.db_path);
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_db_connection() -> Result<()> {
        let temp_dir = tempdir()?;
        let db_path = temp_dir.path().join("nested").join("test.db");

        let config = DbConfig {
            db_path: db_path.to_string_lossy().into_owned(),
            max_connections: 2,
            log_statements: true,
        };

        // O diretório intermediário é criado automaticamente
        let pool = init_db_pool(&config).await?;

        let result: (i64,) = sqlx::query_as("SELECT 1").fetch_one(&pool).await?;
        assert_eq!(result.0, 1);

        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await?;
        assert_eq!(foreign_keys, 1);

        Ok(())
    }
}
