//! Definições de erro para a biblioteca clinic-db
//!
//! Este módulo define os tipos de erro usados pela camada de acesso a dados

use thiserror::Error;

/// Erros específicos para operações de banco de dados
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Erro de conexão com banco de dados: {0}")]
    ConnectionError(String),

    #[error("Erro de migração: {0}")]
    MigrationError(String),

    #[error("Erro de consulta: {0}")]
    QueryError(String),

    #[error("Entidade não encontrada: {0}")]
    NotFound(String),

    /// Violação de unicidade (CPF/documento duplicado, e-mail duplicado)
    #[error("Registro duplicado: {0}")]
    Conflict(String),

    #[error("Violação de restrição: {0}")]
    ConstraintViolation(String),

    #[error("Credenciais inválidas")]
    Unauthorized,

    #[error("Erro interno: {0}")]
    InternalError(String),
}

/// Resultado padrão das operações da camada de acesso a dados
pub type DbResult<T> = Result<T, DbError>;

// Códigos estendidos do SQLite
const SQLITE_CONSTRAINT_UNIQUE: &str = "2067";
const SQLITE_CONSTRAINT_PRIMARYKEY: &str = "1555";
const SQLITE_CONSTRAINT_NOTNULL: &str = "1299";
const SQLITE_CONSTRAINT_CHECK: &str = "275";
const SQLITE_CONSTRAINT_FOREIGNKEY: &str = "787";

/// Conversão de erros específicos do SQLx para nossos tipos de erro
impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DbError::NotFound("Registro não encontrado".to_string()),
            sqlx::Error::Database(dbe) => {
                if let Some(code) = dbe.code() {
                    match code.as_ref() {
                        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => {
                            return DbError::Conflict(dbe.message().to_string());
                        }
                        SQLITE_CONSTRAINT_NOTNULL
                        | SQLITE_CONSTRAINT_CHECK
                        | SQLITE_CONSTRAINT_FOREIGNKEY => {
                            return DbError::ConstraintViolation(dbe.message().to_string());
                        }
                        _ => {}
                    }
                }
                DbError::QueryError(dbe.message().to_string())
            }
            sqlx::Error::ColumnNotFound(col) => {
                DbError::QueryError(format!("Coluna não encontrada: {}", col))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::QueryError(format!("Erro ao decodificar coluna {}: {}", index, source))
            }
            sqlx::Error::Io(io_err) => DbError::ConnectionError(io_err.to_string()),
            sqlx::Error::Configuration(conf_err) => DbError::ConnectionError(conf_err.to_string()),
            sqlx::Error::PoolClosed => {
                DbError::ConnectionError("Pool de conexões fechado".to_string())
            }
            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionError("Timeout no pool de conexões".to_string())
            }
            sqlx::Error::WorkerCrashed => {
                DbError::InternalError("Worker do banco de dados falhou".to_string())
            }
            _ => DbError::InternalError(format!("Erro inesperado: {:?}", error)),
        }
    }
}

impl DbError {
    /// Indica se o erro corresponde a uma violação de unicidade
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }

    /// Indica se o registro referenciado não existe
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }
}
