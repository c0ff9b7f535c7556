//! Configuração do servidor a partir de variáveis de ambiente (e `.env`, se existir)

use anyhow::{Context, Result};
use clinic_db::DbConfig;
use config::{Config, Environment};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Formato de saída dos logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(anyhow::anyhow!("Formato de log desconhecido: {}", other)),
        }
    }
}

/// Configuração completa do servidor HTTP
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db: DbConfig,
    /// Diretório com o front-end compilado; ausente = API apenas
    pub static_dir: Option<PathBuf>,
    /// Limite de requisições simultâneas (aplicado por rota)
    pub max_concurrent_requests: usize,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            db: DbConfig::default(),
            static_dir: None,
            max_concurrent_requests: 256,
            log_format: LogFormat::Pretty,
        }
    }
}

/// Variáveis reconhecidas, já com as chaves em minúsculas
#[derive(Debug, Deserialize)]
struct Settings {
    host: String,
    port: u16,
    database_path: String,
    database_max_connections: u32,
    database_log_statements: bool,
    #[serde(default)]
    static_dir: Option<String>,
    max_concurrent_requests: usize,
    log_format: String,
}

impl ServerConfig {
    /// Carrega `.env` (se houver) e lê as variáveis do processo
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_source(Environment::default())
    }

    /// Monta a configuração com os valores padrão sob a fonte de ambiente dada
    pub fn from_source(env: Environment) -> Result<Self> {
        let defaults = Self::default();

        let settings: Settings = Config::builder()
            .set_default("host", defaults.host.as_str())?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_path", defaults.db.db_path.as_str())?
            .set_default("database_max_connections", i64::from(defaults.db.max_connections))?
            .set_default("database_log_statements", defaults.db.log_statements)?
            .set_default("max_concurrent_requests", defaults.max_concurrent_requests as i64)?
            .set_default("log_format", "pretty")?
            .add_source(env)
            .build()
            .context("Falha ao ler a configuração")?
            .try_deserialize()
            .context("Valor inválido na configuração")?;

        Ok(Self {
            host: settings.host,
            port: settings.port,
            db: DbConfig {
                db_path: settings.database_path,
                max_connections: settings.database_max_connections,
                log_statements: settings.database_log_statements,
            },
            static_dir: settings
                .static_dir
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            max_concurrent_requests: settings.max_concurrent_requests,
            log_format: settings.log_format.parse()?,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Endereço inválido: {}:{}", self.host, self.port))
    }
}
