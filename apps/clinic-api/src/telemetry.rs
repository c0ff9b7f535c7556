//! Inicialização dos logs estruturados

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "info,clinic_api=debug,clinic_db=debug,tower_http=info";

/// Instala o subscriber global; `RUST_LOG` tem precedência sobre o filtro padrão
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Falha ao iniciar logs: {}", e))
}
