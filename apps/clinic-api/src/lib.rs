//! Clinic API - servidor HTTP do painel da clínica
//!
//! Expõe as operações de `clinic-db` como endpoints JSON sem estado:
//! pacientes, consultas (cartões do painel e alteração de status) e login.

use anyhow::{Context, Result};
use clinic_db::init_db_pool;
use tracing::info;

pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

pub use config::ServerConfig;
pub use routes::{router, AppState};

/// Metadados gerados em tempo de build
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Abre o banco, monta as rotas e atende até receber Ctrl-C
pub async fn serve(config: ServerConfig) -> Result<()> {
    let pool = init_db_pool(&config.db).await?;
    let app = router(AppState { pool: pool.clone() }, &config);
    let addr = config.socket_addr()?;

    let server = axum::Server::try_bind(&addr)
        .with_context(|| format!("Falha ao abrir a porta {}", addr))?;

    info!(
        version = built_info::PKG_VERSION,
        static_dir = ?config.static_dir,
        "Servidor escutando em {}",
        addr
    );

    server
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Falha no servidor HTTP")?;

    pool.close().await;
    info!("Servidor encerrado");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Falha ao aguardar sinal de encerramento: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Sinal de encerramento recebido");
}
