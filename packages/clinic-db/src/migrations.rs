//! Sistema de migrações para banco de dados
//!
//! Este módulo gerencia as migrações do banco de dados SQLite

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{error, info};

/// Lista de migrações SQL a serem aplicadas
pub(crate) const MIGRATIONS: &[&str] = &[
    // 001_initial_schema.sql
    r#"
    -- Usuários do sistema (médicos, equipe, administradores)
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        name TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('admin', 'doctor', 'staff')),
        avatar TEXT,
        created_at TIMESTAMP NOT NULL
    );

    -- Prontuários de pacientes
    CREATE TABLE IF NOT EXISTS patients (
        id TEXT PRIMARY KEY NOT NULL,
        record_id TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        gender TEXT CHECK (gender IN ('男', '女')),
        dob TEXT NOT NULL DEFAULT '',
        age INTEGER,
        id_number TEXT NOT NULL UNIQUE,
        phone TEXT NOT NULL DEFAULT '',
        email TEXT NOT NULL DEFAULT '',
        address TEXT NOT NULL DEFAULT '',
        emergency_contact TEXT NOT NULL DEFAULT '',
        emergency_phone TEXT NOT NULL DEFAULT '',
        first_visit_date TEXT NOT NULL DEFAULT '',
        last_visit_date TEXT NOT NULL DEFAULT '',
        main_symptoms TEXT NOT NULL DEFAULT '',
        duration TEXT NOT NULL DEFAULT '',
        past_history TEXT NOT NULL DEFAULT '',
        family_history TEXT NOT NULL DEFAULT '',
        allergies TEXT NOT NULL DEFAULT '',
        current_meds TEXT NOT NULL DEFAULT '',
        height REAL,
        weight REAL,
        bmi REAL,
        bp TEXT NOT NULL DEFAULT '',
        hr INTEGER,
        sugar TEXT NOT NULL DEFAULT '',
        cholesterol TEXT NOT NULL DEFAULT '',
        smoking TEXT NOT NULL DEFAULT '',
        drinking TEXT NOT NULL DEFAULT '',
        exercise TEXT NOT NULL DEFAULT '',
        sleep_quality TEXT NOT NULL DEFAULT '',
        stress_level TEXT NOT NULL DEFAULT '',
        notes TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMP NOT NULL,
        updated_at TIMESTAMP NOT NULL
    );

    -- Consultas agendadas
    CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY NOT NULL,
        patient_id TEXT NOT NULL,
        physician_id TEXT,
        physician TEXT NOT NULL DEFAULT '',
        day INTEGER NOT NULL DEFAULT 0,
        scheduled_at TIMESTAMP NOT NULL,
        category TEXT NOT NULL CHECK (category IN ('耳鼻喉科', '家醫科', '小兒科', '慢性病', '疫苗注射')),
        title TEXT NOT NULL,
        description TEXT,
        tags TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL DEFAULT 'pending',
        prescription TEXT,
        created_at TIMESTAMP NOT NULL,
        updated_at TIMESTAMP NOT NULL,
        FOREIGN KEY (patient_id) REFERENCES patients (id) ON DELETE CASCADE,
        FOREIGN KEY (physician_id) REFERENCES users (id) ON DELETE SET NULL
    );

    -- Índices para otimização
    CREATE INDEX IF NOT EXISTS idx_patients_updated_at ON patients (updated_at);
    CREATE INDEX IF NOT EXISTS idx_appointments_patient_id ON appointments (patient_id);
    CREATE INDEX IF NOT EXISTS idx_appointments_physician_id ON appointments (physician_id);
    CREATE INDEX IF NOT EXISTS idx_appointments_scheduled_at ON appointments (scheduled_at);
    "#,
    // 002_appointment_offset.sql
    r#"
    -- Fuso do horário informado no agendamento, em segundos a leste de UTC.
    -- scheduled_at continua em UTC para a ordenação.
    ALTER TABLE appointments ADD COLUMN scheduled_offset INTEGER NOT NULL DEFAULT 0;
    "#,
];

/// Executa todas as migrações pendentes no banco de dados
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Aplicando migrações de banco de dados...");

    // Obter a versão atual do banco de dados
    let mut version: i64 = 0;
    match sqlx::query_scalar("PRAGMA user_version").fetch_one(pool).await {
        Ok(v) => version = v,
        Err(e) => {
            error!("Erro ao obter versão do banco: {}", e);
            // Continuar mesmo assim, pois pode ser a primeira execução
        }
    }

    info!("Versão atual do banco: {}", version);

    for (i, migration_sql) in MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as i64;

        if migration_version <= version {
            info!("Migração {} já aplicada", migration_version);
            continue;
        }

        info!("Aplicando migração {}...", migration_version);

        let mut transaction = pool
            .begin()
            .await
            .with_context(|| {
                format!("Falha ao iniciar transação para migração {}", migration_version)
            })?;

        sqlx::query(migration_sql)
            .execute(&mut *transaction)
            .await
            .with_context(|| format!("Falha ao executar migração {}", migration_version))?;

        // PRAGMA não aceita parâmetros vinculados
        sqlx::query(&format!("PRAGMA user_version = {}", migration_version))
            .execute(&mut *transaction)
            .await
            .with_context(|| format!("Falha ao atualizar versão para {}", migration_version))?;

        transaction
            .commit()
            .await
            .with_context(|| {
                format!("Falha ao confirmar transação para migração {}", migration_version)
            })?;

        info!("Migração {} aplicada com sucesso", migration_version);
    }

    info!("Migrações concluídas. Versão atual: {}", MIGRATIONS.len());
    Ok(())
}
