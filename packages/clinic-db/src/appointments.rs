//! Acesso a consultas e montagem dos cartões do painel

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{
    join_tags, status, Appointment, AppointmentCard, NewAppointment, StatusUpdate,
};

/// Cadastra uma consulta. Paciente ou médico inexistente viola a chave estrangeira.
pub async fn create_appointment(pool: &SqlitePool, new: NewAppointment) -> DbResult<Appointment> {
    let now = Utc::now();
    let appointment = sqlx::query_as::<_, Appointment>(
        r#"
        INSERT INTO appointments (
            id, patient_id, physician_id, physician, day, scheduled_at, scheduled_offset,
            category, title, description, tags, status, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(new.id.unwrap_or_else(|| Uuid::new_v4().to_string()))
    .bind(&new.patient_id)
    .bind(&new.physician_id)
    .bind(new.physician.unwrap_or_default())
    .bind(new.day)
    .bind(new.scheduled_at.with_timezone(&Utc))
    .bind(new.scheduled_at.offset().local_minus_utc())
    .bind(new.category.label())
    .bind(&new.title)
    .bind(&new.description)
    .bind(join_tags(&new.tags))
    .bind(new.status.unwrap_or_else(|| status::PENDING.to_string()))
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    debug!(appointment_id = %appointment.id, "Consulta cadastrada");
    Ok(appointment)
}

pub async fn get_appointment(pool: &SqlitePool, id: &str) -> DbResult<Appointment> {
    sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("Consulta {}", id)))
}

/// Cartões do painel, da consulta mais recente para a mais antiga.
///
/// O nome do médico vem do usuário referenciado quando houver, senão do
/// nome gravado na própria consulta.
pub async fn list_appointment_cards(pool: &SqlitePool) -> DbResult<Vec<AppointmentCard>> {
    let cards = sqlx::query_as::<_, AppointmentCard>(
        r#"
        SELECT a.id, a.day, a.category, a.title, a.description, a.tags,
               a.scheduled_at, a.scheduled_offset, a.status,
               COALESCE(u.name, a.physician) AS physician_name
        FROM appointments a
        INNER JOIN patients p ON p.id = a.patient_id
        LEFT JOIN users u ON u.id = a.physician_id
        ORDER BY a.scheduled_at DESC, a.rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    debug!(count = cards.len(), "Consultas listadas");
    Ok(cards)
}

/// Altera apenas status e, se informada, a receita.
///
/// Não há máquina de estados: qualquer valor substitui o anterior
/// e a última escrita prevalece.
pub async fn update_status(
    pool: &SqlitePool,
    id: &str,
    update: StatusUpdate,
) -> DbResult<Appointment> {
    let appointment = sqlx::query_as::<_, Appointment>(
        r#"
        UPDATE appointments
        SET status = ?, prescription = COALESCE(?, prescription), updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&update.status)
    .bind(&update.prescription)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DbError::NotFound(format!("Consulta {}", id)))?;

    debug!(
        appointment_id = %appointment.id,
        status = %appointment.status,
        "Status da consulta atualizado"
    );
    Ok(appointment)
}
