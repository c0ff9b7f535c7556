//! Acesso a prontuários de pacientes

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::models::{derive_bmi, Patient, PatientPayload};

/// Número de prontuário gerado quando o corpo não traz um
fn generate_record_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("P{}", simple[..8].to_uppercase())
}

/// Lista todos os pacientes, do atualizado mais recentemente ao mais antigo
pub async fn list_patients(pool: &SqlitePool) -> DbResult<Vec<Patient>> {
    let patients = sqlx::query_as::<_, Patient>(
        "SELECT * FROM patients ORDER BY updated_at DESC, rowid DESC",
    )
    .fetch_all(pool)
    .await?;

    debug!(count = patients.len(), "Pacientes listados");
    Ok(patients)
}

pub async fn get_patient(pool: &SqlitePool, id: &str) -> DbResult<Patient> {
    sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("Paciente {}", id)))
}

/// Cadastra um paciente a partir de um corpo completo ou parcial.
///
/// Documento de identidade já existente resulta em `DbError::Conflict`;
/// nome ou documento ausentes violam as restrições NOT NULL.
pub async fn create_patient(pool: &SqlitePool, payload: PatientPayload) -> DbResult<Patient> {
    let now = Utc::now();
    let record_id = payload.record_id.clone().unwrap_or_else(generate_record_id);
    let bmi = payload.bmi.or_else(|| derive_bmi(payload.height, payload.weight));

    let patient = sqlx::query_as::<_, Patient>(
        r#"
        INSERT INTO patients (
            id, record_id, name, gender, dob, age, id_number, phone, email, address,
            emergency_contact, emergency_phone, first_visit_date, last_visit_date,
            main_symptoms, duration, past_history, family_history, allergies, current_meds,
            height, weight, bmi, bp, hr, sugar, cholesterol,
            smoking, drinking, exercise, sleep_quality, stress_level, notes,
            created_at, updated_at
        )
        VALUES (
            ?, ?, ?, ?, ?, ?, ?, ?, ?, ?,
            ?, ?, ?, ?,
            ?, ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?, ?, ?,
            ?, ?, ?, ?, ?, ?,
            ?, ?
        )
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(record_id)
    .bind(payload.name)
    .bind(payload.gender.map(|g| g.as_str()))
    .bind(payload.dob.unwrap_or_default())
    .bind(payload.age)
    .bind(payload.id_number)
    .bind(payload.phone.unwrap_or_default())
    .bind(payload.email.unwrap_or_default())
    .bind(payload.address.unwrap_or_default())
    .bind(payload.emergency_contact.unwrap_or_default())
    .bind(payload.emergency_phone.unwrap_or_default())
    .bind(payload.first_visit_date.unwrap_or_default())
    .bind(payload.last_visit_date.unwrap_or_default())
    .bind(payload.main_symptoms.unwrap_or_default())
    .bind(payload.duration.unwrap_or_default())
    .bind(payload.past_history.unwrap_or_default())
    .bind(payload.family_history.unwrap_or_default())
    .bind(payload.allergies.unwrap_or_default())
    .bind(payload.current_meds.unwrap_or_default())
    .bind(payload.height)
    .bind(payload.weight)
    .bind(bmi)
    .bind(payload.bp.unwrap_or_default())
    .bind(payload.hr)
    .bind(payload.sugar.unwrap_or_default())
    .bind(payload.cholesterol.unwrap_or_default())
    .bind(payload.smoking.unwrap_or_default())
    .bind(payload.drinking.unwrap_or_default())
    .bind(payload.exercise.unwrap_or_default())
    .bind(payload.sleep_quality.unwrap_or_default())
    .bind(payload.stress_level.unwrap_or_default())
    .bind(payload.notes.unwrap_or_default())
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    debug!(patient_id = %patient.id, record_id = %patient.record_id, "Paciente cadastrado");
    Ok(patient)
}

/// Edição parcial de um prontuário existente.
///
/// Número de prontuário e documento de identidade não são alterados.
pub async fn update_patient(
    pool: &SqlitePool,
    id: &str,
    changes: PatientPayload,
) -> DbResult<Patient> {
    let mut transaction = pool.begin().await?;

    let mut patient = sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *transaction)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("Paciente {}", id)))?;

    patient.apply(changes);
    patient.updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE patients SET
            name = ?, gender = ?, dob = ?, age = ?, phone = ?, email = ?, address = ?,
            emergency_contact = ?, emergency_phone = ?, first_visit_date = ?, last_visit_date = ?,
            main_symptoms = ?, duration = ?, past_history = ?, family_history = ?,
            allergies = ?, current_meds = ?, height = ?, weight = ?, bmi = ?, bp = ?, hr = ?,
            sugar = ?, cholesterol = ?, smoking = ?, drinking = ?, exercise = ?,
            sleep_quality = ?, stress_level = ?, notes = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&patient.name)
    .bind(patient.gender.map(|g| g.as_str()))
    .bind(&patient.dob)
    .bind(patient.age)
    .bind(&patient.phone)
    .bind(&patient.email)
    .bind(&patient.address)
    .bind(&patient.emergency_contact)
    .bind(&patient.emergency_phone)
    .bind(&patient.first_visit_date)
    .bind(&patient.last_visit_date)
    .bind(&patient.main_symptoms)
    .bind(&patient.duration)
    .bind(&patient.past_history)
    .bind(&patient.family_history)
    .bind(&patient.allergies)
    .bind(&patient.current_meds)
    .bind(patient.height)
    .bind(patient.weight)
    .bind(patient.bmi)
    .bind(&patient.bp)
    .bind(patient.hr)
    .bind(&patient.sugar)
    .bind(&patient.cholesterol)
    .bind(&patient.smoking)
    .bind(&patient.drinking)
    .bind(&patient.exercise)
    .bind(&patient.sleep_quality)
    .bind(&patient.stress_level)
    .bind(&patient.notes)
    .bind(patient.updated_at)
    .bind(id)
    .execute(&mut *transaction)
    .await?;

    transaction.commit().await?;

    debug!(patient_id = %patient.id, "Paciente atualizado");
    Ok(patient)
}
