//! Modelos de dados compartilhados entre aplicações
//!
//! Este módulo define as estruturas de dados principais usadas pelo ecossistema da clínica:
//! o formato armazenado, o formato de entrada das APIs e o formato achatado do painel.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;

/// Separador usado para persistir a lista de tags numa única coluna
pub const TAG_DELIMITER: char = ',';

/// Valores de status usados por convenção entre médicos e equipe.
///
/// O status é apenas informativo: qualquer valor pode substituir qualquer outro.
pub mod status {
    pub const PENDING: &str = "pending";
    pub const COMPLETED: &str = "completed";
}

fn decode_error(column: &str, message: String) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    }
}

/// Papel de um usuário no sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Doctor,
    Staff,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Doctor => write!(f, "doctor"),
            Role::Staff => write!(f, "staff"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "doctor" => Ok(Role::Doctor),
            "staff" => Ok(Role::Staff),
            other => Err(format!("Papel inválido: {}", other)),
        }
    }
}

/// Usuário armazenado, incluindo o segredo
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identificador único (UUID em texto)
    pub id: String,
    /// E-mail de acesso, único por usuário
    pub email: String,
    /// Senha em texto puro, nunca serializada
    #[serde(skip_serializing)]
    pub password: String,
    /// Nome de exibição
    pub name: String,
    /// Papel no sistema
    pub role: Role,
    /// URL da foto de perfil
    pub avatar: Option<String>,
    /// Data de criação
    pub created_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for User {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            name: row.try_get("name")?,
            role: role.parse().map_err(|e| decode_error("role", e))?,
            avatar: row.try_get("avatar")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Usuário sem o segredo, como devolvido pelo login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            avatar: user.avatar,
            created_at: user.created_at,
        }
    }
}

/// Dados para cadastro de um novo usuário
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Sexo do paciente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "男")]
    Male,
    #[serde(rename = "女")]
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "男" => Ok(Gender::Male),
            "女" => Ok(Gender::Female),
            other => Err(format!("Sexo inválido: {}", other)),
        }
    }
}

/// Especialidade (departamento) de uma consulta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "耳鼻喉科")]
    GeneralEnt,
    #[serde(rename = "家醫科")]
    FamilyMedicine,
    #[serde(rename = "小兒科")]
    Pediatrics,
    #[serde(rename = "慢性病")]
    ChronicDisease,
    #[serde(rename = "疫苗注射")]
    Vaccination,
}

impl Department {
    /// Todas as especialidades, na ordem exibida no painel
    pub const ALL: [Department; 5] = [
        Department::GeneralEnt,
        Department::FamilyMedicine,
        Department::Pediatrics,
        Department::ChronicDisease,
        Department::Vaccination,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Department::GeneralEnt => "耳鼻喉科",
            Department::FamilyMedicine => "家醫科",
            Department::Pediatrics => "小兒科",
            Department::ChronicDisease => "慢性病",
            Department::Vaccination => "疫苗注射",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.label() == s)
            .ok_or_else(|| format!("Especialidade inválida: {}", s))
    }
}

/// Prontuário completo de um paciente
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Identificador interno (UUID em texto)
    pub id: String,
    /// Número do prontuário exibido ao usuário, imutável após atribuído
    pub record_id: String,
    /// Nome completo
    pub name: String,
    /// Sexo
    pub gender: Option<Gender>,
    /// Data de nascimento, como informada
    pub dob: String,
    /// Idade em anos
    pub age: Option<i64>,
    /// Documento nacional de identidade, único por paciente
    pub id_number: String,
    /// Telefone de contato
    pub phone: String,
    /// E-mail de contato
    pub email: String,
    /// Endereço residencial
    pub address: String,
    /// Nome do contato de emergência
    pub emergency_contact: String,
    /// Telefone do contato de emergência
    pub emergency_phone: String,
    /// Data da primeira consulta
    pub first_visit_date: String,
    /// Data da última consulta
    pub last_visit_date: String,
    /// Queixa principal
    pub main_symptoms: String,
    /// Há quanto tempo os sintomas persistem
    pub duration: String,
    /// Histórico médico pessoal
    pub past_history: String,
    /// Histórico familiar
    pub family_history: String,
    /// Alergias conhecidas ("無" quando não há)
    pub allergies: String,
    /// Medicamentos em uso
    pub current_meds: String,
    /// Altura em centímetros
    pub height: Option<f64>,
    /// Peso em quilogramas
    pub weight: Option<f64>,
    /// IMC, derivado de altura e peso quando ambos existem
    pub bmi: Option<f64>,
    /// Pressão arterial no formato "sistólica/diastólica"
    pub bp: String,
    /// Frequência cardíaca (bpm)
    pub hr: Option<i64>,
    /// Glicemia, texto livre
    pub sugar: String,
    /// Colesterol total, texto livre
    pub cholesterol: String,
    /// Hábito de fumar
    pub smoking: String,
    /// Consumo de álcool
    pub drinking: String,
    /// Frequência de exercícios
    pub exercise: String,
    /// Qualidade do sono
    pub sleep_quality: String,
    /// Nível de estresse
    pub stress_level: String,
    /// Observações livres
    pub notes: String,
    /// Data de criação
    pub created_at: DateTime<Utc>,
    /// Data da última alteração
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Patient {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let gender: Option<String> = row.try_get("gender")?;
        let gender = gender
            .map(|g| g.parse::<Gender>())
            .transpose()
            .map_err(|e| decode_error("gender", e))?;

        Ok(Self {
            id: row.try_get("id")?,
            record_id: row.try_get("record_id")?,
            name: row.try_get("name")?,
            gender,
            dob: row.try_get("dob")?,
            age: row.try_get("age")?,
            id_number: row.try_get("id_number")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
            emergency_contact: row.try_get("emergency_contact")?,
            emergency_phone: row.try_get("emergency_phone")?,
            first_visit_date: row.try_get("first_visit_date")?,
            last_visit_date: row.try_get("last_visit_date")?,
            main_symptoms: row.try_get("main_symptoms")?,
            duration: row.try_get("duration")?,
            past_history: row.try_get("past_history")?,
            family_history: row.try_get("family_history")?,
            allergies: row.try_get("allergies")?,
            current_meds: row.try_get("current_meds")?,
            height: row.try_get("height")?,
            weight: row.try_get("weight")?,
            bmi: row.try_get("bmi")?,
            bp: row.try_get("bp")?,
            hr: row.try_get("hr")?,
            sugar: row.try_get("sugar")?,
            cholesterol: row.try_get("cholesterol")?,
            smoking: row.try_get("smoking")?,
            drinking: row.try_get("drinking")?,
            exercise: row.try_get("exercise")?,
            sleep_quality: row.try_get("sleep_quality")?,
            stress_level: row.try_get("stress_level")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Corpo aceito na criação e na edição de pacientes.
///
/// Todos os campos são opcionais; campos obrigatórios ausentes são
/// rejeitados pelas restrições do banco, não por validação prévia.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientPayload {
    pub record_id: Option<String>,
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub dob: Option<String>,
    pub age: Option<i64>,
    pub id_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub first_visit_date: Option<String>,
    pub last_visit_date: Option<String>,
    pub main_symptoms: Option<String>,
    pub duration: Option<String>,
    pub past_history: Option<String>,
    pub family_history: Option<String>,
    pub allergies: Option<String>,
    pub current_meds: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub bmi: Option<f64>,
    pub bp: Option<String>,
    pub hr: Option<i64>,
    pub sugar: Option<String>,
    pub cholesterol: Option<String>,
    pub smoking: Option<String>,
    pub drinking: Option<String>,
    pub exercise: Option<String>,
    pub sleep_quality: Option<String>,
    pub stress_level: Option<String>,
    pub notes: Option<String>,
}

/// IMC a partir de altura (cm) e peso (kg), arredondado a uma casa decimal
pub fn derive_bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> Option<f64> {
    match (height_cm, weight_kg) {
        (Some(h), Some(w)) if h > 0.0 && w > 0.0 => {
            let meters = h / 100.0;
            Some((w / (meters * meters) * 10.0).round() / 10.0)
        }
        _ => None,
    }
}

impl Patient {
    /// Aplica uma edição parcial sobre o prontuário.
    ///
    /// `record_id` e `id_number` são ignorados. O IMC é recalculado quando
    /// altura ou peso mudam e o corpo não traz um IMC explícito.
    pub fn apply(&mut self, changes: PatientPayload) {
        fn set<T>(field: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *field = v;
            }
        }

        let vitals_changed = changes.height.is_some() || changes.weight.is_some();

        set(&mut self.name, changes.name);
        if changes.gender.is_some() {
            self.gender = changes.gender;
        }
        set(&mut self.dob, changes.dob);
        if changes.age.is_some() {
            self.age = changes.age;
        }
        set(&mut self.phone, changes.phone);
        set(&mut self.email, changes.email);
        set(&mut self.address, changes.address);
        set(&mut self.emergency_contact, changes.emergency_contact);
        set(&mut self.emergency_phone, changes.emergency_phone);
        set(&mut self.first_visit_date, changes.first_visit_date);
        set(&mut self.last_visit_date, changes.last_visit_date);
        set(&mut self.main_symptoms, changes.main_symptoms);
        set(&mut self.duration, changes.duration);
        set(&mut self.past_history, changes.past_history);
        set(&mut self.family_history, changes.family_history);
        set(&mut self.allergies, changes.allergies);
        set(&mut self.current_meds, changes.current_meds);
        if changes.height.is_some() {
            self.height = changes.height;
        }
        if changes.weight.is_some() {
            self.weight = changes.weight;
        }
        set(&mut self.bp, changes.bp);
        if changes.hr.is_some() {
            self.hr = changes.hr;
        }
        set(&mut self.sugar, changes.sugar);
        set(&mut self.cholesterol, changes.cholesterol);
        set(&mut self.smoking, changes.smoking);
        set(&mut self.drinking, changes.drinking);
        set(&mut self.exercise, changes.exercise);
        set(&mut self.sleep_quality, changes.sleep_quality);
        set(&mut self.stress_level, changes.stress_level);
        set(&mut self.notes, changes.notes);

        if changes.bmi.is_some() {
            self.bmi = changes.bmi;
        } else if vitals_changed {
            self.bmi = derive_bmi(self.height, self.weight).or(self.bmi);
        }
    }
}

/// Divide a coluna de tags na lista exposta pela API
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(TAG_DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Junta a lista de tags para persistência
pub fn join_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(&TAG_DELIMITER.to_string())
}

/// Horário legível da consulta no fuso em que foi agendada, ex.: "09:00 AM"
pub fn format_time_of_day(at: &DateTime<FixedOffset>) -> String {
    at.format("%I:%M %p").to_string()
}

/// Reconstrói o horário agendado a partir do instante UTC e do fuso gravado
fn scheduled_at_from_row(row: &SqliteRow) -> sqlx::Result<DateTime<FixedOffset>> {
    let utc: DateTime<Utc> = row.try_get("scheduled_at")?;
    let offset_secs: i32 = row.try_get("scheduled_offset")?;
    let offset = FixedOffset::east_opt(offset_secs).ok_or_else(|| {
        decode_error("scheduled_offset", format!("Fuso inválido: {}", offset_secs))
    })?;
    Ok(utc.with_timezone(&offset))
}

/// Registro completo de uma consulta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Identificador único
    pub id: String,
    /// Paciente atendido
    pub patient_id: String,
    /// Usuário médico responsável, quando cadastrado
    pub physician_id: Option<String>,
    /// Nome do médico informado diretamente na consulta
    pub physician: String,
    /// Número do dia/ficha de atendimento
    pub day: i64,
    /// Data e hora no fuso em que a consulta foi agendada
    pub scheduled_at: DateTime<FixedOffset>,
    /// Especialidade
    pub category: Department,
    /// Por convenção "nome do paciente - diagnóstico"
    pub title: String,
    /// Descrição livre; a primeira frase é a queixa principal
    pub description: Option<String>,
    /// Etiquetas exibidas no cartão
    pub tags: Vec<String>,
    /// Status informativo (ver [`status`])
    pub status: String,
    /// Receita registrada ao concluir o atendimento
    pub prescription: Option<String>,
    /// Data de criação
    pub created_at: DateTime<Utc>,
    /// Data da última alteração
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Appointment {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let category: String = row.try_get("category")?;
        let tags: String = row.try_get("tags")?;
        Ok(Self {
            id: row.try_get("id")?,
            patient_id: row.try_get("patient_id")?,
            physician_id: row.try_get("physician_id")?,
            physician: row.try_get("physician")?,
            day: row.try_get("day")?,
            scheduled_at: scheduled_at_from_row(row)?,
            category: category.parse().map_err(|e| decode_error("category", e))?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            tags: split_tags(&tags),
            status: row.try_get("status")?,
            prescription: row.try_get("prescription")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Dados para criação de uma consulta
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    #[serde(default)]
    pub id: Option<String>,
    pub patient_id: String,
    #[serde(default)]
    pub physician_id: Option<String>,
    #[serde(default)]
    pub physician: Option<String>,
    #[serde(default)]
    pub day: i64,
    /// Horário com fuso (RFC 3339); o fuso é preservado para exibição
    pub scheduled_at: DateTime<FixedOffset>,
    pub category: Department,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Alteração de status (e receita opcional) de uma consulta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
}

/// Consulta achatada para os cartões do painel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentCard {
    pub id: String,
    pub day: i64,
    pub category: Department,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Horário legível da consulta
    pub date: String,
    /// Nome de exibição do médico responsável
    pub physician: String,
    pub status: String,
}

impl FromRow<'_, SqliteRow> for AppointmentCard {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        let category: String = row.try_get("category")?;
        let tags: String = row.try_get("tags")?;
        let description: Option<String> = row.try_get("description")?;
        let scheduled_at = scheduled_at_from_row(row)?;
        Ok(Self {
            id: row.try_get("id")?,
            day: row.try_get("day")?,
            category: category.parse().map_err(|e| decode_error("category", e))?,
            title: row.try_get("title")?,
            description: description.unwrap_or_default(),
            tags: split_tags(&tags),
            date: format_time_of_day(&scheduled_at),
            physician: row.try_get("physician_name")?,
            status: row.try_get("status")?,
        })
    }
}
