//! Conversão dos formatos da API para os formatos de exibição

use clinic_db::models::{status, AppointmentCard, Department, Patient};

const DEFAULT_DIAGNOSIS: &str = "一般內科問題";
const DEFAULT_COMPLAINT: &str = "身體不適";
const SENTENCE_END: char = '。';
const TITLE_SEPARATOR: &str = " - ";
const NO_ALLERGIES: &str = "無";
const HIGH_SYSTOLIC: u32 = 130;
const HIGH_CHOLESTEROL: u32 = 200;

/// Linha da tabela de prontuários
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRow {
    /// Número do prontuário (não o identificador interno)
    pub id: String,
    pub name: String,
    pub gender: String,
    pub dob: String,
    pub age: Option<i64>,
    pub id_number: String,
    pub phone: String,
    pub first_visit_date: String,
    pub last_visit_date: String,
    pub main_symptoms: String,
    pub allergies: String,
    pub current_meds: String,
    pub bmi: Option<f64>,
    pub bp: String,
    pub sugar: String,
    pub cholesterol: String,
    pub smoking: String,
    pub drinking: String,
    pub notes: String,
    pub allergy_alert: bool,
    pub high_blood_pressure: bool,
    pub high_cholesterol: bool,
}

/// Primeiro número inteiro do texto, ex.: "142/90" -> 142
fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

impl From<Patient> for PatientRow {
    fn from(p: Patient) -> Self {
        let allergy_alert = p.allergies != NO_ALLERGIES;
        let high_blood_pressure = leading_number(&p.bp).map_or(false, |s| s > HIGH_SYSTOLIC);
        let high_cholesterol =
            leading_number(&p.cholesterol).map_or(false, |c| c > HIGH_CHOLESTEROL);

        Self {
            id: p.record_id,
            name: p.name,
            gender: p.gender.map(|g| g.as_str().to_string()).unwrap_or_default(),
            dob: p.dob,
            age: p.age,
            id_number: p.id_number,
            phone: p.phone,
            first_visit_date: p.first_visit_date,
            last_visit_date: p.last_visit_date,
            main_symptoms: p.main_symptoms,
            allergies: p.allergies,
            current_meds: p.current_meds,
            bmi: p.bmi,
            bp: p.bp,
            sugar: p.sugar,
            cholesterol: p.cholesterol,
            smoking: p.smoking,
            drinking: p.drinking,
            notes: p.notes,
            allergy_alert,
            high_blood_pressure,
            high_cholesterol,
        }
    }
}

/// Rótulo de ficha exibido no cartão, ex.: "掛號 007"
pub fn registration_label(day: i64) -> String {
    format!("掛號 {:03}", day)
}

/// Tela de detalhe de uma consulta
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDetail {
    pub card: AppointmentCard,
    pub patient_name: String,
    pub diagnosis: String,
}

impl From<AppointmentCard> for AppointmentDetail {
    fn from(card: AppointmentCard) -> Self {
        let mut parts = card.title.split(TITLE_SEPARATOR);
        let patient_name = parts
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(&card.title)
            .to_string();
        let diagnosis = parts
            .next()
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_DIAGNOSIS)
            .to_string();

        Self {
            card,
            patient_name,
            diagnosis,
        }
    }
}

impl AppointmentDetail {
    /// Queixa principal: a primeira frase da descrição
    pub fn chief_complaint(&self) -> &str {
        self.card
            .description
            .split(SENTENCE_END)
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_COMPLAINT)
    }

    /// Rascunho da evolução no formato SOAP, editado pelo médico antes de
    /// concluir o atendimento
    pub fn draft_note(&self) -> String {
        let category = self.card.category;
        let head_and_neck = if category == Department::GeneralEnt {
            "咽喉黏膜充血，扁桃腺II度腫大，無化膿"
        } else {
            "結膜無蒼白，鞏膜無黃疸，頸部淋巴結無腫大"
        };
        let impression = if category == Department::Pediatrics {
            "疑似病毒性感染"
        } else {
            "建議進一步觀察"
        };
        let second_drug = if category == Department::GeneralEnt {
            "Antihistamine BID"
        } else {
            "Gastrointestinal agent TID"
        };

        format!(
            "[S] 主觀描述 (Subjective):
- 病患主訴{complaint}。
- 症狀已持續約 3 天，且有加劇趨勢。
- 自述近期工作壓力大，睡眠品質不佳。
- 無藥物過敏史 (NKDA)。

[O] 客觀檢查 (Objective):
- 生命徵象: T: 37.2°C, P: 78 bpm, BP: 124/82 mmHg, RR: 18/min。
- 頭頸部: {head_and_neck}。
- 胸部: 雙側呼吸音清晰，心律規則無雜音。
- 腹部: 軟，無壓痛，腸音正常。

[A] 評估診斷 (Assessment):
- {diagnosis}
- {impression}

[P] 治療計畫 (Plan):
1. 開立症狀緩解藥物 (3天份)：
   - Acetaminophen 500mg QID PRN
   - {second_drug}
2. 衛教：
   - 多休息，補充足夠水分 (2000cc/day)。
   - 若出現高燒 (>38.5°C) 或症狀惡化請立即回診。
3. 預約 3 天後回診追蹤。",
            complaint = self.chief_complaint(),
            head_and_neck = head_and_neck,
            diagnosis = self.diagnosis,
            impression = impression,
            second_drug = second_drug,
        )
    }
}

/// Números do cabeçalho do painel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub shown: usize,
    pub completed: usize,
    pub by_category: Vec<(Department, usize)>,
}

pub fn dashboard_stats(cards: &[AppointmentCard]) -> DashboardStats {
    let by_category = Department::ALL
        .into_iter()
        .map(|dept| (dept, cards.iter().filter(|c| c.category == dept).count()))
        .collect();

    DashboardStats {
        shown: cards.len(),
        completed: cards.iter().filter(|c| c.status == status::COMPLETED).count(),
        by_category,
    }
}
