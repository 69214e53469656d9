//! Worker profiles submitted for prediction.

use serde::{Deserialize, Serialize};

/// Structured profile, as filled in on the assessment form.
///
/// Serialises to the remote service's `/predict_risk` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerProfile {
    pub age: f64,
    pub work_experience: f64,
    pub work_hours_per_day: f64,
    pub work_days_per_week: f64,

    /// Equipment names, e.g. `"mask"`, `"gants"`
    pub protective_equipment: Vec<String>,

    /// Chemical family names, e.g. `"pesticides"`
    pub chemical_exposure: Vec<String>,

    pub tasks: Vec<String>,

    pub has_respiratory_conditions: bool,
    pub has_skin_conditions: bool,
    pub has_neurological_conditions: bool,
    pub has_cognitive_conditions: bool,
    pub has_chronic_exposure: bool,

    pub marital_status: String,
    pub number_of_children: f64,
    pub socio_economic_status: String,
    pub employment_status: String,

    /// Free-text complement to `chemical_exposure`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub chemicals_text: String,

    /// Free-text complement to `tasks`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tasks_text: String,
}

impl Default for WorkerProfile {
    fn default() -> Self {
        Self {
            age: 35.0,
            work_experience: 5.0,
            work_hours_per_day: 8.0,
            work_days_per_week: 5.0,
            protective_equipment: Vec::new(),
            chemical_exposure: Vec::new(),
            tasks: Vec::new(),
            has_respiratory_conditions: false,
            has_skin_conditions: false,
            has_neurological_conditions: false,
            has_cognitive_conditions: false,
            has_chronic_exposure: false,
            marital_status: "mariée".to_string(),
            number_of_children: 0.0,
            socio_economic_status: "moyen".to_string(),
            employment_status: "permanente".to_string(),
            chemicals_text: String::new(),
            tasks_text: String::new(),
        }
    }
}

impl WorkerProfile {
    #[must_use]
    pub fn weekly_hours(&self) -> f64 {
        self.work_hours_per_day * self.work_days_per_week
    }

    /// Chemical names and free text joined for substring matching.
    #[must_use]
    pub fn chemical_text(&self) -> String {
        let mut parts = self.chemical_exposure.clone();
        if !self.chemicals_text.trim().is_empty() {
            parts.push(self.chemicals_text.clone());
        }
        parts.join(" ")
    }

    /// Task names and free text joined for substring matching.
    #[must_use]
    pub fn task_text(&self) -> String {
        let mut parts = self.tasks.clone();
        if !self.tasks_text.trim().is_empty() {
            parts.push(self.tasks_text.clone());
        }
        parts.join(" ")
    }
}

/// Free-text profile, as described in the worker's own words.
///
/// Serialises to the remote service's `/predict_risk_from_text` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextProfile {
    pub general_description: String,
    pub chemicals_text: String,
    pub tasks_text: String,
    pub health_text: String,
    pub protection_text: String,
}

impl TextProfile {
    /// True when every field is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        [
            &self.general_description,
            &self.chemicals_text,
            &self.tasks_text,
            &self.health_text,
            &self.protection_text,
        ]
        .iter()
        .all(|s| s.trim().is_empty())
    }
}

/// Either shape of prediction input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionInput {
    Structured(WorkerProfile),
    FreeText(TextProfile),
}

impl From<WorkerProfile> for PredictionInput {
    fn from(profile: WorkerProfile) -> Self {
        Self::Structured(profile)
    }
}

impl From<TextProfile> for PredictionInput {
    fn from(profile: TextProfile) -> Self {
        Self::FreeText(profile)
    }
}
