//! Feature extraction.
//!
//! Survey records (used for fitting) and live worker profiles (used for
//! prediction) map onto the same feature names, so a trained model scores
//! either consistently.

use crate::domain::{
    feature_names as f, fold_accents, mentions_any, FeatureVector, HealthRecord, ProtectionSet,
    WorkerProfile,
};

const DEFAULT_AGE: f64 = 35.0;
const DEFAULT_HOURS_PER_DAY: f64 = 8.0;
const DEFAULT_DAYS_PER_WEEK: f64 = 5.0;
const DEFAULT_SYSTOLIC: f64 = 120.0;
const DEFAULT_DIASTOLIC: f64 = 80.0;

/// Years of experience beyond which hazardous exposure counts as chronic.
const CHRONIC_EXPOSURE_YEARS: f64 = 10.0;

const PESTICIDE: &[&str] = &["pesticid", "phytosanitaire"];
const HERBICIDE: &[&str] = &["herbicid", "desherbant", "glyphosate", "roundup", "paraquat"];
const INSECTICIDE: &[&str] = &["insecticid"];
const FUNGICIDE: &[&str] = &["fongicid", "fongique", "fungicid"];
const FERTILIZER: &[&str] = &["engrais", "fertiliz", "fertilis"];

const SPREADING: &[&str] = &["epand", "spread"];
const TREATMENT: &[&str] = &["trait", "pulveris", "spray"];
const HARVEST: &[&str] = &["recolt", "cueil", "harvest"];
const WEEDING: &[&str] = &["desherb", "sarcl", "weed"];

/// Everything extraction needs, whatever the input shape.
struct ExtractionInput {
    age: f64,
    work_experience: f64,
    hours_per_day: f64,
    days_per_week: f64,
    children: f64,
    systolic_bp: f64,
    diastolic_bp: f64,
    protection: ProtectionSet,
    chemical_text: String,
    task_text: String,
    respiratory: bool,
    skin: bool,
    neurological: bool,
    cognitive: bool,
    declared_chronic_exposure: bool,
    socio_economic: String,
    employment: String,
}

/// Converts records and profiles into [`FeatureVector`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Features of a dataset record.
    #[must_use]
    pub fn from_record(&self, record: &HealthRecord) -> FeatureVector {
        self.extract(ExtractionInput {
            age: record.age,
            work_experience: record.work_experience,
            hours_per_day: record.hours_per_day,
            days_per_week: record.days_per_week,
            children: record.children,
            systolic_bp: record.systolic_bp,
            diastolic_bp: record.diastolic_bp,
            protection: record.protection,
            chemical_text: record.chemical_text(),
            task_text: record.tasks.clone(),
            respiratory: !record.cardio_respiratory.trim().is_empty(),
            skin: !record.skin.trim().is_empty(),
            neurological: !record.neurological.trim().is_empty(),
            cognitive: !record.cognitive.trim().is_empty(),
            declared_chronic_exposure: false,
            socio_economic: record.socio_economic_level.clone(),
            employment: record.employment_status.clone(),
        })
    }

    /// Features of a submitted profile. Blood pressure is not collected on the
    /// form and reads as normal.
    #[must_use]
    pub fn from_profile(&self, profile: &WorkerProfile) -> FeatureVector {
        self.extract(ExtractionInput {
            age: profile.age,
            work_experience: profile.work_experience,
            hours_per_day: profile.work_hours_per_day,
            days_per_week: profile.work_days_per_week,
            children: profile.number_of_children,
            systolic_bp: DEFAULT_SYSTOLIC,
            diastolic_bp: DEFAULT_DIASTOLIC,
            protection: ProtectionSet::from_equipment(&profile.protective_equipment),
            chemical_text: profile.chemical_text(),
            task_text: profile.task_text(),
            respiratory: profile.has_respiratory_conditions,
            skin: profile.has_skin_conditions,
            neurological: profile.has_neurological_conditions,
            cognitive: profile.has_cognitive_conditions,
            declared_chronic_exposure: profile.has_chronic_exposure,
            socio_economic: profile.socio_economic_status.clone(),
            employment: profile.employment_status.clone(),
        })
    }

    fn extract(&self, input: ExtractionInput) -> FeatureVector {
        let mut v = FeatureVector::new();

        let age = sanitize(input.age, DEFAULT_AGE);
        let experience = sanitize(input.work_experience, 0.0);
        let hours = sanitize(input.hours_per_day, DEFAULT_HOURS_PER_DAY);
        let days = sanitize(input.days_per_week, DEFAULT_DAYS_PER_WEEK);
        let weekly = hours * days;

        v.set(f::AGE, age);
        v.set(f::AGE_GROUP, age_group(age));
        v.set(f::WORK_EXPERIENCE, experience);
        v.set(
            f::EXPERIENCE_TO_AGE_RATIO,
            if age > 0.0 { experience / age } else { 0.0 },
        );
        v.set(f::HOURS_PER_DAY, hours);
        v.set(f::DAYS_PER_WEEK, days);
        v.set(f::WEEKLY_WORK_HOURS, weekly);
        v.set(f::WORK_INTENSITY, work_intensity(weekly));
        v.set(f::CHILDREN, sanitize(input.children, 0.0));

        let protection = input.protection;
        let protection_percent = protection.percent();
        v.set(f::PROTECTION_SCORE, protection.score());
        v.set(f::PROTECTION_PERCENT, protection_percent);
        v.set(f::MASK_USAGE, protection.mask.factor());
        v.set(f::GLOVE_USAGE, protection.gloves.factor());
        v.set(f::BOOT_USAGE, protection.boots.factor());
        v.set(f::HAT_USAGE, protection.hat.factor());
        v.set(f::COAT_USAGE, protection.coat.factor());

        let chemicals = fold_accents(&input.chemical_text);
        let pesticide = contains_any(&chemicals, PESTICIDE);
        let herbicide = contains_any(&chemicals, HERBICIDE);
        let insecticide = contains_any(&chemicals, INSECTICIDE);
        let fungicide = contains_any(&chemicals, FUNGICIDE);
        let fertilizer = contains_any(&chemicals, FERTILIZER);
        let hazardous = pesticide || herbicide || insecticide;

        v.set_flag(f::PESTICIDE, pesticide);
        v.set_flag(f::HERBICIDE, herbicide);
        v.set_flag(f::INSECTICIDE, insecticide);
        v.set_flag(f::FUNGICIDE, fungicide);
        v.set_flag(f::FERTILIZER, fertilizer);
        v.set(
            f::CHEMICAL_EXPOSURE_COUNT,
            count(&[pesticide, herbicide, insecticide, fungicide, fertilizer]),
        );
        v.set_flag(f::HAZARDOUS_CHEMICAL_EXPOSURE, hazardous);
        v.set_flag(f::CHEMICAL_PROTECTION_GAP, hazardous && protection_percent < 50.0);
        v.set_flag(
            f::CHRONIC_EXPOSURE,
            input.declared_chronic_exposure || (hazardous && experience > CHRONIC_EXPOSURE_YEARS),
        );

        let tasks = fold_accents(&input.task_text);
        let spreading = contains_any(&tasks, SPREADING);
        let treatment = contains_any(&tasks, TREATMENT);
        let harvest = contains_any(&tasks, HARVEST);
        let weeding = contains_any(&tasks, WEEDING);

        v.set_flag(f::SPREADING_TASK, spreading);
        v.set_flag(f::TREATMENT_TASK, treatment);
        v.set_flag(f::HARVEST_TASK, harvest);
        v.set_flag(f::WEEDING_TASK, weeding);
        v.set(f::HIGH_RISK_TASK_COUNT, count(&[spreading, treatment, weeding]));

        v.set_flag(f::RESPIRATORY_HISTORY, input.respiratory);
        v.set_flag(f::SKIN_HISTORY, input.skin);
        v.set_flag(f::NEUROLOGICAL_HISTORY, input.neurological);
        v.set_flag(f::COGNITIVE_HISTORY, input.cognitive);
        v.set(
            f::HEALTH_ISSUE_COUNT,
            count(&[input.respiratory, input.skin, input.neurological, input.cognitive]),
        );

        let systolic = sanitize(input.systolic_bp, DEFAULT_SYSTOLIC);
        let diastolic = sanitize(input.diastolic_bp, DEFAULT_DIASTOLIC);
        v.set(f::SYSTOLIC_BP, systolic);
        v.set(f::DIASTOLIC_BP, diastolic);
        v.set_flag(f::HYPERTENSION, systolic > 140.0 || diastolic > 90.0);

        v.set_flag(
            f::SOCIO_ECONOMIC_LOW,
            matches!(fold_accents(input.socio_economic.trim()).as_str(), "bas" | "faible" | "low"),
        );
        v.set_flag(
            f::SEASONAL_EMPLOYMENT,
            mentions_any(&input.employment, &["saison", "season", "temporaire"]),
        );

        v
    }
}

/// `<30 → 1`, `<45 → 2`, `<60 → 3`, else `4`.
#[must_use]
pub fn age_group(age: f64) -> f64 {
    if age < 30.0 {
        1.0
    } else if age < 45.0 {
        2.0
    } else if age < 60.0 {
        3.0
    } else {
        4.0
    }
}

/// `>48 h → 3`, `>40 h → 2`, else `1`.
#[must_use]
pub fn work_intensity(weekly_hours: f64) -> f64 {
    if weekly_hours > 48.0 {
        3.0
    } else if weekly_hours > 40.0 {
        2.0
    } else {
        1.0
    }
}

fn sanitize(value: f64, default: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        default
    }
}

fn contains_any(folded: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| folded.contains(n))
}

fn count(flags: &[bool]) -> f64 {
    flags.iter().filter(|&&b| b).count() as f64
}
