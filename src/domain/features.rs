//! Named numeric features.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Feature names shared by record and profile extraction.
pub mod names {
    pub const AGE: &str = "age";
    pub const AGE_GROUP: &str = "age_group";
    pub const WORK_EXPERIENCE: &str = "work_experience";
    pub const EXPERIENCE_TO_AGE_RATIO: &str = "experience_to_age_ratio";
    pub const HOURS_PER_DAY: &str = "hours_per_day";
    pub const DAYS_PER_WEEK: &str = "days_per_week";
    pub const WEEKLY_WORK_HOURS: &str = "weekly_work_hours";
    pub const WORK_INTENSITY: &str = "work_intensity";
    pub const CHILDREN: &str = "children";

    pub const PROTECTION_SCORE: &str = "protection_score";
    pub const PROTECTION_PERCENT: &str = "protection_percent";
    pub const MASK_USAGE: &str = "mask_usage";
    pub const GLOVE_USAGE: &str = "glove_usage";
    pub const BOOT_USAGE: &str = "boot_usage";
    pub const HAT_USAGE: &str = "hat_usage";
    pub const COAT_USAGE: &str = "coat_usage";

    pub const PESTICIDE: &str = "pesticide";
    pub const HERBICIDE: &str = "herbicide";
    pub const INSECTICIDE: &str = "insecticide";
    pub const FUNGICIDE: &str = "fungicide";
    pub const FERTILIZER: &str = "fertilizer";
    pub const CHEMICAL_EXPOSURE_COUNT: &str = "chemical_exposure_count";
    pub const HAZARDOUS_CHEMICAL_EXPOSURE: &str = "hazardous_chemical_exposure";
    pub const CHEMICAL_PROTECTION_GAP: &str = "chemical_protection_gap";
    pub const CHRONIC_EXPOSURE: &str = "chronic_exposure";

    pub const SPREADING_TASK: &str = "spreading_task";
    pub const TREATMENT_TASK: &str = "treatment_task";
    pub const HARVEST_TASK: &str = "harvest_task";
    pub const WEEDING_TASK: &str = "weeding_task";
    pub const HIGH_RISK_TASK_COUNT: &str = "high_risk_task_count";

    pub const RESPIRATORY_HISTORY: &str = "respiratory_history";
    pub const SKIN_HISTORY: &str = "skin_history";
    pub const NEUROLOGICAL_HISTORY: &str = "neurological_history";
    pub const COGNITIVE_HISTORY: &str = "cognitive_history";
    pub const HEALTH_ISSUE_COUNT: &str = "health_issue_count";

    pub const SYSTOLIC_BP: &str = "systolic_bp";
    pub const DIASTOLIC_BP: &str = "diastolic_bp";
    pub const HYPERTENSION: &str = "hypertension";

    pub const SOCIO_ECONOMIC_LOW: &str = "socio_economic_low";
    pub const SEASONAL_EMPLOYMENT: &str = "seasonal_employment";

    /// Every feature, in a fixed order.
    pub const ALL: [&str; 40] = [
        AGE,
        AGE_GROUP,
        WORK_EXPERIENCE,
        EXPERIENCE_TO_AGE_RATIO,
        HOURS_PER_DAY,
        DAYS_PER_WEEK,
        WEEKLY_WORK_HOURS,
        WORK_INTENSITY,
        CHILDREN,
        PROTECTION_SCORE,
        PROTECTION_PERCENT,
        MASK_USAGE,
        GLOVE_USAGE,
        BOOT_USAGE,
        HAT_USAGE,
        COAT_USAGE,
        PESTICIDE,
        HERBICIDE,
        INSECTICIDE,
        FUNGICIDE,
        FERTILIZER,
        CHEMICAL_EXPOSURE_COUNT,
        HAZARDOUS_CHEMICAL_EXPOSURE,
        CHEMICAL_PROTECTION_GAP,
        CHRONIC_EXPOSURE,
        SPREADING_TASK,
        TREATMENT_TASK,
        HARVEST_TASK,
        WEEDING_TASK,
        HIGH_RISK_TASK_COUNT,
        RESPIRATORY_HISTORY,
        SKIN_HISTORY,
        NEUROLOGICAL_HISTORY,
        COGNITIVE_HISTORY,
        HEALTH_ISSUE_COUNT,
        SYSTOLIC_BP,
        DIASTOLIC_BP,
        HYPERTENSION,
        SOCIO_ECONOMIC_LOW,
        SEASONAL_EMPLOYMENT,
    ];
}

/// Mapping from feature name to value.
///
/// Lookups of an unknown name read as `0.0`, which is also what a linear model
/// contributes for a feature it never saw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<String, f64>);

impl FeatureVector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    /// Insert a value; non-finite values are stored as `0.0`.
    pub fn set(&mut self, name: &str, value: f64) {
        let value = if value.is_finite() { value } else { 0.0 };
        self.0.insert(name.to_string(), value);
    }

    /// Insert a boolean flag as `1.0` / `0.0`.
    pub fn set_flag(&mut self, name: &str, flag: bool) {
        self.set(name, if flag { 1.0 } else { 0.0 });
    }

    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.get(name) > 0.0
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when no value is NaN or infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.values().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_feature_reads_zero() {
        let v = FeatureVector::new();
        assert!((v.get("nope") - 0.0).abs() < f64::EPSILON);
        assert!(!v.flag("nope"));
    }

    #[test]
    fn test_non_finite_values_are_zeroed() {
        let mut v = FeatureVector::new();
        v.set(names::AGE, f64::NAN);
        v.set(names::CHILDREN, f64::INFINITY);
        assert!(v.is_finite());
        assert!((v.get(names::AGE) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_feature_names_unique() {
        let mut seen = std::collections::HashSet::new();
        for name in names::ALL {
            assert!(seen.insert(name), "duplicate feature name {name}");
        }
    }
}
