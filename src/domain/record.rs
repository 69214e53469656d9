//! Survey records.
//!
//! A dataset row arrives as a [`RawHealthRecord`] keyed by the French column
//! names of the questionnaire. Converting it into a [`HealthRecord`] is the one
//! place where absent values receive their defaults.

use serde::{Deserialize, Serialize};

use super::protection::{ProtectionSet, ProtectionUsage};

const DEFAULT_AGE: f64 = 35.0;
const DEFAULT_HOURS_PER_DAY: f64 = 8.0;
const DEFAULT_DAYS_PER_WEEK: f64 = 5.0;
const DEFAULT_SYSTOLIC: f64 = 120.0;
const DEFAULT_DIASTOLIC: f64 = 80.0;

/// One questionnaire row exactly as found in the dataset.
///
/// Numeric columns tolerate numeric strings; text columns tolerate any JSON
/// value and keep only strings. Unknown columns are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHealthRecord {
    #[serde(rename = "N°", default, deserialize_with = "lenient::label")]
    pub record_number: String,

    #[serde(rename = "Age", default, deserialize_with = "lenient::number")]
    pub age: Option<f64>,

    #[serde(rename = "Situation maritale", default, deserialize_with = "lenient::text")]
    pub marital_status: String,

    #[serde(rename = "Nb enfants", default, deserialize_with = "lenient::number")]
    pub children: Option<f64>,

    #[serde(rename = "Niveau socio-économique", default, deserialize_with = "lenient::text")]
    pub socio_economic_level: String,

    #[serde(rename = "Statut", default, deserialize_with = "lenient::text")]
    pub employment_status: String,

    #[serde(
        rename = "H travail / jour",
        alias = "H travail/jour",
        default,
        deserialize_with = "lenient::number"
    )]
    pub hours_per_day: Option<f64>,

    #[serde(
        rename = "J travail / Sem",
        alias = "J travail/Sem",
        default,
        deserialize_with = "lenient::number"
    )]
    pub days_per_week: Option<f64>,

    #[serde(rename = "Ancienneté agricole", default, deserialize_with = "lenient::number")]
    pub work_experience: Option<f64>,

    #[serde(rename = "Tâches effectuées", default, deserialize_with = "lenient::text")]
    pub tasks: String,

    #[serde(rename = "Produits chimiques utilisés", default, deserialize_with = "lenient::text")]
    pub chemicals: String,

    #[serde(rename = "Engrais utilisés", default, deserialize_with = "lenient::text")]
    pub fertilizers: String,

    #[serde(rename = "Produits biologiques utilisés", default, deserialize_with = "lenient::text")]
    pub bio_products: String,

    #[serde(rename = "Masque pour pesticides", default, deserialize_with = "lenient::text")]
    pub mask: String,

    #[serde(rename = "Gants", default, deserialize_with = "lenient::text")]
    pub gloves: String,

    #[serde(rename = "Bottes", default, deserialize_with = "lenient::text")]
    pub boots: String,

    #[serde(rename = "Casquette/Mdhalla", default, deserialize_with = "lenient::text")]
    pub hat: String,

    #[serde(rename = "Manteau imperméable", default, deserialize_with = "lenient::text")]
    pub coat: String,

    #[serde(rename = "Troubles cardio-respiratoires", default, deserialize_with = "lenient::text")]
    pub cardio_respiratory: String,

    #[serde(rename = "Troubles cognitifs", default, deserialize_with = "lenient::text")]
    pub cognitive: String,

    #[serde(rename = "Troubles neurologiques", default, deserialize_with = "lenient::text")]
    pub neurological: String,

    #[serde(rename = "Troubles cutanés/phanères", default, deserialize_with = "lenient::text")]
    pub skin: String,

    #[serde(rename = "Autres plaintes", default, deserialize_with = "lenient::text")]
    pub other_complaints: String,

    #[serde(rename = "TAS", default, deserialize_with = "lenient::number")]
    pub systolic_bp: Option<f64>,

    #[serde(rename = "TAD", default, deserialize_with = "lenient::number")]
    pub diastolic_bp: Option<f64>,
}

/// A surveyed worker with every field populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub record_number: Option<String>,
    pub age: f64,
    pub work_experience: f64,
    pub hours_per_day: f64,
    pub days_per_week: f64,
    pub children: f64,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,

    pub marital_status: String,
    pub socio_economic_level: String,
    pub employment_status: String,

    pub tasks: String,
    pub chemicals: String,
    pub fertilizers: String,
    pub bio_products: String,

    pub protection: ProtectionSet,

    pub cardio_respiratory: String,
    pub cognitive: String,
    pub neurological: String,
    pub skin: String,
    pub other_complaints: String,
}

impl HealthRecord {
    /// Parse one dataset row.
    ///
    /// # Errors
    ///
    /// Returns an error only when `value` is not a JSON object.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let raw: RawHealthRecord = serde_json::from_value(value)?;
        Ok(Self::from(raw))
    }

    /// Health complaint text of all categories, space-joined.
    #[must_use]
    pub fn health_text(&self) -> String {
        join_non_empty(&[
            &self.cardio_respiratory,
            &self.cognitive,
            &self.neurological,
            &self.skin,
            &self.other_complaints,
        ])
    }

    /// Chemical, fertiliser and bio-product text, space-joined.
    #[must_use]
    pub fn chemical_text(&self) -> String {
        join_non_empty(&[&self.chemicals, &self.fertilizers, &self.bio_products])
    }

    /// Weekly working hours.
    #[must_use]
    pub fn weekly_hours(&self) -> f64 {
        self.hours_per_day * self.days_per_week
    }

    #[must_use]
    pub fn has_hypertension(&self) -> bool {
        self.systolic_bp > 140.0 || self.diastolic_bp > 90.0
    }
}

impl Default for HealthRecord {
    fn default() -> Self {
        Self::from(RawHealthRecord::default())
    }
}

impl From<RawHealthRecord> for HealthRecord {
    fn from(raw: RawHealthRecord) -> Self {
        let record_number = Some(raw.record_number.trim().to_string()).filter(|s| !s.is_empty());

        Self {
            record_number,
            age: non_negative(raw.age).unwrap_or(DEFAULT_AGE),
            work_experience: non_negative(raw.work_experience).unwrap_or(0.0),
            hours_per_day: non_negative(raw.hours_per_day).unwrap_or(DEFAULT_HOURS_PER_DAY),
            days_per_week: non_negative(raw.days_per_week).unwrap_or(DEFAULT_DAYS_PER_WEEK),
            children: non_negative(raw.children).unwrap_or(0.0),
            systolic_bp: non_negative(raw.systolic_bp).unwrap_or(DEFAULT_SYSTOLIC),
            diastolic_bp: non_negative(raw.diastolic_bp).unwrap_or(DEFAULT_DIASTOLIC),
            marital_status: raw.marital_status,
            socio_economic_level: raw.socio_economic_level,
            employment_status: raw.employment_status,
            tasks: raw.tasks,
            chemicals: raw.chemicals,
            fertilizers: raw.fertilizers,
            bio_products: raw.bio_products,
            protection: ProtectionSet {
                mask: ProtectionUsage::parse(&raw.mask),
                gloves: ProtectionUsage::parse(&raw.gloves),
                boots: ProtectionUsage::parse(&raw.boots),
                hat: ProtectionUsage::parse(&raw.hat),
                coat: ProtectionUsage::parse(&raw.coat),
            },
            cardio_respiratory: raw.cardio_respiratory,
            cognitive: raw.cognitive,
            neurological: raw.neurological,
            skin: raw.skin,
            other_complaints: raw.other_complaints,
        }
    }
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

fn join_non_empty(parts: &[&String]) -> String {
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Field parsers that never reject a row because of a single odd cell.
mod lenient {
    use std::fmt;

    use serde::de::{Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};

    /// Parse "12", "12.5" and "12,5".
    pub(super) fn parse_number(s: &str) -> Option<f64> {
        s.trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    #[derive(Clone, Copy)]
    enum Mode {
        Number,
        Text,
        Label,
    }

    enum Cell {
        Number(f64),
        Text(String),
        Nothing,
    }

    struct CellVisitor(Mode);

    impl<'de> Visitor<'de> for CellVisitor {
        type Value = Cell;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("any survey cell value")
        }

        fn visit_bool<E>(self, _: bool) -> Result<Cell, E> {
            Ok(Cell::Nothing)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Cell, E> {
            Ok(Cell::Number(v as f64))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Cell, E> {
            Ok(Cell::Number(v as f64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Cell, E> {
            Ok(if v.is_finite() { Cell::Number(v) } else { Cell::Nothing })
        }

        fn visit_str<E>(self, v: &str) -> Result<Cell, E> {
            Ok(match self.0 {
                Mode::Number => parse_number(v).map_or(Cell::Nothing, Cell::Number),
                Mode::Text | Mode::Label => Cell::Text(v.to_string()),
            })
        }

        fn visit_unit<E>(self) -> Result<Cell, E> {
            Ok(Cell::Nothing)
        }

        fn visit_none<E>(self) -> Result<Cell, E> {
            Ok(Cell::Nothing)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Cell, D::Error> {
            d.deserialize_any(self)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Cell, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(Cell::Nothing)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Cell, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(Cell::Nothing)
        }
    }

    pub(super) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match d.deserialize_any(CellVisitor(Mode::Number))? {
            Cell::Number(v) => Some(v),
            Cell::Text(_) | Cell::Nothing => None,
        })
    }

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match d.deserialize_any(CellVisitor(Mode::Text))? {
            Cell::Text(s) => s,
            Cell::Number(_) | Cell::Nothing => String::new(),
        })
    }

    /// Identifiers: strings as-is, numbers rendered without a trailing `.0`.
    pub(super) fn label<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(match d.deserialize_any(CellVisitor(Mode::Label))? {
            Cell::Text(s) => s,
            Cell::Number(v) if v.fract() == 0.0 => format!("{v:.0}"),
            Cell::Number(v) => v.to_string(),
            Cell::Nothing => String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_questionnaire_row() {
        let record = HealthRecord::from_json(json!({
            "N°": 1,
            "Age": 45,
            "Situation maritale": "mariée",
            "Nb enfants": 3,
            "Niveau socio-économique": "moyen",
            "Statut": "permanente",
            "H travail / jour": 8,
            "J travail / Sem": 6,
            "Ancienneté agricole": 15,
            "Tâches effectuées": "epandage des engrais, cueillette des olives",
            "Produits chimiques utilisés": "pesticides, engrais chimiques",
            "Masque pour pesticides": "parfois",
            "Bottes": "souvent",
            "Gants": "parfois",
            "Casquette/Mdhalla": "toujours",
            "Manteau imperméable": "jamais",
            "Troubles cardio-respiratoires": "dyspnée, palpitations",
            "Troubles neurologiques": "céphalées",
            "TAS": 130,
            "TAD": 85
        }))
        .expect("Should parse record");

        assert_eq!(record.record_number.as_deref(), Some("1"));
        assert!((record.age - 45.0).abs() < f64::EPSILON);
        assert!((record.weekly_hours() - 48.0).abs() < f64::EPSILON);
        assert_eq!(record.protection.mask, ProtectionUsage::Sometimes);
        assert_eq!(record.protection.hat, ProtectionUsage::Always);
        assert_eq!(record.cognitive, "");
        assert_eq!(record.health_text(), "dyspnée, palpitations céphalées");
        assert!(!record.has_hypertension());
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let record = HealthRecord::from_json(json!({})).expect("Should parse empty object");
        assert!((record.age - 35.0).abs() < f64::EPSILON);
        assert!((record.hours_per_day - 8.0).abs() < f64::EPSILON);
        assert!((record.days_per_week - 5.0).abs() < f64::EPSILON);
        assert!((record.children - 0.0).abs() < f64::EPSILON);
        assert!((record.systolic_bp - 120.0).abs() < f64::EPSILON);
        assert!(record.record_number.is_none());
        assert_eq!(record, HealthRecord::default());
    }

    #[test]
    fn test_lenient_cells() {
        let record = HealthRecord::from_json(json!({
            "Age": "52",
            "H travail/jour": "7,5",
            "J travail/Sem": null,
            "Ancienneté agricole": "beaucoup",
            "Troubles cognitifs": 0,
            "Troubles cutanés/phanères": ["dermatite"],
            "Produits chimiques utilisés": {"nom": "herbicides"},
            "Gants": true,
            "TAS": -4
        }))
        .expect("Should tolerate odd cells");

        assert!((record.age - 52.0).abs() < f64::EPSILON);
        assert!((record.hours_per_day - 7.5).abs() < f64::EPSILON);
        assert!((record.days_per_week - 5.0).abs() < f64::EPSILON);
        assert!((record.work_experience - 0.0).abs() < f64::EPSILON);
        assert_eq!(record.cognitive, "");
        assert_eq!(record.skin, "");
        assert_eq!(record.chemicals, "");
        assert_eq!(record.protection.gloves, ProtectionUsage::Never);
        assert!((record.systolic_bp - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_object_row_rejected() {
        assert!(HealthRecord::from_json(json!("not a row")).is_err());
    }

    #[test]
    fn test_decimal_comma() {
        assert_eq!(lenient::parse_number(" 12,5 "), Some(12.5));
        assert_eq!(lenient::parse_number("abc"), None);
    }
}
