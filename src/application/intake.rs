//! Conversion of free-text descriptions into structured profiles.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{fold_accents, TextProfile, WorkerProfile};
use crate::ports::{KeywordExtractor, KeywordKind, PredictorError};

const DEFAULT_AGE: f64 = 35.0;
const DEFAULT_EXPERIENCE: f64 = 10.0;
const DEFAULT_HOURS_PER_DAY: f64 = 8.0;
const DEFAULT_DAYS_PER_WEEK: f64 = 5.0;

static YEARS: OnceLock<Regex> = OnceLock::new();
static HOURS: OnceLock<Regex> = OnceLock::new();
static DAYS: OnceLock<Regex> = OnceLock::new();

// Patterns run on accent-folded text.
fn years_pattern() -> &'static Regex {
    YEARS.get_or_init(|| {
        Regex::new(
            r"(\d{1,3})\s*ans\b(\s+(?:d['’]\s*(?:experience|anciennete)|de\s+(?:travail|metier|experience)|dans))?",
        )
        .expect("Valid regex")
    })
}

fn hours_pattern() -> &'static Regex {
    HOURS.get_or_init(|| {
        Regex::new(r"(\d{1,2})\s*h(?:eures?)?\s*(?:par|/)\s*jour").expect("Valid regex")
    })
}

fn days_pattern() -> &'static Regex {
    DAYS.get_or_init(|| {
        Regex::new(r"(\d)\s*j(?:ours?)?\s*(?:par|/)\s*semaine").expect("Valid regex")
    })
}

/// Numbers found in a description; `None` where nothing was stated.
#[derive(Debug, Default, PartialEq)]
struct StatedNumbers {
    age: Option<f64>,
    experience: Option<f64>,
    hours_per_day: Option<f64>,
    days_per_week: Option<f64>,
}

fn stated_numbers(text: &str) -> StatedNumbers {
    let folded = fold_accents(text);
    let mut stated = StatedNumbers::default();

    for caps in years_pattern().captures_iter(&folded) {
        let Some(years) = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok()) else {
            continue;
        };
        let slot = if caps.get(2).is_some() {
            &mut stated.experience
        } else {
            &mut stated.age
        };
        slot.get_or_insert(years);
    }

    let first_number = |re: &Regex| {
        re.captures(&folded)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    };
    stated.hours_per_day = first_number(hours_pattern()).filter(|h| *h <= 24.0);
    stated.days_per_week = first_number(days_pattern()).filter(|d| *d <= 7.0);
    stated
}

/// Build a structured profile from a free-text one.
///
/// Keyword lists come from `keywords`; ages, years of experience and working
/// time are read from any field, in phrases such as `45 ans`, `20 ans d'expérience`,
/// `9 heures par jour`, `6 jours par semaine`.
///
/// # Errors
///
/// Returns an error if the keyword extractor fails.
pub fn profile_from_text(
    text: &TextProfile,
    keywords: &dyn KeywordExtractor,
) -> Result<WorkerProfile, PredictorError> {
    let general = text.general_description.as_str();
    let with_general = |specific: &str| format!("{specific} {general}");

    let chemicals = keywords.extract(&with_general(&text.chemicals_text), KeywordKind::Chemical)?;
    let tasks = keywords.extract(&with_general(&text.tasks_text), KeywordKind::Task)?;
    let health = keywords.extract(&with_general(&text.health_text), KeywordKind::Health)?;
    let protection = keywords.extract(&text.protection_text, KeywordKind::Protection)?;

    // The general description comes first so that its numbers win.
    let all_text = [
        general,
        text.tasks_text.as_str(),
        text.health_text.as_str(),
        text.chemicals_text.as_str(),
        text.protection_text.as_str(),
    ]
    .join(" ");
    let stated = stated_numbers(&all_text);
    let has = |keyword: &str| health.iter().any(|h| fold_accents(h) == keyword);

    let profile = WorkerProfile {
        age: stated.age.unwrap_or(DEFAULT_AGE),
        work_experience: stated.experience.unwrap_or(DEFAULT_EXPERIENCE),
        work_hours_per_day: stated.hours_per_day.unwrap_or(DEFAULT_HOURS_PER_DAY),
        work_days_per_week: stated.days_per_week.unwrap_or(DEFAULT_DAYS_PER_WEEK),
        protective_equipment: protection,
        chemical_exposure: chemicals,
        tasks,
        has_respiratory_conditions: has("respiratoire") || has("allergie"),
        has_skin_conditions: has("cutane"),
        has_neurological_conditions: has("neurologique"),
        has_cognitive_conditions: has("cognitif"),
        chemicals_text: text.chemicals_text.clone(),
        tasks_text: text.tasks_text.clone(),
        ..Default::default()
    };

    tracing::debug!(
        chemicals = profile.chemical_exposure.len(),
        tasks = profile.tasks.len(),
        equipment = profile.protective_equipment.len(),
        "Free-text profile converted"
    );
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::CatalogueKeywordExtractor;

    #[test]
    fn test_stated_numbers() {
        let stated = stated_numbers(
            "Femme de 45 ans, 20 ans d'expérience, je travaille 9 heures par jour et 6 jours par semaine",
        );
        assert_eq!(
            stated,
            StatedNumbers {
                age: Some(45.0),
                experience: Some(20.0),
                hours_per_day: Some(9.0),
                days_per_week: Some(6.0),
            }
        );
    }

    #[test]
    fn test_experience_phrasings() {
        assert_eq!(stated_numbers("12 ans dans les champs").experience, Some(12.0));
        assert_eq!(stated_numbers("8 ans de travail agricole").experience, Some(8.0));
        assert_eq!(stated_numbers("3 ans d’ancienneté").experience, Some(3.0));
        assert_eq!(stated_numbers("3 ans d’ancienneté").age, None);
    }

    #[test]
    fn test_nothing_stated() {
        assert_eq!(stated_numbers("je travaille dans une serre"), StatedNumbers::default());
        assert_eq!(stated_numbers("30 heures par jour").hours_per_day, None);
    }

    #[test]
    fn test_profile_from_text() {
        let text = TextProfile {
            general_description: "J'ai 52 ans et 25 ans d'expérience".into(),
            chemicals_text: "J'utilise du Roundup et des pesticides".into(),
            tasks_text: "pulvérisation, cueillette".into(),
            health_text: "toux et démangeaisons".into(),
            protection_text: "je porte des gants et des bottes".into(),
        };
        let profile = profile_from_text(&text, &CatalogueKeywordExtractor::new())
            .expect("Catalogue extraction never fails");

        assert!((profile.age - 52.0).abs() < f64::EPSILON);
        assert!((profile.work_experience - 25.0).abs() < f64::EPSILON);
        assert!((profile.work_hours_per_day - 8.0).abs() < f64::EPSILON);
        assert_eq!(profile.chemical_exposure, vec!["pesticide", "herbicide"]);
        assert_eq!(profile.tasks, vec!["traitement", "récolte"]);
        assert_eq!(profile.protective_equipment, vec!["gants", "bottes"]);
        assert!(profile.has_respiratory_conditions);
        assert!(profile.has_skin_conditions);
        assert!(!profile.has_neurological_conditions);
        assert_eq!(profile.chemicals_text, text.chemicals_text);
    }

    #[test]
    fn test_numbers_outside_general_description() {
        let text = TextProfile {
            general_description: "J'ai 40 ans".into(),
            tasks_text: "cueillette 9 heures par jour, 6 jours par semaine".into(),
            health_text: "toux depuis 2 ans".into(),
            ..Default::default()
        };
        let profile = profile_from_text(&text, &CatalogueKeywordExtractor::new())
            .expect("Catalogue extraction never fails");
        assert!((profile.age - 40.0).abs() < f64::EPSILON);
        assert!((profile.work_hours_per_day - 9.0).abs() < f64::EPSILON);
        assert!((profile.work_days_per_week - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_text_gives_defaults() {
        let profile = profile_from_text(&TextProfile::default(), &CatalogueKeywordExtractor::new())
            .expect("Catalogue extraction never fails");
        assert!((profile.age - 35.0).abs() < f64::EPSILON);
        assert!((profile.work_experience - 10.0).abs() < f64::EPSILON);
        assert!(profile.chemical_exposure.is_empty());
        assert!(profile.protective_equipment.is_empty());
    }
}
