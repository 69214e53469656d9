//! Local risk prediction.
//!
//! Two [`RiskPredictor`]s share one scoring pipeline:
//! - [`ModelPredictor`] takes the overall risk from a trained [`RiskModel`]
//! - [`RulePredictor`] takes it from the multiplicative rule cascade
//!
//! Respiratory, skin and neurological risks always come from the cascade.

use std::sync::Arc;

use super::features::{work_intensity, FeatureExtractor};
use super::intake::profile_from_text;
use crate::adapters::nlp::{normalize_terms, Lexicon};
use crate::adapters::CatalogueKeywordExtractor;
use crate::domain::{
    clamp_score, feature_names as f, fold_accents, mentions_any, FeatureImportance,
    FeatureVector, PredictionInput, PredictionResult, PredictionSource, RiskFactor, RiskModel,
    WhatIfScenario, WorkerProfile, MAX_PROTECTION_SCORE,
};
use crate::ports::{KeywordExtractor, PredictorError, RiskPredictor};

const BASE_OVERALL: f64 = 15.0;
const BASE_RESPIRATORY: f64 = 12.0;
const BASE_SKIN: f64 = 10.0;
const BASE_NEUROLOGICAL: f64 = 11.0;

/// Half-width of the interval when no model backs the score.
const RULE_CONFIDENCE_MARGIN: f64 = 5.0;

const SCENARIO_FLOOR: f64 = 10.0;
const FULL_PROTECTION_OFFSET: f64 = 15.0;
const REDUCED_SCHEDULE_OFFSET: f64 = 10.0;
const NO_HAZARDOUS_OFFSET: f64 = 12.0;

const FULL_PROTECTION: &str = "Avec protection complète";
const REDUCED_SCHEDULE: &str = "Avec horaire réduit";
const NO_HAZARDOUS: &str = "Sans produits chimiques dangereux";

const PRIORITY_PREFIX: &str = "Prioritaire";
const MODEL_IMPORTANCE_ENTRIES: usize = 10;

/// Usage factor below which a worn item counts as missing.
const USAGE_THRESHOLD: f64 = 0.5;

const RESPIRATORY_STEMS: &[&str] = &[
    "respir", "pulmon", "dyspn", "toux", "asthm", "bronch", "pneumon", "emphysem", "palpit",
    "cardi", "tachy", "aryth",
];
const SKIN_STEMS: &[&str] = &["cutan", "dermat", "irrit", "prurit", "eczema", "eryth", "peau"];
const NEUROLOGICAL_STEMS: &[&str] = &[
    "cephal", "migrain", "vertig", "neuro", "trembl", "convuls", "parest", "memoire", "cognit",
    "concentr", "confus",
];

/// Four risk values before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryRisks {
    pub overall: f64,
    pub respiratory: f64,
    pub skin: f64,
    pub neurological: f64,
}

/// Outcome of the rule cascade over one feature vector.
#[derive(Debug, Clone)]
pub struct Cascade {
    pub risks: CategoryRisks,

    /// Overall-risk multipliers that fired, keyed by feature name
    contributions: Vec<(&'static str, f64)>,
}

impl Cascade {
    /// Apply every rule to unscaled features.
    #[must_use]
    pub fn run(features: &FeatureVector) -> Self {
        let mut c = Self {
            risks: CategoryRisks {
                overall: BASE_OVERALL,
                respiratory: BASE_RESPIRATORY,
                skin: BASE_SKIN,
                neurological: BASE_NEUROLOGICAL,
            },
            contributions: Vec::new(),
        };

        let age = features.get(f::AGE);
        if age >= 60.0 {
            c.overall(f::AGE, 1.6);
            c.risks.respiratory *= 1.6;
        } else if age >= 50.0 {
            c.overall(f::AGE, 1.3);
            c.risks.respiratory *= 1.17;
        }

        if features.get(f::WORK_EXPERIENCE) > 15.0 {
            c.overall(f::WORK_EXPERIENCE, 1.2);
            c.risks.neurological *= 1.32;
        }

        if features.get(f::HOURS_PER_DAY) > 8.0 || features.get(f::WEEKLY_WORK_HOURS) > 48.0 {
            c.overall(f::WEEKLY_WORK_HOURS, 1.4);
        }

        if features.flag(f::PESTICIDE) {
            c.overall(f::PESTICIDE, 2.0);
            c.risks.respiratory *= 2.2;
            c.risks.neurological *= 1.8;
            c.risks.skin *= 1.5;
        }
        if features.flag(f::HERBICIDE) {
            c.overall(f::HERBICIDE, 1.6);
            c.risks.skin *= 1.8;
            c.risks.respiratory *= 1.4;
        }
        if features.flag(f::INSECTICIDE) {
            c.overall(f::INSECTICIDE, 1.7);
            c.risks.neurological *= 1.9;
            c.risks.respiratory *= 1.6;
        }
        if features.flag(f::FUNGICIDE) {
            c.overall(f::FUNGICIDE, 1.3);
            c.risks.skin *= 1.4;
            c.risks.respiratory *= 1.3;
        }
        if features.flag(f::FERTILIZER) {
            c.overall(f::FERTILIZER, 1.2);
            c.risks.skin *= 1.3;
            c.risks.respiratory *= 1.3;
        }

        if features.get(f::CHEMICAL_EXPOSURE_COUNT) > 0.0 {
            if features.get(f::MASK_USAGE) < USAGE_THRESHOLD {
                c.overall(f::MASK_USAGE, 1.4);
                c.risks.respiratory *= 1.8;
            }
            if features.get(f::GLOVE_USAGE) < USAGE_THRESHOLD {
                c.overall(f::GLOVE_USAGE, 1.2);
                c.risks.skin *= 1.6;
            }
            if features.get(f::COAT_USAGE) < USAGE_THRESHOLD {
                c.risks.skin *= 1.3;
            }
        }

        if features.flag(f::SPREADING_TASK) || features.flag(f::TREATMENT_TASK) {
            c.risks.respiratory *= 1.3;
            c.risks.neurological *= 1.2;
        }
        if features.flag(f::WEEDING_TASK) {
            c.risks.skin *= 1.2;
        }

        if features.flag(f::RESPIRATORY_HISTORY) {
            c.overall(f::RESPIRATORY_HISTORY, 1.5);
            c.risks.respiratory *= 1.7;
        }
        if features.flag(f::SKIN_HISTORY) {
            c.overall(f::SKIN_HISTORY, 1.4);
            c.risks.skin *= 1.7;
        }
        if features.flag(f::NEUROLOGICAL_HISTORY) {
            c.overall(f::NEUROLOGICAL_HISTORY, 1.5);
            c.risks.neurological *= 1.7;
        }
        if features.flag(f::COGNITIVE_HISTORY) {
            c.risks.neurological *= 1.3;
        }

        if features.flag(f::CHRONIC_EXPOSURE) {
            c.overall(f::CHRONIC_EXPOSURE, 1.3);
            c.risks.neurological *= 1.5;
        }
        if features.flag(f::HYPERTENSION) {
            c.overall(f::HYPERTENSION, 1.2);
        }

        c.risks = CategoryRisks {
            overall: clamp_score(c.risks.overall),
            respiratory: clamp_score(c.risks.respiratory),
            skin: clamp_score(c.risks.skin),
            neurological: clamp_score(c.risks.neurological),
        };
        c
    }

    fn overall(&mut self, feature: &'static str, factor: f64) {
        self.risks.overall *= factor;
        self.contributions.push((feature, factor));
    }

    /// Fired overall multipliers as importances: `ln(factor)` relative to the
    /// strongest one, descending.
    #[must_use]
    pub fn importance(&self) -> Vec<FeatureImportance> {
        let strongest = self
            .contributions
            .iter()
            .map(|(_, factor)| factor.ln())
            .fold(0.0, f64::max);
        if strongest <= 0.0 {
            return Vec::new();
        }

        let mut importance: Vec<FeatureImportance> = self
            .contributions
            .iter()
            .map(|(feature, factor)| FeatureImportance {
                feature: (*feature).to_string(),
                importance: factor.ln() / strongest,
            })
            .collect();
        importance.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        importance
    }
}

/// Text-analysis risk factors whose exposure matches one of `chemicals`
/// (either string containing the other, accent-insensitive), highest
/// `risk_score` first.
#[must_use]
pub fn match_risk_factors(
    factors: &[RiskFactor],
    chemicals: &[String],
    limit: usize,
) -> Vec<RiskFactor> {
    let selected: Vec<String> = chemicals
        .iter()
        .map(|c| fold_accents(c.trim()))
        .filter(|c| !c.is_empty())
        .collect();
    if selected.is_empty() {
        return Vec::new();
    }

    let mut matched: Vec<RiskFactor> = factors
        .iter()
        .filter(|factor| {
            let exposure = fold_accents(&factor.exposure);
            !exposure.is_empty()
                && selected
                    .iter()
                    .any(|c| c.contains(&exposure) || exposure.contains(c.as_str()))
        })
        .cloned()
        .collect();
    matched.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    matched.truncate(limit);
    matched
}

/// Everything both local predictors share.
#[derive(Clone)]
pub struct ScoringContext {
    extractor: FeatureExtractor,
    keywords: Arc<dyn KeywordExtractor>,
    risk_factors: Arc<[RiskFactor]>,
    matched_limit: usize,
}

impl Default for ScoringContext {
    fn default() -> Self {
        Self::new(Vec::new(), 3)
    }
}

impl ScoringContext {
    /// Context over ranked text-analysis risk factors, using the built-in
    /// keyword catalogues for free text.
    #[must_use]
    pub fn new(risk_factors: Vec<RiskFactor>, matched_limit: usize) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            keywords: Arc::new(CatalogueKeywordExtractor::new()),
            risk_factors: risk_factors.into(),
            matched_limit,
        }
    }

    /// Replace the keyword extractor used for free-text input.
    #[must_use]
    pub fn with_keywords(mut self, keywords: Arc<dyn KeywordExtractor>) -> Self {
        self.keywords = keywords;
        self
    }

    fn profile(&self, input: &PredictionInput) -> Result<WorkerProfile, PredictorError> {
        match input {
            PredictionInput::Structured(profile) => Ok(profile.clone()),
            PredictionInput::FreeText(text) if text.is_blank() => {
                Err(PredictorError::InvalidInput("Empty description".to_string()))
            }
            PredictionInput::FreeText(text) => profile_from_text(text, self.keywords.as_ref()),
        }
    }

    fn predict(
        &self,
        input: &PredictionInput,
        model: Option<&RiskModel>,
    ) -> Result<PredictionResult, PredictorError> {
        let profile = self.profile(input)?;
        let features = self.extractor.from_profile(&profile);
        let cascade = Cascade::run(&features);

        let matched = match_risk_factors(
            &self.risk_factors,
            &selected_chemicals(&profile),
            self.matched_limit,
        );

        let mut risks = cascade.risks;
        for factor in &matched {
            let boost = factor.risk_score / 3.0;
            let issue = factor.health_issue.as_str();
            if mentions_any(issue, RESPIRATORY_STEMS) {
                risks.respiratory += boost;
            } else if mentions_any(issue, SKIN_STEMS) {
                risks.skin += boost;
            } else if mentions_any(issue, NEUROLOGICAL_STEMS) {
                risks.neurological += boost;
            }
        }

        let (overall, margin, importance, source) = match model {
            Some(model) => (
                model.score(&features),
                model.confidence_margin(),
                model.top_features(MODEL_IMPORTANCE_ENTRIES).to_vec(),
                PredictionSource::Model,
            ),
            None => (
                risks.overall,
                RULE_CONFIDENCE_MARGIN,
                cascade.importance(),
                PredictionSource::Rules,
            ),
        };
        risks.overall = clamp_score(overall);
        risks.respiratory = clamp_score(risks.respiratory);
        risks.skin = clamp_score(risks.skin);
        risks.neurological = clamp_score(risks.neurological);

        let mut risk_factors = Vec::new();
        if let Some(model) = model {
            risk_factors.push(format!(
                "Fiabilité du modèle de prédiction: {}%",
                model.accuracy.round()
            ));
        }
        risk_factors.extend(explain(&features, &matched));

        let result = PredictionResult {
            overall_risk: risks.overall,
            respiratory_risk: risks.respiratory,
            skin_risk: risks.skin,
            neurological_risk: risks.neurological,
            confidence_interval: [risks.overall - margin, risks.overall + margin],
            feature_importance: importance,
            risk_factors,
            recommendations: recommend(&features, &risks, &matched),
            what_if_scenarios: what_if(&features, risks.overall, model),
            matched_risk_factors: matched,
            source,
            ..Default::default()
        };

        tracing::debug!(
            source = ?result.source,
            overall = result.overall_risk,
            respiratory = result.respiratory_risk,
            skin = result.skin_risk,
            neurological = result.neurological_risk,
            "Local prediction computed"
        );
        Ok(result.normalized())
    }
}

/// Canonical chemical terms of a profile plus its raw exposure names.
fn selected_chemicals(profile: &WorkerProfile) -> Vec<String> {
    let mut chemicals = normalize_terms(&profile.chemical_text(), Some(Lexicon::chemical()));
    for name in &profile.chemical_exposure {
        if !chemicals.contains(name) {
            chemicals.push(name.clone());
        }
    }
    chemicals
}

fn items_in_use(features: &FeatureVector) -> usize {
    [f::MASK_USAGE, f::GLOVE_USAGE, f::BOOT_USAGE, f::HAT_USAGE, f::COAT_USAGE]
        .iter()
        .filter(|name| features.get(name) > 0.0)
        .count()
}

fn what_if(features: &FeatureVector, overall: f64, model: Option<&RiskModel>) -> Vec<WhatIfScenario> {
    let rescore = |modified: FeatureVector, offset: f64| {
        let score = match model {
            Some(model) => model.score(&modified).min(overall),
            None => overall - offset,
        };
        score.max(SCENARIO_FLOOR)
    };

    let mut scenarios = Vec::new();

    if items_in_use(features) < 3 {
        let mut modified = features.clone();
        for usage in [f::MASK_USAGE, f::GLOVE_USAGE, f::BOOT_USAGE, f::HAT_USAGE, f::COAT_USAGE] {
            modified.set(usage, 1.0);
        }
        modified.set(f::PROTECTION_SCORE, MAX_PROTECTION_SCORE);
        modified.set(f::PROTECTION_PERCENT, 100.0);
        modified.set_flag(f::CHEMICAL_PROTECTION_GAP, false);
        scenarios.push(WhatIfScenario {
            label: FULL_PROTECTION.to_string(),
            score: rescore(modified, FULL_PROTECTION_OFFSET),
        });
    }

    if features.get(f::WEEKLY_WORK_HOURS) > 40.0 {
        let mut modified = features.clone();
        let hours = features.get(f::HOURS_PER_DAY).min(8.0);
        let days = features.get(f::DAYS_PER_WEEK).min(5.0);
        modified.set(f::HOURS_PER_DAY, hours);
        modified.set(f::DAYS_PER_WEEK, days);
        modified.set(f::WEEKLY_WORK_HOURS, hours * days);
        modified.set(f::WORK_INTENSITY, work_intensity(hours * days));
        scenarios.push(WhatIfScenario {
            label: REDUCED_SCHEDULE.to_string(),
            score: rescore(modified, REDUCED_SCHEDULE_OFFSET),
        });
    }

    if features.flag(f::HAZARDOUS_CHEMICAL_EXPOSURE) {
        let mut modified = features.clone();
        for flag in [
            f::PESTICIDE,
            f::HERBICIDE,
            f::INSECTICIDE,
            f::HAZARDOUS_CHEMICAL_EXPOSURE,
            f::CHEMICAL_PROTECTION_GAP,
            f::CHRONIC_EXPOSURE,
        ] {
            modified.set_flag(flag, false);
        }
        let remaining = f64::from(u8::from(features.flag(f::FUNGICIDE)))
            + f64::from(u8::from(features.flag(f::FERTILIZER)));
        modified.set(f::CHEMICAL_EXPOSURE_COUNT, remaining);
        scenarios.push(WhatIfScenario {
            label: NO_HAZARDOUS.to_string(),
            score: rescore(modified, NO_HAZARDOUS_OFFSET),
        });
    }

    scenarios
}

fn explain(features: &FeatureVector, matched: &[RiskFactor]) -> Vec<String> {
    let mut factors = Vec::new();

    let age = features.get(f::AGE);
    if age > 50.0 {
        factors.push("Âge supérieur à 50 ans".to_string());
    } else if age >= 40.0 {
        factors.push("Âge entre 40 et 50 ans".to_string());
    }

    let experience = features.get(f::WORK_EXPERIENCE);
    if experience < 3.0 {
        factors.push("Moins de 3 ans d'expérience professionnelle".to_string());
    } else if experience > 15.0 {
        factors.push("Exposition professionnelle prolongée (>15 ans)".to_string());
    }

    let weekly = features.get(f::WEEKLY_WORK_HOURS);
    if weekly > 48.0 {
        factors.push("Charge de travail très élevée (>48h/semaine)".to_string());
    } else if weekly > 40.0 {
        factors.push("Charge de travail élevée (>40h/semaine)".to_string());
    }
    if features.get(f::HOURS_PER_DAY) > 8.0 {
        factors.push("Journées de travail prolongées (>8h/jour)".to_string());
    }

    let protection = features.get(f::PROTECTION_PERCENT);
    if protection < 50.0 {
        factors.push("Utilisation insuffisante d'équipement de protection".to_string());
    } else if protection >= 80.0 {
        factors.push("Bonne utilisation d'équipement de protection".to_string());
    }

    let exposed = features.get(f::CHEMICAL_EXPOSURE_COUNT);
    if exposed > 0.0 {
        if features.get(f::MASK_USAGE) < USAGE_THRESHOLD {
            factors.push(
                "Absence de protection respiratoire lors de l'utilisation de produits chimiques"
                    .to_string(),
            );
        }
        if features.get(f::GLOVE_USAGE) < USAGE_THRESHOLD {
            factors.push(
                "Absence de protection des mains lors de l'utilisation de produits chimiques"
                    .to_string(),
            );
        }
        factors.push(format!("Exposition à {exposed} produits chimiques"));
    }

    if features.flag(f::CHEMICAL_PROTECTION_GAP) {
        factors.push(
            "Risque élevé: Exposition aux produits chimiques dangereux sans protection adéquate"
                .to_string(),
        );
    }

    let high_risk_tasks = features.get(f::HIGH_RISK_TASK_COUNT);
    if high_risk_tasks > 1.0 {
        factors.push(format!(
            "Cumul de {high_risk_tasks} tâches à haut risque augmentant l'exposition"
        ));
    }

    if features.flag(f::RESPIRATORY_HISTORY) {
        factors.push("Antécédents de troubles respiratoires augmentant la vulnérabilité".to_string());
    }
    if features.flag(f::SKIN_HISTORY) {
        factors.push(
            "Antécédents de troubles cutanés augmentant la sensibilité aux expositions".to_string(),
        );
    }
    if features.flag(f::CHRONIC_EXPOSURE) {
        factors.push(
            "Exposition chronique aux produits chimiques avec risque d'effets cumulatifs"
                .to_string(),
        );
    }
    if features.flag(f::SOCIO_ECONOMIC_LOW) {
        factors.push(
            "Niveau socio-économique bas pouvant limiter l'accès aux soins et aux équipements"
                .to_string(),
        );
    }
    if features.get(f::CHILDREN) > 3.0 {
        factors.push(
            "Charge familiale importante (plus de 3 enfants) pouvant augmenter la fatigue"
                .to_string(),
        );
    }
    if features.flag(f::SEASONAL_EMPLOYMENT) {
        factors.push(
            "Emploi saisonnier potentiellement associé à moins de formation et d'équipement"
                .to_string(),
        );
    }

    for factor in matched {
        factors.push(format!(
            "{} associé à des cas de {} dans l'enquête ({} cas)",
            factor.exposure, factor.health_issue, factor.occurrence_count
        ));
    }

    factors
}

fn recommend(features: &FeatureVector, risks: &CategoryRisks, matched: &[RiskFactor]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |text: &str| out.push(text.to_string());

    let exposed = features.get(f::CHEMICAL_EXPOSURE_COUNT) > 0.0;

    if features.flag(f::CHEMICAL_PROTECTION_GAP) {
        push("Prioritaire: Utiliser un équipement de protection complet lors de la manipulation de produits chimiques");
    }
    if risks.respiratory > 50.0 || (exposed && features.get(f::MASK_USAGE) < USAGE_THRESHOLD) {
        push("Porter systématiquement un masque adapté lors de l'utilisation de produits chimiques");
    }
    if risks.skin > 50.0 || (exposed && features.get(f::GLOVE_USAGE) < USAGE_THRESHOLD) {
        push("Porter systématiquement des gants lors de la manipulation de produits chimiques");
    }
    if risks.neurological > 60.0 {
        push("Effectuer des bilans neurologiques réguliers et signaler tout symptôme (céphalées, vertiges, tremblements)");
    }
    if risks.overall >= 60.0 {
        push("Prioritaire: Consulter un médecin du travail pour une évaluation approfondie");
    }
    if features.get(f::WEEKLY_WORK_HOURS) > 48.0 {
        push("Réduire le temps de travail ou prévoir des pauses régulières pour limiter l'exposition");
    }
    if features.flag(f::RESPIRATORY_HISTORY) && exposed {
        push("Consultation médicale recommandée pour évaluer la compatibilité entre votre condition respiratoire et votre travail");
    }
    if features.flag(f::CHRONIC_EXPOSURE) {
        push("Surveillance médicale régulière recommandée pour détecter les effets à long terme");
    }
    if features.get(f::HIGH_RISK_TASK_COUNT) > 1.0 {
        push("Envisager une rotation des tâches pour réduire l'exposition répétée aux mêmes risques");
    }
    if features.get(f::AGE) > 50.0 {
        push("Envisager un suivi médical plus régulier compte tenu de l'âge");
    }
    if features.get(f::WORK_EXPERIENCE) < 3.0 {
        push("Suivre une formation sur les pratiques agricoles sécuritaires");
    }
    if features.flag(f::HYPERTENSION) {
        push("Faire contrôler régulièrement la tension artérielle");
    }
    if features.flag(f::SEASONAL_EMPLOYMENT) {
        push("Demander une formation de sécurité au début de chaque saison");
    }

    for factor in matched.iter().filter(|f| f.risk_score >= 50.0) {
        out.push(format!(
            "{PRIORITY_PREFIX}: Limiter l'exposition aux produits de type {}, fréquemment associés à des cas de {} dans l'enquête",
            factor.exposure, factor.health_issue
        ));
    }

    if out.is_empty() {
        out.push("Maintenir les bonnes pratiques actuelles de protection".to_string());
    }

    crate::domain::dedup_preserving_order(&mut out);
    out.sort_by_key(|r| !r.starts_with(PRIORITY_PREFIX));
    out
}

/// Scores with a trained model.
#[derive(Clone)]
pub struct ModelPredictor {
    model: Arc<RiskModel>,
    context: ScoringContext,
}

impl ModelPredictor {
    #[must_use]
    pub fn new(model: Arc<RiskModel>, context: ScoringContext) -> Self {
        Self { model, context }
    }

    #[must_use]
    pub fn model(&self) -> &RiskModel {
        &self.model
    }
}

impl RiskPredictor for ModelPredictor {
    fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, PredictorError> {
        self.context.predict(input, Some(&self.model))
    }

    fn name(&self) -> &'static str {
        "model"
    }
}

/// Deterministic fallback used when no model has been trained.
#[derive(Clone, Default)]
pub struct RulePredictor {
    context: ScoringContext,
}

impl RulePredictor {
    #[must_use]
    pub fn new(context: ScoringContext) -> Self {
        Self { context }
    }
}

impl RiskPredictor for RulePredictor {
    fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, PredictorError> {
        self.context.predict(input, None)
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::training::ModelTrainer;
    use crate::config::TrainingConfig;
    use crate::domain::{HealthRecord, RiskLevel, TextProfile};

    fn factor(health: &str, exposure: &str, count: u32, score: f64) -> RiskFactor {
        RiskFactor {
            health_issue: health.into(),
            exposure: exposure.into(),
            occurrence_count: count,
            risk_score: score,
            weighted_score: score,
        }
    }

    fn exposed_profile() -> WorkerProfile {
        WorkerProfile {
            age: 55.0,
            work_experience: 20.0,
            work_hours_per_day: 10.0,
            work_days_per_week: 6.0,
            chemical_exposure: vec!["pesticides".into(), "herbicides".into()],
            tasks: vec!["épandage".into(), "traitement".into()],
            has_respiratory_conditions: true,
            ..Default::default()
        }
    }

    fn trained_model() -> Arc<RiskModel> {
        let records = vec![
            HealthRecord {
                age: 52.0,
                work_experience: 25.0,
                hours_per_day: 10.0,
                chemicals: "herbicides, pesticides".into(),
                cardio_respiratory: "toux".into(),
                neurological: "céphalées".into(),
                ..Default::default()
            },
            HealthRecord {
                protection: crate::domain::ProtectionSet::full(),
                work_experience: 6.0,
                ..Default::default()
            },
            HealthRecord {
                age: 41.0,
                work_experience: 2.0,
                chemicals: "insecticides".into(),
                tasks: "épandage".into(),
                skin: "dermatite".into(),
                ..Default::default()
            },
        ];
        let trainer = ModelTrainer::new(TrainingConfig {
            seed: Some(3),
            ..Default::default()
        });
        Arc::new(trainer.fit(&records).expect("Should fit"))
    }

    #[test]
    fn test_cascade_baseline() {
        let features = FeatureExtractor::new().from_profile(&WorkerProfile::default());
        let cascade = Cascade::run(&features);
        assert_eq!(
            cascade.risks,
            CategoryRisks {
                overall: 15.0,
                respiratory: 12.0,
                skin: 10.0,
                neurological: 11.0,
            }
        );
        assert!(cascade.importance().is_empty());
    }

    #[test]
    fn test_cascade_pesticide_without_protection() {
        let profile = WorkerProfile {
            chemical_exposure: vec!["pesticides".into()],
            ..Default::default()
        };
        let features = FeatureExtractor::new().from_profile(&profile);
        let risks = Cascade::run(&features).risks;
        // 12 × 2.2 × 1.8 (no mask) = 47.52
        assert!((risks.respiratory - 48.0).abs() < f64::EPSILON);
        // 10 × 1.5 × 1.6 (no gloves) × 1.3 (no coat) = 31.2
        assert!((risks.skin - 31.0).abs() < f64::EPSILON);
        // 11 × 1.8 = 19.8
        assert!((risks.neurological - 20.0).abs() < f64::EPSILON);
        // 15 × 2.0 × 1.4 × 1.2 = 50.4
        assert!((risks.overall - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cascade_importance_ranked() {
        let features = FeatureExtractor::new().from_profile(&exposed_profile());
        let importance = Cascade::run(&features).importance();
        assert_eq!(importance[0].feature, f::PESTICIDE);
        assert!((importance[0].importance - 1.0).abs() < 1e-9);
        assert!(importance.windows(2).all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn test_rule_prediction_bounds_and_shape() {
        let result = RulePredictor::default()
            .predict(&PredictionInput::Structured(exposed_profile()))
            .expect("Should predict");

        assert!(result.is_within_bounds());
        assert_eq!(result.source, PredictionSource::Rules);
        assert!((result.overall_risk - 100.0).abs() < f64::EPSILON);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(
            result.confidence_interval,
            [95.0, 100.0]
        );
        assert!(!result.recommendations.is_empty());
        assert!(result.recommendations[0].starts_with(PRIORITY_PREFIX));
        assert!(!result.risk_factors.is_empty());
    }

    #[test]
    fn test_extreme_inputs_stay_in_bounds() {
        let predictor = RulePredictor::default();
        for (age, hours) in [(200.0, 0.0), (0.0, 24.0), (-5.0, f64::NAN), (f64::INFINITY, 1e9)] {
            let profile = WorkerProfile {
                age,
                work_hours_per_day: hours,
                ..exposed_profile()
            };
            let result = predictor
                .predict(&PredictionInput::Structured(profile))
                .expect("Should predict");
            assert!(result.is_within_bounds(), "out of bounds for age {age}");
            let [lo, hi] = result.confidence_interval;
            assert!(0.0 <= lo && lo <= hi && hi <= 100.0);
        }
    }

    #[test]
    fn test_what_if_full_protection_only_below_three_items() {
        let predictor = RulePredictor::default();
        let has_full_protection = |equipment: Vec<String>| {
            let profile = WorkerProfile {
                protective_equipment: equipment,
                ..exposed_profile()
            };
            predictor
                .predict(&PredictionInput::Structured(profile))
                .expect("Should predict")
                .what_if_scenarios
                .iter()
                .any(|s| s.label == FULL_PROTECTION)
        };

        assert!(has_full_protection(vec![]));
        assert!(has_full_protection(vec!["mask".into(), "gloves".into()]));
        assert!(!has_full_protection(vec![
            "mask".into(),
            "gloves".into(),
            "boots".into()
        ]));
    }

    #[test]
    fn test_rule_what_if_offsets_and_floor() {
        let result = RulePredictor::default()
            .predict(&PredictionInput::Structured(exposed_profile()))
            .expect("Should predict");
        let score = |label: &str| {
            result
                .what_if_scenarios
                .iter()
                .find(|s| s.label == label)
                .map(|s| s.score)
        };
        assert_eq!(score(FULL_PROTECTION), Some(85.0));
        assert_eq!(score(REDUCED_SCHEDULE), Some(90.0));
        assert_eq!(score(NO_HAZARDOUS), Some(88.0));

        let quiet = RulePredictor::default()
            .predict(&PredictionInput::Structured(WorkerProfile::default()))
            .expect("Should predict");
        // Overall 15: full protection floors at 10, no other scenario applies.
        assert_eq!(quiet.what_if_scenarios.len(), 1);
        assert!((quiet.what_if_scenarios[0].score - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_match_risk_factors() {
        let factors = vec![
            factor("toux", "pesticide", 5, 100.0),
            factor("dermatite", "engrais", 3, 60.0),
            factor("céphalées", "pesticide", 4, 80.0),
            factor("vertiges", "insecticide", 2, 40.0),
            factor("irritation", "pesticide", 1, 20.0),
        ];

        let matched = match_risk_factors(&factors, &["Pesticides".to_string()], 3);
        assert_eq!(matched.len(), 3);
        assert!(matched.iter().all(|m| m.exposure == "pesticide"));
        assert!((matched[0].risk_score - 100.0).abs() < f64::EPSILON);

        let matched = match_risk_factors(&factors, &["engrais chimique".to_string()], 3);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].health_issue, "dermatite");

        assert!(match_risk_factors(&factors, &[], 3).is_empty());
        assert!(match_risk_factors(&factors, &["fongicide".to_string()], 3).is_empty());
    }

    #[test]
    fn test_matched_factor_raises_category() {
        let profile = WorkerProfile {
            chemical_exposure: vec!["engrais".into()],
            ..Default::default()
        };
        let input = PredictionInput::Structured(profile);

        let plain = RulePredictor::default().predict(&input).expect("Should predict");
        let context = ScoringContext::new(vec![factor("dermatite", "engrais", 3, 90.0)], 3);
        let boosted = RulePredictor::new(context).predict(&input).expect("Should predict");

        assert!((boosted.skin_risk - (plain.skin_risk + 30.0)).abs() < 1.0);
        assert!((boosted.respiratory_risk - plain.respiratory_risk).abs() < f64::EPSILON);
        assert_eq!(boosted.matched_risk_factors.len(), 1);
        assert!(boosted.recommendations[0].starts_with(PRIORITY_PREFIX));
    }

    #[test]
    fn test_recommendations_deduplicated_priority_first() {
        let features = FeatureExtractor::new().from_profile(&exposed_profile());
        let risks = Cascade::run(&features).risks;
        let recommendations = recommend(&features, &risks, &[]);

        let mut unique = recommendations.clone();
        crate::domain::dedup_preserving_order(&mut unique);
        assert_eq!(unique, recommendations);

        let first_plain = recommendations
            .iter()
            .position(|r| !r.starts_with(PRIORITY_PREFIX))
            .unwrap_or(recommendations.len());
        assert!(recommendations[first_plain..]
            .iter()
            .all(|r| !r.starts_with(PRIORITY_PREFIX)));
    }

    #[test]
    fn test_blank_free_text_is_rejected() {
        let err = RulePredictor::default()
            .predict(&PredictionInput::FreeText(TextProfile::default()))
            .expect_err("Blank text has nothing to score");
        assert!(matches!(err, PredictorError::InvalidInput(_)));
    }

    #[test]
    fn test_free_text_prediction() {
        let text = TextProfile {
            general_description: "52 ans, 30 ans dans l'agriculture".into(),
            chemicals_text: "pesticides et désherbant".into(),
            health_text: "toux fréquente".into(),
            ..Default::default()
        };
        let result = RulePredictor::default()
            .predict(&PredictionInput::FreeText(text))
            .expect("Should predict");
        assert!(result.is_within_bounds());
        assert!(result.respiratory_risk > 50.0);
    }

    #[test]
    fn test_model_and_rules_share_shape() {
        let model = trained_model();
        let context = ScoringContext::default();
        let input = PredictionInput::Structured(exposed_profile());

        let by_model = ModelPredictor::new(Arc::clone(&model), context.clone())
            .predict(&input)
            .expect("Should predict");
        let by_rules = RulePredictor::new(context).predict(&input).expect("Should predict");

        assert_eq!(by_model.source, PredictionSource::Model);
        assert!(by_model.is_within_bounds());

        let keys = |r: &PredictionResult| {
            let value = serde_json::to_value(r).expect("Should serialize");
            let mut keys: Vec<String> = value
                .as_object()
                .expect("Should be an object")
                .keys()
                .cloned()
                .collect();
            keys.sort();
            keys
        };
        assert_eq!(keys(&by_model), keys(&by_rules));

        // Category risks come from the same cascade in both modes.
        assert!((by_model.respiratory_risk - by_rules.respiratory_risk).abs() < f64::EPSILON);
        assert!(by_model.risk_factors[0].starts_with("Fiabilité du modèle"));
        assert!(by_model.feature_importance.len() <= MODEL_IMPORTANCE_ENTRIES);

        for scenario in &by_model.what_if_scenarios {
            assert!(scenario.score >= SCENARIO_FLOOR);
            assert!(scenario.score <= by_model.overall_risk.max(SCENARIO_FLOOR));
        }
    }

    #[test]
    fn test_model_confidence_interval_from_error() {
        let model = trained_model();
        let result = ModelPredictor::new(Arc::clone(&model), ScoringContext::default())
            .predict(&PredictionInput::Structured(WorkerProfile::default()))
            .expect("Should predict");
        let margin = model.confidence_margin();
        let [lo, hi] = result.confidence_interval;
        assert!((lo - clamp_score(result.overall_risk - margin)).abs() <= 1.0);
        assert!((hi - clamp_score(result.overall_risk + margin)).abs() <= 1.0);
    }
}
