//! Assessment service: dataset state and predictor selection.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::scoring::{ModelPredictor, RulePredictor, ScoringContext};
use super::text_analysis::TextAnalyzer;
use super::training::ModelTrainer;
use crate::adapters::dataset;
use crate::adapters::{CatalogueKeywordExtractor, HttpRiskPredictor};
use crate::config::AssessmentConfig;
use crate::domain::{
    HealthRecord, PredictionInput, PredictionResult, RiskFactor, RiskModel, TextAnalysis,
};
use crate::ports::{KeywordExtractor, KeywordKind, PredictorError, RiskPredictor};
use crate::AgriRiskError;

/// Everything derived from one dataset load. Never mutated once built.
#[derive(Default)]
struct DatasetState {
    analysis: TextAnalysis,
    risk_factors: Vec<RiskFactor>,
    model: Option<Arc<RiskModel>>,
    record_count: usize,
}

/// Entry point for dataset loading and risk assessment.
///
/// A dataset load builds a complete new state and swaps it in with one write,
/// so a concurrent assessment sees either the previous dataset or the new
/// one, never a mix.
pub struct AssessmentService {
    config: AssessmentConfig,
    analyzer: TextAnalyzer,
    trainer: ModelTrainer,
    remote: Option<Arc<HttpRiskPredictor>>,
    /// Outcome of the latest remote health check or call.
    remote_healthy: AtomicBool,
    state: RwLock<Arc<DatasetState>>,
}

impl AssessmentService {
    /// Create a service with no dataset. A configured remote URL enables the
    /// remote predictor, whose health is checked once here.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AssessmentConfig) -> Result<Self, AgriRiskError> {
        let remote = HttpRiskPredictor::from_config(&config.remote)?.map(Arc::new);
        if let Some(remote) = &remote {
            tracing::info!(url = %remote.base_url(), "Remote prediction service configured");
        }
        Ok(Self::with_remote(config, remote))
    }

    /// Create a service that only predicts locally.
    #[must_use]
    pub fn local(config: AssessmentConfig) -> Self {
        Self::with_remote(config, None)
    }

    fn with_remote(config: AssessmentConfig, remote: Option<Arc<HttpRiskPredictor>>) -> Self {
        let healthy = remote.as_deref().is_some_and(HttpRiskPredictor::is_available);
        if remote.is_some() && !healthy {
            tracing::warn!("Remote prediction service unavailable, demo mode");
        }
        Self {
            trainer: ModelTrainer::new(config.training.clone()),
            analyzer: TextAnalyzer::new(),
            config,
            remote,
            remote_healthy: AtomicBool::new(healthy),
            state: RwLock::new(Arc::new(DatasetState::default())),
        }
    }

    /// Load a dataset file and replace the current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed; the current
    /// state is kept in that case.
    pub fn load_dataset_file(&self, path: impl AsRef<Path>) -> Result<usize, AgriRiskError> {
        let records = dataset::load_records(path)?;
        self.load_dataset(&records);
        Ok(records.len())
    }

    /// Analyse and fit `records`, then replace the current state.
    ///
    /// A fit failure leaves the new state without a model, and assessments
    /// fall back to the rule cascade.
    pub fn load_dataset(&self, records: &[HealthRecord]) {
        let analysis = self.analyzer.analyze(records);
        let risk_factors = self
            .analyzer
            .top_risk_factors(&analysis, self.config.risk_factor_limit);

        let model = match self.trainer.fit(records) {
            Ok(model) => Some(Arc::new(model)),
            Err(e) => {
                tracing::warn!(error = %e, "Model training failed, using rule-based scoring");
                None
            }
        };

        let next = Arc::new(DatasetState {
            analysis,
            risk_factors,
            model,
            record_count: records.len(),
        });

        match self.state.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
        tracing::info!(records = records.len(), "Dataset state replaced");
    }

    fn snapshot(&self) -> Arc<DatasetState> {
        match self.state.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// The local predictor for the current dataset: the trained model when
    /// one exists, the rule cascade otherwise.
    #[must_use]
    pub fn local_predictor(&self) -> Box<dyn RiskPredictor> {
        let state = self.snapshot();
        let mut context =
            ScoringContext::new(state.risk_factors.clone(), self.config.matched_factor_limit);
        if let Some(remote) = &self.remote {
            context = context.with_keywords(Arc::new(RemoteKeywords(Arc::clone(remote))));
        }

        match &state.model {
            Some(model) => Box::new(ModelPredictor::new(Arc::clone(model), context)),
            None => Box::new(RulePredictor::new(context)),
        }
    }

    /// Assess a worker.
    ///
    /// Uses the remote service when it is configured and healthy, the local
    /// predictor otherwise or when the remote call fails. Returns `None` only
    /// for a blank free-text description, which has nothing to assess.
    #[must_use]
    pub fn assess(&self, input: &PredictionInput) -> Option<PredictionResult> {
        if let PredictionInput::FreeText(text) = input {
            if text.is_blank() {
                tracing::debug!("Blank description, nothing to assess");
                return None;
            }
        }

        if let Some(remote) = self.remote.as_deref() {
            if remote.is_available() {
                match remote.predict(input) {
                    Ok(result) => {
                        self.remote_healthy.store(true, Ordering::Relaxed);
                        return Some(result);
                    }
                    Err(e) => tracing::warn!(error = %e, "Remote prediction failed, predicting locally"),
                }
            } else {
                tracing::warn!("Remote prediction service unavailable, predicting locally");
            }
            self.remote_healthy.store(false, Ordering::Relaxed);
        }

        let local = self.local_predictor();
        match local.predict(input) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(predictor = local.name(), error = %e, "Local prediction failed");
                RulePredictor::default().predict(input).ok()
            }
        }
    }

    /// True when the remote service last answered healthily.
    #[must_use]
    pub fn is_remote_healthy(&self) -> bool {
        self.remote.is_some() && self.remote_healthy.load(Ordering::Relaxed)
    }

    /// True when neither a trained model nor a healthy remote service is in
    /// use, so assessments come from the rule cascade.
    #[must_use]
    pub fn is_demo_mode(&self) -> bool {
        !self.is_remote_healthy() && self.snapshot().model.is_none()
    }

    #[must_use]
    pub fn analysis(&self) -> TextAnalysis {
        self.snapshot().analysis.clone()
    }

    /// Ranked risk factors of the current dataset.
    #[must_use]
    pub fn risk_factors(&self) -> Vec<RiskFactor> {
        self.snapshot().risk_factors.clone()
    }

    #[must_use]
    pub fn model(&self) -> Option<Arc<RiskModel>> {
        self.snapshot().model.clone()
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        self.snapshot().record_count
    }
}

/// Remote keyword extraction that degrades to the local catalogues.
struct RemoteKeywords(Arc<HttpRiskPredictor>);

impl KeywordExtractor for RemoteKeywords {
    fn extract(&self, text: &str, kind: KeywordKind) -> Result<Vec<String>, PredictorError> {
        match self.0.extract(text, kind) {
            Ok(keywords) => Ok(keywords),
            Err(e) => {
                tracing::debug!(error = %e, %kind, "Remote keyword extraction failed, using catalogue");
                CatalogueKeywordExtractor::new().extract(text, kind)
            }
        }
    }
}
