//! AgriRisk: Occupational risk assessment for agricultural workers
//!
//! Main entry point for the command-line report.
//!
//! Usage: `agririsk [DATASET] [PROFILE]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agririsk::adapters::sanitize::SanitizingMakeWriter;
use agririsk::domain::{RiskFactor, TermRecord};
use agririsk::{AssessmentConfig, AssessmentService, PredictionInput, PredictionResult, WorkerProfile};

const DEFAULT_DATASET: &str = "data/sample_records.json";
const TOP_TERMS: usize = 10;

#[derive(Serialize)]
struct DatasetSummary {
    path: PathBuf,
    records: usize,
    model_trained: bool,
    demo_mode: bool,
}

#[derive(Serialize)]
struct TopTerms {
    health: Vec<TermRecord>,
    chemical: Vec<TermRecord>,
    task: Vec<TermRecord>,
}

#[derive(Serialize)]
struct Report {
    dataset: DatasetSummary,
    top_terms: TopTerms,
    risk_factors: Vec<RiskFactor>,
    prediction: Option<PredictionResult>,
    risk_summary: Option<&'static str>,
}

fn main() -> Result<()> {
    // Stdout carries the JSON report, so logs go to stderr unless a file is requested.
    let log_mode = std::env::var("AGRIRISK_LOG_MODE").unwrap_or_else(|_| "stderr".to_string());

    let (writer, _guard) = if log_mode == "file" {
        let log_file =
            std::env::var("AGRIRISK_LOG_FILE").unwrap_or_else(|_| "agririsk.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    let mut args = std::env::args().skip(1);
    let dataset_path = PathBuf::from(args.next().unwrap_or_else(|| DEFAULT_DATASET.to_string()));
    let profile_path = args.next().map(PathBuf::from);

    tracing::info!("Starting AgriRisk...");

    let service = AssessmentService::new(AssessmentConfig::from_env_or_default())?;
    let records = service
        .load_dataset_file(&dataset_path)
        .with_context(|| format!("Failed to load dataset {}", dataset_path.display()))?;

    let analysis = service.analysis();
    for term in analysis.health_terms.iter().take(5) {
        tracing::info!(term = %term.term, count = term.count, "Frequent health term");
    }
    for factor in service.risk_factors().iter().take(5) {
        tracing::info!(
            health = %factor.health_issue,
            exposure = %factor.exposure,
            score = factor.risk_score,
            "Risk factor"
        );
    }

    let input = match &profile_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read profile {}", path.display()))?;
            serde_json::from_str::<PredictionInput>(&text)
                .with_context(|| format!("Invalid profile {}", path.display()))?
        }
        None => PredictionInput::Structured(WorkerProfile::default()),
    };

    let prediction = service.assess(&input);
    match &prediction {
        Some(result) => tracing::info!(
            overall = result.overall_risk,
            level = %result.risk_level,
            advice = result.risk_level.description(),
            source = ?result.source,
            "Assessment complete"
        ),
        None => tracing::info!("Nothing to assess"),
    }
    if service.is_demo_mode() {
        tracing::warn!("Demo mode: no trained model and no healthy remote service, using rule-based scoring");
    }

    let report = Report {
        dataset: DatasetSummary {
            path: dataset_path,
            records,
            model_trained: service.model().is_some(),
            demo_mode: service.is_demo_mode(),
        },
        top_terms: TopTerms {
            health: analysis.health_terms.into_iter().take(TOP_TERMS).collect(),
            chemical: analysis.chemical_terms.into_iter().take(TOP_TERMS).collect(),
            task: analysis.task_terms.into_iter().take(TOP_TERMS).collect(),
        },
        risk_factors: service.risk_factors(),
        risk_summary: prediction.as_ref().map(|p| p.risk_level.description()),
        prediction,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);

    tracing::info!("AgriRisk shutdown complete.");
    Ok(())
}
