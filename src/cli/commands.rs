//! Command implementations for the Sentiscope CLI.

use std::sync::Arc;

use log::{info, warn};

use crate::artifact::ArtifactStore;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::{ServerConfig, TrainingConfig};
use crate::corpus::Corpus;
use crate::error::{Result, SentiscopeError};
use crate::evaluation::Evaluator;
use crate::server;
use crate::server::dto::BatchResponse;
use crate::service::SentimentService;
use crate::storage::FileStorage;
use crate::training::TrainingPipeline;

/// Execute a CLI command.
pub fn execute_command(args: SentiscopeArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args.clone(), &args),
        Command::Serve(serve_args) => serve(serve_args.clone()),
        Command::Predict(predict_args) => predict(predict_args.clone(), &args),
        Command::Evaluate(evaluate_args) => evaluate(evaluate_args.clone(), &args),
    }
}

/// Config file values first, then command line overrides.
pub fn training_config(args: &TrainArgs) -> Result<TrainingConfig> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_json_file(path)?,
        None => TrainingConfig::default(),
    };
    if let Some(policy) = args.persist_policy {
        config.persist_policy = policy;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(jobs) = args.jobs {
        config.grid_search.n_jobs = Some(jobs);
    }
    config.validate()?;
    Ok(config)
}

/// Config file values first, then command line overrides.
pub fn server_config(args: &ServeArgs) -> Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_json_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(workers) = args.workers {
        config.worker_threads = Some(workers);
    }
    config.validate()?;
    Ok(config)
}

fn train(args: TrainArgs, cli_args: &SentiscopeArgs) -> Result<()> {
    let config = training_config(&args)?;
    let store = ArtifactStore::open_dir(&args.models_dir)?;
    let pipeline = TrainingPipeline::new(config)?;
    let report = pipeline.run(&args.data, &store)?;

    output_result("Training complete", &report, cli_args)
}

fn serve(args: ServeArgs) -> Result<()> {
    let config = server_config(&args)?;
    let store = ArtifactStore::new(Arc::new(FileStorage::new(&args.models_dir)?));
    let service = Arc::new(SentimentService::from_store(&store, &config)?);
    if !service.is_ready() {
        warn!("Serving without a model; predictions will return 503 until restarted");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(service, &config))
}

fn predict(args: PredictArgs, cli_args: &SentiscopeArgs) -> Result<()> {
    let store = open_existing(&args.models_dir)?;
    let service = SentimentService::from_store(&store, &ServerConfig::default())?;
    let prediction = service.predict_texts(&args.texts)?;
    info!("Scored {} comments", prediction.results.len());

    output_result(
        "Predictions",
        &BatchResponse::from(prediction),
        cli_args,
    )
}

fn evaluate(args: EvaluateArgs, cli_args: &SentiscopeArgs) -> Result<()> {
    let gate = match &args.config {
        Some(path) => TrainingConfig::from_json_file(path)?.gate,
        None => TrainingConfig::default().gate,
    };
    let artifact = open_existing(&args.models_dir)?.load()?;
    let corpus = Corpus::from_csv_path(&args.data)?;

    let evaluator = Evaluator::new(gate);
    let report = evaluator.evaluate(artifact.classifier(), artifact.feature_space(), &corpus)?;
    evaluator.log_report(&report);

    let result = EvaluationResult {
        data: args.data.display().to_string(),
        examples: corpus.len(),
        metrics: report.metrics,
        gate: report.gate,
        timing: report.timing,
    };
    output_result("Evaluation complete", &result, cli_args)
}

fn open_existing(models_dir: &std::path::Path) -> Result<ArtifactStore> {
    let storage = FileStorage::open(models_dir).map_err(|_| {
        SentiscopeError::artifact(format!(
            "models directory not found: {}",
            models_dir.display()
        ))
    })?;
    Ok(ArtifactStore::new(Arc::new(storage)))
}
