//! CLI entrypoint for xplain
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use xplain_application::{
    AutoExplainer, DispatchParams, FailurePolicy, NoProgress, ProgressNotifier,
};
use xplain_domain::{OutputFormat, PredictiveModel};
use xplain_infrastructure::{
    ConfigLoader, FileConfig, builtin_registry, load_batch_for, load_model,
};
use xplain_presentation::{Cli, ConsoleFormatter, OutputConfig, ProgressReporter, SimpleProgress};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting xplain");

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };
    config.validate().context("invalid configuration")?;

    let output = output_config(&cli, &config);
    output.apply_color();

    let domain = cli.domain.unwrap_or(config.session.domain);
    let mode = cli.mode.unwrap_or(config.session.mode);
    let registry = builtin_registry().context("built-in explainers failed to register")?;

    if cli.list {
        print!(
            "{}",
            ConsoleFormatter::format_algorithms(domain, registry.list(domain))
        );
        return Ok(());
    }

    let explainers = if cli.explainers.is_empty() {
        config.session.explainers.clone()
    } else {
        cli.explainers.clone()
    };
    if explainers.is_empty() {
        bail!("No explainers requested. Use -e <NAME> or set [session] explainers, see --list.");
    }

    // === Inputs ===
    let Some(model_path) = cli.model.as_deref() else {
        bail!("--model is required");
    };
    let model: Arc<dyn PredictiveModel> = Arc::new(load_model(model_path)?);

    let training = cli
        .data
        .as_deref()
        .map(|path| load_batch_for(path, domain))
        .transpose()?;
    let query = cli
        .query
        .as_deref()
        .map(|path| load_batch_for(path, domain))
        .transpose()?;

    // === Dependency Injection ===
    let mut builder = AutoExplainer::builder(explainers, domain, mode, model)
        .with_dispatch(dispatch_params(&cli, &config));
    if let Some(training) = training {
        builder = builder.with_training_data(training);
    }
    for (name, params) in config.algorithm_params() {
        builder = builder.with_params(name, params);
    }
    let explainer = builder.build(registry)?;

    if !cli.quiet && output.format != OutputFormat::Json {
        eprintln!();
        eprintln!("Domain: {}  Mode: {}", domain, mode);
        eprintln!(
            "Explainers: {}",
            explainer.names().collect::<Vec<_>>().join(", ")
        );
        if query.is_none() {
            eprintln!("No query given: running global explanations only");
        }
        eprintln!();
    }

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, waiting for running explainers");
            on_interrupt.cancel();
        }
    });

    let progress: Box<dyn ProgressNotifier> = if cli.quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };
    let result = explainer
        .explain_with_progress(query, None, progress.as_ref(), cancellation)
        .await?;

    println!("{}", ConsoleFormatter::render(&result, &output));

    Ok(())
}

/// Console logging by verbosity, plus an optional plain-text log file.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(level));

    let Some(path) = log_file else {
        tracing_subscriber::registry().with(console).init();
        return Ok(None);
    };

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(EnvFilter::new(if verbose == 0 { "info" } else { level }));

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .init();
    Ok(Some(guard))
}

/// Config file settings overridden by CLI flags
fn dispatch_params(cli: &Cli, config: &FileConfig) -> DispatchParams {
    let mut params = config.dispatch.to_dispatch_params();
    if let Some(workers) = cli.workers {
        params = params.with_max_workers(workers);
    }
    if cli.fail_fast {
        params = params.with_failure_policy(FailurePolicy::FailFast);
    } else if cli.skip_failed {
        params = params.with_failure_policy(FailurePolicy::SkipFailed);
    }
    if let Some(seconds) = cli.timeout {
        params = params.with_timeout(Some(Duration::from_secs(seconds)));
    }
    if cli.predict {
        params = params.with_run_predict(true);
    }
    params
}

fn output_config(cli: &Cli, config: &FileConfig) -> OutputConfig {
    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    OutputConfig::default()
        .with_format(format)
        .with_color(config.output.color && !cli.no_color)
        .with_top_k(cli.top_k.unwrap_or(config.output.top_k))
}
