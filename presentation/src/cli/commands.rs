//! CLI command definitions

use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;
use xplain_domain::{DataDomain, TaskMode};

/// Output format for explanation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every field of every record
    Full,
    /// Top features per record
    Summary,
    /// JSON envelopes keyed by algorithm
    Json,
}

impl From<OutputFormat> for xplain_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => Self::Full,
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for xplain
#[derive(Parser, Debug)]
#[command(name = "xplain")]
#[command(author, version, about = "Run several explanation algorithms against one model")]
#[command(long_about = r#"
xplain runs a set of explanation algorithms against a single predictive model
and prints one explanation per algorithm.

Data files are JSON batches tagged with their domain, for example
  {"domain": "tabular", "feature_names": ["age", "income"], "rows": [[31, 52000]]}
Model files hold a linear model:
  {"weights": [[0.4, -0.1]], "bias": [0.2], "link": "sigmoid"}

Configuration files are loaded from (in priority order):
1. XPLAIN_* environment variables
2. --config <path>     Explicit config file
3. ./xplain.toml       Project-level config
4. ~/.config/xplain/config.toml   Global config

Example:
  xplain --model model.json --data train.json --query query.json -e sensitivity -e occlusion
  xplain --model model.json --data train.json -e permutation -e pdp -o json
  xplain --list --domain text
"#)]
#[command(group(ArgGroup::new("policy").args(["fail_fast", "skip_failed"])))]
pub struct Cli {
    /// Model file (JSON linear model)
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Training data file
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Instances to explain; without it only global explanations run
    #[arg(long, value_name = "PATH")]
    pub query: Option<PathBuf>,

    /// Algorithm to run, by name or alias (can be specified multiple times)
    #[arg(short, long = "explainer", value_name = "NAME")]
    pub explainers: Vec<String>,

    /// Data domain: tabular, text, image or timeseries
    #[arg(long, value_name = "DOMAIN")]
    pub domain: Option<DataDomain>,

    /// Task mode: classification or regression
    #[arg(long, value_name = "MODE")]
    pub mode: Option<TaskMode>,

    /// Maximum number of explainers running at once
    #[arg(long, value_name = "N", value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub workers: Option<usize>,

    /// Stop at the first failing explainer (default)
    #[arg(long)]
    pub fail_fast: bool,

    /// Keep going when an explainer fails and report it
    #[arg(long)]
    pub skip_failed: bool,

    /// Give up on explainers that have not started after this many seconds
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Also print the model's predictions for the query
    #[arg(long)]
    pub predict: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Features shown per record in summary output
    #[arg(long, value_name = "K")]
    pub top_k: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// List the available algorithms and exit
    #[arg(long)]
    pub list: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "xplain",
            "--model",
            "m.json",
            "--data",
            "train.json",
            "--query",
            "q.json",
            "-e",
            "sensitivity",
            "-e",
            "pfi",
            "--domain",
            "tabular",
            "--mode",
            "regression",
            "--workers",
            "2",
            "--skip-failed",
            "-o",
            "json",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.explainers, vec!["sensitivity", "pfi"]);
        assert_eq!(cli.domain, Some(DataDomain::Tabular));
        assert_eq!(cli.mode, Some(TaskMode::Regression));
        assert_eq!(cli.workers, Some(2));
        assert!(cli.skip_failed);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_policies_conflict() {
        assert!(Cli::try_parse_from(["xplain", "--fail-fast", "--skip-failed"]).is_err());
    }

    #[test]
    fn test_zero_workers_rejected() {
        assert!(Cli::try_parse_from(["xplain", "--workers", "0"]).is_err());
    }

    #[test]
    fn test_unknown_domain_rejected() {
        assert!(Cli::try_parse_from(["xplain", "--domain", "audio"]).is_err());
    }
}
