//! CLI command definitions for stylebench.
//!
//! The pipeline runs as five subcommands, one per stage, so every
//! intermediate artifact can be inspected or re-run on its own:
//! fetch, prompts, infer, score, stats.

use clap::Parser;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use crate::aggregate::{aggregate, Grouping};
use crate::datasets::{
    sample_questions, MedMcqaCollector, MedQaCollector, PubMedQaCollector, QuestionSample,
    DEFAULT_SAMPLE_SEED, DEFAULT_SAMPLE_SIZE,
};
use crate::export::{
    scored_table, scored_table_name, significance_table, summary_table, write_table,
    SIGNIFICANCE_FILE_NAME, SUMMARY_FILE_NAME,
};
use crate::inference::{
    default_models, resolve_model, run_model, ModelSpec, OllamaClient, RawRunFile, RunConfig,
    DEFAULT_STYLE_DELAY_MS, OLLAMA_BASE_URL,
};
use crate::prompts::{build_prompt_file, PromptFile};
use crate::scoring::{score_run, ScoredFile, ScoredQuestion};
use crate::stats::{compare_models, TestResult, DEFAULT_PAIRS};
use crate::types::{DatasetKind, PromptStyle};

/// Default root for fetched samples and rendered prompts.
const DEFAULT_DATA_DIR: &str = "data";

/// Default root for raw, scored, summary and stats artifacts.
const DEFAULT_RESULTS_DIR: &str = "results";

/// Prompt-style consistency benchmark for local clinical LLMs.
#[derive(Parser)]
#[command(name = "stylebench")]
#[command(about = "Measure answer consistency of local LLMs across prompt stylings")]
#[command(version)]
#[command(
    long_about = "stylebench asks each model the same clinical question in five stylistic\nrewordings and measures whether the answers agree.\n\nStages run as separate subcommands so each artifact can be inspected:\n  stylebench fetch && stylebench prompts && stylebench infer\n  stylebench score && stylebench stats"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Fetch benchmark datasets and draw the seeded question sample.
    Fetch(FetchArgs),

    /// Render the five prompt styles for every sampled question.
    Prompts(PromptsArgs),

    /// Query models over the rendered prompts and persist raw completions.
    Infer(InferArgs),

    /// Extract answers, score consistency, and write the report tables.
    Score(ScoreArgs),

    /// Run pairwise significance tests over scored output.
    Stats(StatsArgs),
}

/// Arguments for `stylebench fetch`.
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Dataset to fetch (medqa, medmcqa, pubmedqa). Defaults to all three.
    #[arg(short, long)]
    pub dataset: Option<String>,

    /// Number of questions to sample per dataset.
    #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub samples: usize,

    /// Shuffle seed for sampling.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SEED)]
    pub seed: u64,

    /// Cap on rows fetched per dataset before sampling, for smoke runs.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Root directory for fetched artifacts.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Re-fetch even when a sample file already exists.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `stylebench prompts`.
#[derive(Parser, Debug)]
pub struct PromptsArgs {
    /// Dataset to render (medqa, medmcqa, pubmedqa). Defaults to all three.
    #[arg(short, long)]
    pub dataset: Option<String>,

    /// Root directory holding samples; prompt files land next to them.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Re-render even when a prompt file already exists.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `stylebench infer`.
#[derive(Parser, Debug)]
pub struct InferArgs {
    /// Dataset to run (medqa, medmcqa, pubmedqa). Defaults to all three.
    #[arg(short, long)]
    pub dataset: Option<String>,

    /// Comma-separated model keys from the default roster, or
    /// key=ollama_name pairs for models outside it.
    #[arg(short, long)]
    pub models: Option<String>,

    /// Ollama server base URL.
    #[arg(long, env = "OLLAMA_HOST", default_value = OLLAMA_BASE_URL)]
    pub endpoint: String,

    /// Questions in flight at once. The study ran serially.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// Pause between the five style completions of one question, in
    /// milliseconds.
    #[arg(long, default_value_t = DEFAULT_STYLE_DELAY_MS)]
    pub style_delay_ms: u64,

    /// Only run the first N questions of each prompt file.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Root directory holding rendered prompts.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Root directory for run artifacts.
    #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: String,

    /// Re-run models whose output file already exists.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `stylebench score`.
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Dataset to score (medqa, medmcqa, pubmedqa). Defaults to all three.
    #[arg(short, long)]
    pub dataset: Option<String>,

    /// Comma-separated model keys to score. Defaults to the full roster.
    #[arg(short, long)]
    pub models: Option<String>,

    /// Root directory holding raw runs; scored output lands next to them.
    #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: String,
}

/// Arguments for `stylebench stats`.
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Dataset to test (medqa, medmcqa, pubmedqa). Defaults to all three.
    #[arg(short, long)]
    pub dataset: Option<String>,

    /// Comma-separated model pairs as model1:model2. Defaults to the
    /// study's four comparisons.
    #[arg(short, long)]
    pub pairs: Option<String>,

    /// Root directory holding scored output.
    #[arg(long, default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: String,
}

/// Parse CLI arguments without executing any command.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with already parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Fetch(args) => run_fetch_command(args).await?,
        Commands::Prompts(args) => run_prompts_command(args)?,
        Commands::Infer(args) => run_infer_command(args).await?,
        Commands::Score(args) => run_score_command(args)?,
        Commands::Stats(args) => run_stats_command(args)?,
    }
    Ok(())
}

async fn run_fetch_command(args: FetchArgs) -> anyhow::Result<()> {
    let processed_dir = Path::new(&args.data_dir).join("processed");

    for dataset in resolve_datasets(args.dataset.as_deref())? {
        let path = processed_dir.join(QuestionSample::file_name(dataset));
        if path.exists() && !args.force {
            info!(
                dataset = %dataset,
                path = %path.display(),
                "Sample exists, skipping (use --force to re-fetch)"
            );
            continue;
        }

        info!(dataset = %dataset, "Fetching dataset");
        let rows = match dataset {
            DatasetKind::MedQa => MedQaCollector::new().collect(args.limit).await?,
            DatasetKind::MedMcqa => MedMcqaCollector::new().collect(args.limit).await?,
            DatasetKind::PubMedQa => PubMedQaCollector::new().collect(args.limit).await?,
        };
        let fetched = rows.len();
        let questions = sample_questions(rows, args.samples, args.seed);

        let sample = QuestionSample {
            dataset,
            seed: args.seed,
            sampled_at: chrono::Utc::now(),
            questions,
        };
        sample.save(&path)?;

        println!(
            "✓ {}: sampled {} of {} questions -> {}",
            dataset,
            sample.questions.len(),
            fetched,
            path.display()
        );
    }
    Ok(())
}

fn run_prompts_command(args: PromptsArgs) -> anyhow::Result<()> {
    let data_dir = Path::new(&args.data_dir);

    for dataset in resolve_datasets(args.dataset.as_deref())? {
        let out_path = data_dir.join("prompts").join(PromptFile::file_name(dataset));
        if out_path.exists() && !args.force {
            info!(
                dataset = %dataset,
                path = %out_path.display(),
                "Prompt file exists, skipping (use --force to re-render)"
            );
            continue;
        }

        let sample_path = data_dir
            .join("processed")
            .join(QuestionSample::file_name(dataset));
        if !sample_path.exists() {
            return Err(anyhow::anyhow!(
                "Sample file not found: {}; run `stylebench fetch` first",
                sample_path.display()
            ));
        }

        let sample = QuestionSample::load(&sample_path)?;
        let prompts = build_prompt_file(&sample)?;
        prompts.save(&out_path)?;

        println!(
            "✓ {}: rendered {} prompt sets ({} prompts) -> {}",
            dataset,
            prompts.sets.len(),
            prompts.sets.len() * PromptStyle::ALL.len(),
            out_path.display()
        );
    }
    Ok(())
}

async fn run_infer_command(args: InferArgs) -> anyhow::Result<()> {
    let datasets = resolve_datasets(args.dataset.as_deref())?;
    let models = resolve_models(args.models.as_deref())?;
    let client = OllamaClient::with_base_url(args.endpoint.clone());
    let config = RunConfig {
        concurrency: args.concurrency,
        style_delay_ms: args.style_delay_ms,
        limit: args.limit,
    };
    let raw_dir = Path::new(&args.results_dir).join("raw");

    for dataset in &datasets {
        let prompts_path = Path::new(&args.data_dir)
            .join("prompts")
            .join(PromptFile::file_name(*dataset));
        if !prompts_path.exists() {
            return Err(anyhow::anyhow!(
                "Prompt file not found: {}; run `stylebench prompts` first",
                prompts_path.display()
            ));
        }
        let prompts = PromptFile::load(&prompts_path)?;

        for model in &models {
            let out_path = raw_dir.join(RawRunFile::file_name(*dataset, &model.key));
            if out_path.exists() && !args.force {
                info!(
                    dataset = %dataset,
                    model = %model.key,
                    "Run file exists, skipping (use --force to re-run)"
                );
                continue;
            }

            let run = run_model(&client, model, &prompts, &config).await;
            run.save(&out_path)?;

            println!(
                "✓ {} on {}: {} questions, {} errors -> {}",
                model.key,
                dataset,
                run.question_count,
                run.error_count,
                out_path.display()
            );
        }
    }
    Ok(())
}

fn run_score_command(args: ScoreArgs) -> anyhow::Result<()> {
    let datasets = resolve_datasets(args.dataset.as_deref())?;
    let models = resolve_models(args.models.as_deref())?;
    let results_dir = Path::new(&args.results_dir);
    let raw_dir = results_dir.join("raw");
    let scored_dir = results_dir.join("scored");

    let mut all_scored: Vec<ScoredQuestion> = Vec::new();
    let mut scored_runs = 0usize;

    for dataset in &datasets {
        for model in &models {
            let raw_path = raw_dir.join(RawRunFile::file_name(*dataset, &model.key));
            if !raw_path.exists() {
                warn!(dataset = %dataset, model = %model.key, "No raw run file, skipping");
                continue;
            }

            let run = RawRunFile::load(&raw_path)?;
            let questions = score_run(&run)?;

            let table_path = scored_dir.join(scored_table_name(*dataset, &model.key));
            write_table(&scored_table(&questions), &table_path)?;

            let file = ScoredFile::new(*dataset, model.key.clone(), questions);
            file.save(&scored_dir.join(ScoredFile::file_name(*dataset, &model.key)))?;

            println!(
                "✓ scored {} on {}: {} questions -> {}",
                model.key,
                dataset,
                file.questions.len(),
                table_path.display()
            );
            all_scored.extend(file.questions);
            scored_runs += 1;
        }
    }

    if scored_runs == 0 {
        return Err(anyhow::anyhow!(
            "No raw run files found under {}; run `stylebench infer` first",
            raw_dir.display()
        ));
    }

    let rows = aggregate(&all_scored, Grouping::ModelDataset)?;
    let summary_path = results_dir.join("summary").join(SUMMARY_FILE_NAME);
    write_table(&summary_table(&rows), &summary_path)?;

    println!("\n=== Master Summary ===");
    for row in &rows {
        println!(
            "{:<10} {:<12} consistency {:.3} +/- {:.3}, accuracy {:.1}%, unknown {:.1}%",
            row.dataset.map(|d| d.to_string()).unwrap_or_default(),
            row.model.clone().unwrap_or_default(),
            row.mean_consistency,
            row.std_consistency,
            row.accuracy * 100.0,
            row.unknown_rate * 100.0
        );
    }
    println!("\nSaved to {}", summary_path.display());
    Ok(())
}

fn run_stats_command(args: StatsArgs) -> anyhow::Result<()> {
    let datasets = resolve_datasets(args.dataset.as_deref())?;
    let pairs = match args.pairs.as_deref() {
        Some(list) => parse_pairs(list)?,
        None => DEFAULT_PAIRS
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect(),
    };
    let results_dir = Path::new(&args.results_dir);
    let scored_dir = results_dir.join("scored");

    let mut results: Vec<TestResult> = Vec::new();
    for dataset in &datasets {
        let mut scored: BTreeMap<&str, ScoredFile> = BTreeMap::new();
        for key in pairs.iter().flat_map(|(a, b)| [a.as_str(), b.as_str()]) {
            if scored.contains_key(key) {
                continue;
            }
            let path = scored_dir.join(ScoredFile::file_name(*dataset, key));
            if path.exists() {
                scored.insert(key, ScoredFile::load(&path)?);
            }
        }

        println!("\n=== {} ===", dataset);
        for (a, b) in &pairs {
            let (left, right) = match (scored.get(a.as_str()), scored.get(b.as_str())) {
                (Some(left), Some(right)) => (left, right),
                _ => {
                    warn!(
                        dataset = %dataset,
                        pair = format!("{} vs {}", a, b),
                        "Scored output missing, skipping pair"
                    );
                    continue;
                }
            };

            let comparison = compare_models(*dataset, a, &left.questions, b, &right.questions)?;
            println!(
                "{} vs {}: consistency W={:.1} p={:.4} {} | accuracy chi2={:.3} p={:.4} {}",
                a,
                b,
                comparison.consistency.statistic,
                comparison.consistency.p_value,
                comparison.consistency.significance(),
                comparison.accuracy.statistic,
                comparison.accuracy.p_value,
                comparison.accuracy.significance()
            );
            results.push(comparison.consistency);
            results.push(comparison.accuracy);
        }
    }

    if results.is_empty() {
        return Err(anyhow::anyhow!(
            "No scored output under {}; run `stylebench score` first",
            scored_dir.display()
        ));
    }

    let path = results_dir.join("stats").join(SIGNIFICANCE_FILE_NAME);
    write_table(&significance_table(&results), &path)?;
    println!("\nSaved to {}", path.display());
    Ok(())
}

/// Datasets named by `--dataset`, or all three when absent.
fn resolve_datasets(arg: Option<&str>) -> anyhow::Result<Vec<DatasetKind>> {
    match arg {
        Some(name) => {
            let dataset = name
                .parse::<DatasetKind>()
                .map_err(|message| anyhow::anyhow!(message))?;
            Ok(vec![dataset])
        }
        None => Ok(DatasetKind::ALL.to_vec()),
    }
}

/// Model specs named by `--models`, or the default roster when absent.
fn resolve_models(arg: Option<&str>) -> anyhow::Result<Vec<ModelSpec>> {
    match arg {
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| resolve_model(part).map_err(anyhow::Error::from))
            .collect(),
        None => Ok(default_models()),
    }
}

/// Parse `--pairs` of the form "model1:model2,model3:model4".
fn parse_pairs(list: &str) -> anyhow::Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (a, b) = part
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("Invalid pair '{}', expected model1:model2", part))?;
        let (a, b) = (a.trim(), b.trim());
        if a.is_empty() || b.is_empty() {
            return Err(anyhow::anyhow!(
                "Invalid pair '{}', expected model1:model2",
                part
            ));
        }
        pairs.push((a.to_string(), b.to_string()));
    }
    if pairs.is_empty() {
        return Err(anyhow::anyhow!("No model pairs given"));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_defaults() {
        let cli = Cli::try_parse_from(["stylebench", "fetch"]).unwrap();
        match cli.command {
            Commands::Fetch(args) => {
                assert!(args.dataset.is_none());
                assert_eq!(args.samples, DEFAULT_SAMPLE_SIZE);
                assert_eq!(args.seed, DEFAULT_SAMPLE_SEED);
                assert!(args.limit.is_none());
                assert_eq!(args.data_dir, DEFAULT_DATA_DIR);
                assert!(!args.force);
            }
            _ => panic!("Expected fetch command"),
        }
    }

    #[test]
    fn test_infer_with_options() {
        let cli = Cli::try_parse_from([
            "stylebench",
            "infer",
            "--dataset",
            "medqa",
            "--models",
            "phi3_mini,mistral",
            "--endpoint",
            "http://10.0.0.5:11434",
            "--concurrency",
            "4",
            "--limit",
            "10",
            "--force",
        ])
        .unwrap();
        match cli.command {
            Commands::Infer(args) => {
                assert_eq!(args.dataset.as_deref(), Some("medqa"));
                assert_eq!(args.models.as_deref(), Some("phi3_mini,mistral"));
                assert_eq!(args.endpoint, "http://10.0.0.5:11434");
                assert_eq!(args.concurrency, 4);
                assert_eq!(args.style_delay_ms, DEFAULT_STYLE_DELAY_MS);
                assert_eq!(args.limit, Some(10));
                assert!(args.force);
            }
            _ => panic!("Expected infer command"),
        }
    }

    #[test]
    fn test_global_log_level() {
        let cli = Cli::try_parse_from(["stylebench", "score", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_resolve_datasets() {
        assert_eq!(
            resolve_datasets(Some("pubmedqa")).unwrap(),
            vec![DatasetKind::PubMedQa]
        );
        assert_eq!(resolve_datasets(None).unwrap(), DatasetKind::ALL.to_vec());
        assert!(resolve_datasets(Some("usmle")).is_err());
    }

    #[test]
    fn test_resolve_models_roster_and_custom() {
        let models = resolve_models(Some("phi3_mini, custom=llama3:8b")).unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "phi3:mini");
        assert_eq!(models[1].key, "custom");
        assert_eq!(models[1].name, "llama3:8b");

        assert_eq!(resolve_models(None).unwrap(), default_models());
        assert!(resolve_models(Some("gpt4")).is_err());
    }

    #[test]
    fn test_parse_pairs() {
        let pairs = parse_pairs("llama3.2:phi3_mini, gemma2:mistral").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("llama3.2".to_string(), "phi3_mini".to_string()),
                ("gemma2".to_string(), "mistral".to_string()),
            ]
        );

        assert!(parse_pairs("llama3.2").is_err());
        assert!(parse_pairs(":phi3_mini").is_err());
        assert!(parse_pairs("").is_err());
    }
}
