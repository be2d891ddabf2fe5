//! rescore CLI - Resume relevance scoring
//!
//! Usage:
//!   rescore evaluate --jd <jd-file> <resume>...
//!   rescore skills <file>
//!   rescore list [--all]
//!   rescore summary
//!   rescore export --out <file> [--query <text>] [--tier <tier>]...

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rescore_cli::{Evaluator, Upload};
use rescore_core::{AppConfig, EvaluationRecord, SuitabilityTier};
use rescore_extractor::{candidate_initials, SkillExtractor};
use rescore_parser::ParserRegistry;
use rescore_store::{
    deduplicate_best, export_csv, CsvEvaluationStore, EvaluationStore, RecordFilter, Summary,
};

#[derive(Parser)]
#[command(name = "rescore")]
#[command(about = "Score resumes against a job description")]
#[command(version)]
struct Cli {
    /// TOML config file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate resumes against a job description and record the results
    Evaluate {
        /// Job description file (PDF, DOCX, Markdown or text)
        #[arg(long)]
        jd: PathBuf,
        /// Resume files, evaluated in order
        #[arg(required = true)]
        resumes: Vec<PathBuf>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the skills found in a document
    Skills { path: PathBuf },
    /// List stored evaluations, best per resume
    List {
        /// Show every stored row, duplicates included
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Aggregate statistics over stored evaluations
    Summary {
        #[arg(long)]
        json: bool,
    },
    /// Write a filtered CSV of the best evaluation per resume
    Export {
        #[arg(long)]
        out: PathBuf,
        /// Matches resume name, candidate name or matched skills
        #[arg(long)]
        query: Option<String>,
        /// Keep only these tiers (high, medium, low)
        #[arg(long)]
        tier: Vec<SuitabilityTier>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    let store = CsvEvaluationStore::new(&config.store.path);

    match cli.command {
        Commands::Evaluate { jd, resumes, json } => evaluate(&config, store, &jd, &resumes, json)?,
        Commands::Skills { path } => {
            let doc = ParserRegistry::with_defaults()
                .parse(&path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            let extractor = SkillExtractor::from_config(&config.skills)?;
            let skills = extractor.extract(&doc.content);
            if skills.is_empty() {
                println!("No known skills found in {}", path.display());
                println!("Vocabulary: {}", extractor.vocabulary().join(", "));
            } else {
                println!("{skills}");
            }
        }
        Commands::List { all, json } => {
            let records = store.read_all()?;
            let records = if all { records } else { deduplicate_best(&records) };
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_table(&records);
            }
        }
        Commands::Summary { json } => {
            let summary = Summary::from_records(&deduplicate_best(&store.read_all()?));
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }
        Commands::Export { out, query, tier } => {
            let mut filter = RecordFilter::default().with_tiers(tier);
            if let Some(query) = query {
                filter = filter.with_query(query);
            }
            let records = filter.apply(&deduplicate_best(&store.read_all()?));

            let file = File::create(&out)
                .with_context(|| format!("Could not create {}", out.display()))?;
            export_csv(file, &records)?;
            info!(rows = records.len(), out = %out.display(), "Exported evaluations");
            println!("Exported {} evaluation(s) to {}", records.len(), out.display());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // Logs go to stderr so stdout stays clean for results
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn evaluate(
    config: &AppConfig,
    store: CsvEvaluationStore,
    jd_path: &Path,
    resumes: &[PathBuf],
    json: bool,
) -> anyhow::Result<()> {
    let mut evaluator = Evaluator::new(config, store)?;

    let jd_upload = Upload::from_path(jd_path)
        .with_context(|| format!("Could not read job description {}", jd_path.display()))?;
    let jd = evaluator.load_job_description(&jd_upload)?;

    let report = evaluator.evaluate_files(&jd, resumes);

    if json {
        let evaluated: Vec<_> = report.evaluated().collect();
        println!("{}", serde_json::to_string_pretty(&evaluated)?);
    } else {
        let skills = jd.skills.to_joined();
        println!("Job description skills: {}", display_or(&skills, "none"));
        for evaluation in report.evaluated() {
            print_evaluation(&evaluation.record);
        }
    }

    for (name, error) in report.failures() {
        let mut message = error.to_string();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            message.push_str(&format!(": {cause}"));
            source = cause.source();
        }
        eprintln!("{name}: {message}");
    }

    let lost = report.store_failures();
    if lost > 0 {
        bail!(
            "{lost} evaluation(s) could not be saved to {}",
            evaluator.store().path().display()
        );
    }
    Ok(())
}

fn print_evaluation(record: &EvaluationRecord) {
    let name = record.candidate_name.as_deref().unwrap_or("Not found");
    let phone = record.candidate_phone.as_deref().unwrap_or("Not found");
    let matched = record.matched_skills.to_joined();
    let missing = record.missing_skills.to_joined();

    println!();
    println!("{}", record.resume_name);
    println!("  Candidate: {name}");
    println!("  Phone:     {phone}");
    println!("  Score:     {:.2} ({})", record.score, record.tier());
    println!("  Matched:   {}", display_or(&matched, "none"));
    println!("  Missing:   {}", display_or(&missing, "none"));
}

fn print_table(records: &[EvaluationRecord]) {
    if records.is_empty() {
        println!("No evaluations recorded yet");
        return;
    }
    println!("{:<4} {:<32} {:>7} {:<7} MISSING", "", "RESUME", "SCORE", "TIER");
    for record in records {
        println!(
            "{:<4} {:<32} {:>7.2} {:<7} {}",
            candidate_initials(record.candidate_name.as_deref()),
            record.resume_name,
            record.score,
            record.tier(),
            record.missing_skills
        );
    }
}

fn print_summary(summary: &Summary) {
    println!("Candidates: {}", summary.total);
    if let (Some(avg), Some(top)) = (summary.average_score, summary.top_score) {
        println!("Average:    {avg:.2}");
        println!("Top:        {top:.2}");
    }
    for tier in SuitabilityTier::ALL {
        let count = summary.tier_counts.get(&tier).copied().unwrap_or(0);
        println!("{:<11} {count}", format!("{tier}:"));
    }
    if let Some(most) = summary.most_missing() {
        println!("Most missing skill: {} ({} candidate(s))", most.skill, most.count);
    }
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
