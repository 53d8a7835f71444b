use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use shortlist::config::Config;
use shortlist::models::{CandidateRecord, JobRequirement};
use shortlist::output::{export, terminal};
use shortlist::pipeline;
use shortlist::scoring::{ScoringWeights, WeightOverrides};

/// Shortlist: rank candidate resumes against a job description.
///
/// Combines batch-scoped semantic similarity, requirement coverage, and
/// timeline consistency into one explainable score per candidate, with
/// disparate-impact diagnostics over the ranked pool.
#[derive(Parser)]
#[command(name = "shortlist", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a candidate batch and print the ranking
    Score {
        /// Path to the job requirement JSON
        #[arg(long)]
        job: PathBuf,

        /// Path to the candidate batch JSON (array of records)
        #[arg(long)]
        candidates: PathBuf,

        /// Also write the ranking as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the full machine-readable outcome as JSON
        #[arg(long)]
        json: bool,

        /// Show the per-term score breakdown for the top N candidates
        #[arg(long, default_value = "0")]
        explain: usize,
    },

    /// Re-rank a batch under adjusted weights, next to the baseline
    Whatif {
        #[arg(long)]
        job: PathBuf,

        #[arg(long)]
        candidates: PathBuf,

        /// Override for the semantic similarity weight
        #[arg(long)]
        semantic_weight: Option<f64>,

        /// Override for the must-have coverage weight
        #[arg(long)]
        must_have_weight: Option<f64>,

        /// Override for the nice-to-have coverage weight
        #[arg(long)]
        nice_to_have_weight: Option<f64>,

        /// Override for the consistency penalty weight
        #[arg(long)]
        consistency_weight: Option<f64>,
    },

    /// Score a batch and show only the fairness report
    Audit {
        #[arg(long)]
        job: PathBuf,

        #[arg(long)]
        candidates: PathBuf,

        /// Absolute top-K to treat as "selected" (default: a fraction of the batch)
        #[arg(long)]
        top_k: Option<usize>,

        /// Reference group for impact ratios (default: highest selection rate)
        #[arg(long)]
        reference: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("shortlist=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Score {
            job,
            candidates,
            csv,
            json,
            explain,
        } => {
            let config = Config::load()?;
            let job = load_job(&job)?;
            let records = load_candidates(&candidates)?;
            let weights = ScoringWeights::default();

            let outcome = pipeline::score_batch(&job, &records, &config, &weights).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }

            terminal::display_ranking(&outcome);
            for candidate in outcome.ranked.iter().take(explain) {
                terminal::display_breakdown(candidate);
            }
            terminal::display_fairness(&outcome.fairness);

            if let Some(path) = csv {
                export::write_csv_file(&path, &outcome)?;
                println!("\n{}", format!("CSV export saved to: {}", path.display()).bold());
            }
        }

        Commands::Whatif {
            job,
            candidates,
            semantic_weight,
            must_have_weight,
            nice_to_have_weight,
            consistency_weight,
        } => {
            let config = Config::load()?;
            let job = load_job(&job)?;
            let records = load_candidates(&candidates)?;
            let base = ScoringWeights::default();

            let overrides = WeightOverrides {
                semantic_weight,
                must_have_weight,
                nice_to_have_weight,
                consistency_weight,
            };
            if overrides.is_empty() {
                anyhow::bail!(
                    "No weight overrides given. Pass at least one of --semantic-weight, \
                     --must-have-weight, --nice-to-have-weight, --consistency-weight."
                );
            }

            let baseline = pipeline::score_batch(&job, &records, &config, &base).await?;

            // Reweighting reuses the cached features — the corpus model is
            // never rebuilt for a what-if query.
            let adjusted = baseline.what_if(&base, &overrides, &config.fairness)?;

            println!("{}", "Baseline weights:".bold());
            terminal::display_ranking(&baseline);
            println!("\n{}", "Adjusted weights:".bold());
            terminal::display_ranking(&adjusted);
            terminal::display_fairness(&adjusted.fairness);

            report_rank_moves(&baseline, &adjusted);
        }

        Commands::Audit {
            job,
            candidates,
            top_k,
            reference,
        } => {
            let mut config = Config::load()?;
            if top_k.is_some() {
                config.fairness.top_k = top_k;
            }
            if reference.is_some() {
                config.fairness.reference_group = reference;
            }

            let job = load_job(&job)?;
            let records = load_candidates(&candidates)?;
            let weights = ScoringWeights::default();

            let outcome = pipeline::score_batch(&job, &records, &config, &weights).await?;
            terminal::display_fairness(&outcome.fairness);
        }
    }

    Ok(())
}

fn load_job(path: &PathBuf) -> Result<JobRequirement> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading job file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing job file {}", path.display()))
}

fn load_candidates(path: &PathBuf) -> Result<Vec<CandidateRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading candidates file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing candidates file {}", path.display()))
}

/// Summarize which candidates moved between the two rankings.
fn report_rank_moves(
    baseline: &shortlist::models::ScoringOutcome,
    adjusted: &shortlist::models::ScoringOutcome,
) {
    let mut moves = Vec::new();
    for (new_rank, candidate) in adjusted.ranked.iter().enumerate() {
        let old_rank = baseline.ranked.iter().position(|c| c.id == candidate.id);
        if let Some(old) = old_rank {
            if old != new_rank {
                moves.push((candidate.id.clone(), old + 1, new_rank + 1));
            }
        }
    }

    if moves.is_empty() {
        println!("\nRanking unchanged under the adjusted weights.");
    } else {
        println!("\n{}", format!("{} candidate(s) moved:", moves.len()).bold());
        for (id, old, new) in moves {
            let arrow = if new < old { "up".green() } else { "down".yellow() };
            println!("  {id}: #{old} -> #{new} ({arrow})");
        }
    }
}
