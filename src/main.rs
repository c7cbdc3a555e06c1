use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{debug, warn};
use std::path::PathBuf;
use std::time::Duration;

use inspect_score::evaluation::{FieldPatch, OverviewPatch};
use inspect_score::rubric::EvaluationKind;
use inspect_score::scoring::BinaryMark;
use inspect_score::session::Session;
use inspect_score::submit::SubmitError;

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum DraftsCommand {
    /// List locally saved evaluations (default)
    List,
    /// Delete the saved evaluation for a subject
    Remove {
        /// Subject (school) identifier
        subject: String,
    },
    /// Delete saved evaluations not touched for a while
    Prune {
        /// Age threshold, e.g. "30d" or "12h"
        #[arg(long, value_parser = humantime::parse_duration, default_value = "30d")]
        older_than: Duration,
    },
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start a new evaluation for a subject
    New {
        /// Evaluation kind: infrastructure, it, trades or headteacher
        kind: EvaluationKind,
        /// Subject (school) identifier
        subject: String,
        /// Replace an existing evaluation for the same subject
        #[arg(long)]
        force: bool,
    },
    /// Record the answer for one rubric item
    Set {
        subject: String,
        /// Section id, as shown by `inspect-score rubric <kind>`
        section: String,
        /// Item id within the section
        item: String,
        /// Is the item available (0 or 1)
        #[arg(long)]
        availability: Option<BinaryMark>,
        /// Is the item of adequate quality (0 or 1)
        #[arg(long)]
        quality: Option<BinaryMark>,
        /// Free-text observation
        #[arg(long)]
        observation: Option<String>,
    },
    /// Set the free-text overview of an evaluation
    Overview {
        subject: String,
        #[arg(long)]
        strengths: Option<String>,
        #[arg(long)]
        weaknesses: Option<String>,
        #[arg(long)]
        improvement: Option<String>,
    },
    /// Fill in an evaluation page by page
    Fill { subject: String },
    /// Show section totals for an evaluation
    Show {
        subject: String,
        /// Include every item with its answers and observation
        #[arg(long)]
        detail: bool,
        /// Print the evaluation and its chart series as JSON
        #[arg(long, conflicts_with = "detail")]
        json: bool,
    },
    /// Send a finished evaluation to the configured server
    Submit { subject: String },
    /// Manage locally saved evaluations
    Drafts {
        #[command(subcommand)]
        action: Option<DraftsCommand>,
    },
    /// Print the scoring rubric for an evaluation kind
    Rubric {
        kind: EvaluationKind,
        /// Print as YAML, suitable as a starting point for a rubric override
        #[arg(long)]
        yaml: bool,
    },
    /// Summarize every saved evaluation of a kind
    Report {
        kind: EvaluationKind,
        #[arg(long)]
        json: bool,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "inspect-score")]
#[command(about = "Score vocational school inspections against weighted rubrics", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/inspect-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "warn,inspect_score=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SubmitError>() {
        Some(SubmitError::Auth(_)) => EXIT_AUTH,
        Some(_) => EXIT_NETWORK,
        None => EXIT_CONFIG,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.map(PathBuf::from);

    if let Commands::Init = cli.command {
        if let Err(e) = inspect_score::config::run_init_wizard(config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match inspect_score::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = inspect_score::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let drafts_path = inspect_score::drafts::get_drafts_path();
    debug!("Draft cache at {}", drafts_path.display());
    let session = Session::new(config, drafts_path);

    if let Err(e) = run(&session, cli.command).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code_for(&e));
    }

    std::process::exit(EXIT_SUCCESS);
}

async fn run(session: &Session, command: Commands) -> Result<()> {
    let use_colors = inspect_score::output::should_use_colors();

    match command {
        Commands::New {
            kind,
            subject,
            force,
        } => {
            let (evaluation, rubric) = session.start(kind, &subject, force)?;
            println!(
                "Started {} evaluation for {} ({} sections, {} items, {} marks available)",
                kind,
                evaluation.subject_id,
                rubric.sections.len(),
                rubric.item_count(),
                inspect_score::output::format_marks(rubric.max_marks())
            );
            println!("Fill it in with `inspect-score fill {}`", evaluation.subject_id);
        }
        Commands::Set {
            subject,
            section,
            item,
            availability,
            quality,
            observation,
        } => {
            let patch = FieldPatch {
                availability,
                quality,
                observation,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to set: pass --availability, --quality or --observation");
            }

            let (mut evaluation, rubric) = session.open(&subject)?;
            if let Some(item_rubric) = rubric.section(&section).and_then(|s| s.item(&item)) {
                if patch.availability.is_some() && !item_rubric.mode.asks_availability() {
                    warn!("{} is scored on quality only; availability is ignored", item);
                }
                if patch.quality.is_some() && !item_rubric.mode.asks_quality() {
                    warn!("{} is scored on availability only; quality is ignored", item);
                }
            }

            evaluation.update_field(&section, &item, &patch, &rubric, session.weights)?;
            session.persist(&evaluation)?;

            let section_total = evaluation
                .section(&section)
                .map(|s| s.total_marks)
                .unwrap_or(0.0);
            let section_max = rubric.section(&section).map(|s| s.max_marks).unwrap_or(0.0);
            println!(
                "{}/{} saved. Section: {} / {}, total: {} / {}",
                section,
                item,
                inspect_score::output::format_marks(section_total),
                inspect_score::output::format_marks(section_max),
                inspect_score::output::format_marks(evaluation.total_marks),
                inspect_score::output::format_marks(rubric.max_marks())
            );
        }
        Commands::Overview {
            subject,
            strengths,
            weaknesses,
            improvement,
        } => {
            let (mut evaluation, _) = session.open(&subject)?;
            evaluation.update_overview(&OverviewPatch {
                strengths,
                weaknesses,
                improvement,
            })?;
            session.persist(&evaluation)?;
            println!("Overview saved for {}", evaluation.subject_id);
        }
        Commands::Fill { subject } => {
            let (mut evaluation, rubric) = session.open(&subject)?;
            inspect_score::wizard::run_fill_wizard(session, &mut evaluation, &rubric)?;
        }
        Commands::Show {
            subject,
            detail,
            json,
        } => {
            let (evaluation, rubric) = session.open(&subject)?;
            if json {
                let chart = inspect_score::report::chart_series(&evaluation, &rubric);
                let out = serde_json::json!({
                    "evaluation": evaluation,
                    "chart": chart,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&out).context("Failed to serialize evaluation")?
                );
            } else if detail {
                let score =
                    inspect_score::scoring::grand_total(&evaluation, &rubric, session.weights)?;
                print!(
                    "{}",
                    inspect_score::output::format_evaluation_detail(
                        &evaluation,
                        &rubric,
                        &score,
                        use_colors
                    )
                );
            } else {
                print!(
                    "{}",
                    inspect_score::output::format_section_table(&evaluation, &rubric, use_colors)
                );
            }
        }
        Commands::Submit { subject } => {
            let (mut evaluation, _) = session.open(&subject)?;
            if evaluation.is_submitted() {
                anyhow::bail!("Evaluation for '{}' has already been submitted", subject);
            }
            let api = session.config.api.as_ref().context(
                "No submission endpoint configured. Add an `api.base_url` entry to the config file",
            )?;

            let token = match inspect_score::credentials::resolve_token() {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Credential error: {:#}", e);
                    std::process::exit(EXIT_AUTH);
                }
            };

            let client = inspect_score::submit::create_client(api)?;
            let receipt =
                inspect_score::submit::submit_evaluation(&client, api, &token, &evaluation).await?;

            evaluation.mark_submitted(Utc::now())?;
            session.persist(&evaluation)?;

            match receipt.id_string() {
                Some(id) => println!("Submitted evaluation for {} (id {})", subject, id),
                None => println!("Submitted evaluation for {}", subject),
            }
        }
        Commands::Drafts { action } => match action.unwrap_or(DraftsCommand::List) {
            DraftsCommand::List => {
                let drafts = inspect_score::drafts::list_draft_summaries(&session.drafts_path)?;
                print!(
                    "{}",
                    inspect_score::output::format_draft_list(&drafts, use_colors)
                );
            }
            DraftsCommand::Remove { subject } => {
                if session.discard(&subject)? {
                    println!("Removed saved evaluation for {}", subject);
                } else {
                    println!("No saved evaluation for {}", subject);
                }
            }
            DraftsCommand::Prune { older_than } => {
                let removed =
                    inspect_score::drafts::prune_drafts(&session.drafts_path, older_than)?;
                println!(
                    "Removed {} evaluation(s) older than {}",
                    removed,
                    humantime::format_duration(older_than)
                );
            }
        },
        Commands::Rubric { kind, yaml } => {
            let rubric = session.rubric(kind)?;
            if yaml {
                let out = serde_saphyr::to_string(&rubric).context("Failed to serialize rubric")?;
                print!("{}", out);
            } else {
                print!("{}", inspect_score::output::format_rubric(&rubric, use_colors));
            }
        }
        Commands::Report { kind, json } => {
            let (evaluations, rubric) = session.evaluations_of(kind)?;
            let summary = inspect_score::report::summarize(&evaluations, &rubric);
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("Failed to serialize report")?
                );
            } else {
                print!("{}", inspect_score::output::format_summary(&summary, use_colors));
            }
        }
        Commands::Init => unreachable!("handled before config is loaded"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_submit_errors() {
        let auth = anyhow::Error::from(SubmitError::Auth(401)).context("Submitting school-1");
        assert_eq!(exit_code_for(&auth), EXIT_AUTH);

        let server = anyhow::Error::from(SubmitError::Server(503, String::new()));
        assert_eq!(exit_code_for(&server), EXIT_NETWORK);

        let rejected = anyhow::Error::from(SubmitError::Rejected(422, String::new()));
        assert_eq!(exit_code_for(&rejected), EXIT_NETWORK);

        let config = anyhow::anyhow!("Config file not found");
        assert_eq!(exit_code_for(&config), EXIT_CONFIG);
    }
}
