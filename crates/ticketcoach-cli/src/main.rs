use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod render;

use render::{render_pattern_snapshot, render_result, render_roi};
use ticketcoach_core::{
    compute_roi, load_config, mock_ticket_payload, normalize_ticket, sample, CoachingSession,
    RoiInputs, SAMPLE_TICKETS,
};
use ticketcoach_schema::{EvaluationResult, TicketPayload};

#[derive(Parser)]
#[command(
    name = "ticketcoach",
    version,
    about = "Support ticket QA coach: scores agent replies, spots content gaps, drafts KB articles"
)]
struct Cli {
    #[arg(
        long,
        default_value = ".",
        help = "Config root directory (contains config/ and logs/)"
    )]
    config_root: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Validate config files")]
    Validate,
    #[command(about = "List the built-in sample tickets")]
    Samples,
    #[command(about = "Print the transcript for a helpdesk ticket JSON export")]
    Normalize {
        #[arg(required_unless_present = "mock", help = "Ticket payload JSON file")]
        file: Option<PathBuf>,
        #[arg(long, conflicts_with = "file", help = "Use the built-in billing ticket export")]
        mock: bool,
    },
    #[command(about = "Evaluate one ticket (reads stdin when no --file or --sample)")]
    Evaluate {
        #[arg(long, conflicts_with = "sample", help = "Transcript text file or ticket JSON export")]
        file: Option<PathBuf>,
        #[arg(long, help = "Built-in sample key or label (see `samples`)")]
        sample: Option<String>,
        #[arg(long, help = "Label recorded with the coaching item")]
        label: Option<String>,
        #[arg(long, help = "Print the raw evaluation as JSON")]
        json: bool,
        #[arg(long, help = "Draft a KB article when the ticket shows a content gap")]
        kb: bool,
    },
    #[command(about = "Evaluate several tickets in one session and summarise the patterns")]
    Batch {
        #[arg(long, help = "Include every built-in sample ticket")]
        samples: bool,
        #[arg(help = "Transcript text files or ticket JSON exports")]
        files: Vec<PathBuf>,
        #[arg(long, help = "Generate the team-wide coaching document")]
        insights: bool,
        #[arg(long, help = "Draft KB articles for content-gap tickets")]
        kb: bool,
    },
    #[command(about = "Estimate annual impact of better coaching and docs")]
    Roi(RoiArgs),
}

#[derive(Args, Default)]
struct RoiArgs {
    #[arg(long, help = "Monthly ticket volume [default: 800]")]
    monthly_tickets: Option<u64>,
    #[arg(long, help = "Average fully-loaded cost per handled case [default: 35]")]
    avg_cost_per_case: Option<f64>,
    #[arg(long, help = "Current self-serve / deflection rate in % [default: 20]")]
    current_deflection: Option<f64>,
    #[arg(long, help = "Expected uplift in deflection in % [default: 5]")]
    deflection_uplift: Option<f64>,
    #[arg(long, help = "High-risk / strategic tickets per month [default: 20]")]
    high_risk_tickets: Option<u64>,
    #[arg(long, help = "Average annual revenue per strategic account [default: 50000]")]
    revenue_per_account: Option<f64>,
    #[arg(long, help = "Churn probability on those tickets today in % [default: 10]")]
    churn_without: Option<f64>,
    #[arg(long, help = "Churn probability after better QA / docs in % [default: 5]")]
    churn_with: Option<f64>,
}

impl RoiArgs {
    fn into_inputs(self) -> RoiInputs {
        let defaults = RoiInputs::default();
        RoiInputs {
            monthly_tickets: self.monthly_tickets.unwrap_or(defaults.monthly_tickets),
            avg_cost_per_case: self.avg_cost_per_case.unwrap_or(defaults.avg_cost_per_case),
            current_deflection_pct: self
                .current_deflection
                .unwrap_or(defaults.current_deflection_pct),
            expected_deflection_uplift_pct: self
                .deflection_uplift
                .unwrap_or(defaults.expected_deflection_uplift_pct),
            high_risk_tickets_per_month: self
                .high_risk_tickets
                .unwrap_or(defaults.high_risk_tickets_per_month),
            revenue_per_strategic_account: self
                .revenue_per_account
                .unwrap_or(defaults.revenue_per_strategic_account),
            churn_prob_without_pct: self.churn_without.unwrap_or(defaults.churn_prob_without_pct),
            churn_prob_with_pct: self.churn_with.unwrap_or(defaults.churn_prob_with_pct),
        }
    }
}

/// A ticket to evaluate, with the label its coaching item is recorded under.
struct TicketInput {
    label: String,
    transcript: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = cli.config_root.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log dir: {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "ticketcoach.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Validate => {
            let config = load_config(&cli.config_root.join("config"))?;
            println!(
                "Config valid. provider {} ({:?}), evaluation model {}, generation model {}.",
                config.provider.id,
                config.provider.provider_type,
                config.evaluation.model,
                config.generation_model()
            );
        }
        Commands::Samples => {
            for ticket in &SAMPLE_TICKETS {
                println!("{:<14} {}", ticket.key, ticket.label);
            }
        }
        Commands::Normalize { file, mock } => {
            let payload = match file {
                Some(path) if !mock => read_payload(&path)?,
                _ => mock_ticket_payload(),
            };
            println!("{}", normalize_ticket(&payload));
        }
        Commands::Evaluate {
            file,
            sample: sample_name,
            label,
            json,
            kb,
        } => {
            let mut ticket = match (file, sample_name) {
                (Some(path), _) => read_ticket(&path)?,
                (None, Some(name)) => sample_ticket(&name)?,
                (None, None) => read_stdin_ticket()?,
            };
            if let Some(label) = label {
                ticket.label = label;
            }
            let session = open_session(&cli.config_root)?;
            evaluate_one(&session, &ticket, json, kb).await?;
        }
        Commands::Batch {
            samples,
            files,
            insights,
            kb,
        } => {
            let mut tickets = Vec::new();
            if samples {
                tickets.extend(SAMPLE_TICKETS.iter().map(|s| TicketInput {
                    label: s.label.to_string(),
                    transcript: s.transcript.to_string(),
                }));
            }
            for path in &files {
                tickets.push(read_ticket(path)?);
            }
            if tickets.is_empty() {
                return Err(anyhow!("nothing to evaluate; pass ticket files or --samples"));
            }
            let session = open_session(&cli.config_root)?;
            run_batch(&session, &tickets, insights, kb)
                .await?
                .into_result(tickets.len())?;
        }
        Commands::Roi(args) => {
            let report = compute_roi(&args.into_inputs())?;
            print!("{}", render_roi(&report));
        }
    }

    Ok(())
}

fn open_session(config_root: &Path) -> Result<CoachingSession> {
    let config = load_config(&config_root.join("config"))?;
    tracing::info!(
        provider = %config.provider.id,
        model = %config.evaluation.model,
        "coaching session ready"
    );
    CoachingSession::from_config(&config)
}

async fn evaluate_one(
    session: &CoachingSession,
    ticket: &TicketInput,
    json: bool,
    kb: bool,
) -> Result<()> {
    let result = session.evaluate(&ticket.label, &ticket.transcript).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_result(&result));
    }
    if kb {
        draft_if_gap(session, &result).await?;
    }
    Ok(())
}

async fn draft_if_gap(session: &CoachingSession, result: &EvaluationResult) -> Result<()> {
    if !result.is_well_formed() {
        return Ok(());
    }
    match session.kb_opportunity().await {
        Some(suggestion) => {
            tracing::info!(suggestion = %suggestion, "drafting kb article");
            let article = session.draft_kb_article().await?;
            println!("\n--- KB article draft ---\n{}", article.trim_end());
        }
        None => println!("\nNo KB article needed: no content gap was identified."),
    }
    Ok(())
}

/// Per-ticket failures a batch run kept going past.
#[derive(Debug, Default, PartialEq, Eq)]
struct BatchReport {
    evaluation_failures: usize,
    kb_failures: usize,
}

impl BatchReport {
    fn into_result(self, total: usize) -> Result<()> {
        match (self.evaluation_failures, self.kb_failures) {
            (0, 0) => Ok(()),
            (evals, 0) => Err(anyhow!("{evals} of {total} evaluations could not reach the model")),
            (0, kb) => Err(anyhow!("{kb} of {total} KB drafts failed")),
            (evals, kb) => Err(anyhow!(
                "{evals} of {total} evaluations could not reach the model; {kb} KB drafts failed"
            )),
        }
    }
}

async fn run_batch(
    session: &CoachingSession,
    tickets: &[TicketInput],
    insights: bool,
    kb: bool,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    for ticket in tickets {
        println!("=== {} ===", ticket.label);
        match session.evaluate(&ticket.label, &ticket.transcript).await {
            Ok(result) => {
                print!("{}", render_result(&result));
                if kb {
                    if let Err(err) = draft_if_gap(session, &result).await {
                        report.kb_failures += 1;
                        tracing::error!(label = %ticket.label, "kb draft failed: {err:#}");
                        println!("\nkb draft failed: {err:#}");
                    }
                }
            }
            Err(err) => {
                report.evaluation_failures += 1;
                tracing::error!(label = %ticket.label, "evaluation failed: {err:#}");
                println!("evaluation failed: {err:#}");
            }
        }
        println!();
    }

    let snapshot = session.history().pattern_snapshot().await;
    print!("{}", render_pattern_snapshot(&snapshot));

    if insights {
        if snapshot.total == 0 {
            println!("\nNo coaching items to roll up; skipping team insights.");
        } else {
            let document = session.team_insights().await?;
            println!("\n--- Team-wide coaching document ---\n{}", document.trim_end());
        }
    }

    Ok(report)
}

fn sample_ticket(name: &str) -> Result<TicketInput> {
    let ticket = sample(name).ok_or_else(|| {
        let keys = SAMPLE_TICKETS
            .iter()
            .map(|s| s.key)
            .collect::<Vec<_>>()
            .join(", ");
        anyhow!("unknown sample {name:?}; available: {keys}")
    })?;
    Ok(TicketInput {
        label: ticket.label.to_string(),
        transcript: ticket.transcript.to_string(),
    })
}

fn read_payload(path: &Path) -> Result<TicketPayload> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ticket file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse ticket payload: {}", path.display()))
}

/// `.json` files are helpdesk exports; anything else is a plain transcript.
fn read_ticket(path: &Path) -> Result<TicketInput> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let transcript = if is_json {
        normalize_ticket(&read_payload(path)?)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ticket file: {}", path.display()))?
    };
    let label = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(TicketInput { label, transcript })
}

fn read_stdin_ticket() -> Result<TicketInput> {
    let mut transcript = String::new();
    std::io::stdin()
        .read_to_string(&mut transcript)
        .context("failed to read ticket from stdin")?;
    Ok(TicketInput {
        label: String::new(),
        transcript,
    })
}
