//! Terminal runner for trialflow sessions.
//!
//! Stands in for the external rendering layer: it only reads participant
//! actions and switches on the outcomes the core returns. All session rules
//! live in `trialflow-core`; all delivery plumbing in `trialflow-runtime`.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use trialflow_core::{
    AdvanceOutcome, BlockReason, CaseCatalog, Choice, ModalAction, Session, Step,
    CALIBRATION_TEXT,
};
use trialflow_runtime::{EventLogger, LoggerConfig};

#[derive(Parser)]
#[command(name = "trialflow", version, about = "Vignette-based reliance study runner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an interactive study session
    Run {
        /// Catalog file (YAML or JSON)
        #[arg(long, default_value = "cases/demo.yaml")]
        catalog: PathBuf,

        /// Participant identifier
        #[arg(long)]
        participant: String,

        /// Logging endpoint URL (defaults to TRIALFLOW_SINK_URL)
        #[arg(long)]
        sink_url: Option<String>,
    },

    /// Validate a catalog file and report its shape
    Check {
        /// Catalog file (YAML or JSON)
        #[arg(long)]
        catalog: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            catalog,
            participant,
            sink_url,
        } => run_session(&catalog, &participant, sink_url),
        Command::Check { catalog } => check_catalog(&catalog),
    }
}

fn load_catalog(path: &Path) -> Result<CaseCatalog> {
    let catalog = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => CaseCatalog::from_json_file(path),
        _ => CaseCatalog::from_yaml_file(path),
    };
    catalog.with_context(|| format!("failed to load catalog {}", path.display()))
}

fn check_catalog(path: &Path) -> Result<()> {
    let catalog = load_catalog(path)?;
    println!("catalog ok: {} ({} cases)", catalog.name, catalog.len());
    for case in catalog.iter() {
        println!("  {} (aiConfidence {})", case.id, case.ai_confidence);
    }
    Ok(())
}

fn run_session(path: &Path, participant: &str, sink_url: Option<String>) -> Result<()> {
    let catalog = Arc::new(load_catalog(path)?);

    let config = match sink_url {
        Some(url) => LoggerConfig::new(url),
        None => LoggerConfig::from_env(),
    };
    if !config.is_enabled() {
        tracing::info!("no logging endpoint configured; delivery disabled");
    }
    let logger = Arc::new(EventLogger::from_config(&config));

    let mut session = Session::new(catalog.clone(), participant).with_observer(logger.clone());

    println!("Welcome to the reliance study.");
    println!("You'll review brief radiology case vignettes. This is not medical advice.");
    prompt_line("Press Enter to consent and begin")?;
    if !session.start_onboarding() {
        println!("A non-blank participant id is required.");
        return Ok(());
    }

    println!("\n--- Calibration ---\n{CALIBRATION_TEXT}\n");
    prompt_line("Press Enter to continue")?;
    session.start_trials();

    while session.step() == Step::Trial {
        run_trial(&mut session, &catalog)?;
    }

    println!("\nAll set - thank you!");
    if let Some(export) = session.export_json() {
        println!("{export}");
    }
    Ok(())
}

fn run_trial(session: &mut Session, catalog: &CaseCatalog) -> Result<()> {
    {
        let Some(case) = session.current_case() else {
            return Ok(());
        };
        println!(
            "\n=== Case {} / {} ({}% done) ===",
            session.trial_index() + 1,
            catalog.len(),
            (session.progress() * 100.0).round()
        );
        println!("Patient / Study: {}", case.case_text);
        if let Some(url) = &case.image_url {
            println!("Study image: {url}");
        }
    }

    loop {
        let line = prompt_line(
            "[reveal | note <text> | choose <radiologist|ai> | conf <0-100> | next]",
        )?;
        let line = line.trim();
        let (command, rest) = match line.split_once(' ') {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        match command {
            "reveal" => {
                session.reveal_finding();
                if let Some(case) = session.current_case() {
                    println!("RadAI: {}", case.ai_text);
                    println!(
                        "Confidence {}% (confidence is not correctness)",
                        case.ai_confidence
                    );
                }
            }
            "note" => session.set_note(rest),
            "choose" => match rest {
                "radiologist" => session.set_choice(Choice::Radiologist),
                "ai" => session.set_choice(Choice::Ai),
                _ => println!("choose radiologist or ai"),
            },
            "conf" => match rest.parse::<i64>() {
                Ok(value) => session.set_confidence(value.clamp(0, 100) as u8),
                Err(_) => println!("conf takes a number from 0 to 100"),
            },
            "next" => match session.attempt_advance() {
                AdvanceOutcome::Unavailable => {
                    println!("Select a reliance choice before moving on.");
                }
                AdvanceOutcome::Warned(warning) => {
                    let index_before = session.trial_index();
                    resolve_modal(session, warning.reason)?;
                    if session.step() != Step::Trial || session.trial_index() != index_before {
                        // Trial committed; show the next case header.
                        return Ok(());
                    }
                }
                AdvanceOutcome::Committed { .. } | AdvanceOutcome::Finished => return Ok(()),
                AdvanceOutcome::Dismissed => {}
            },
            "" => {}
            _ => println!("unknown command"),
        }

        if session.step() != Step::Trial {
            return Ok(());
        }
    }
}

fn resolve_modal(session: &mut Session, reason: BlockReason) -> Result<()> {
    println!("\n--- Before you continue ---");
    match reason {
        BlockReason::FindingHidden => {
            println!("You haven't viewed the AI result yet. It may disagree with your impression.");
            println!("  1) Reveal the AI finding");
        }
        BlockReason::NoteDivergence => {
            println!("Your note appears to differ from the AI finding.");
        }
    }
    println!("  2) Keep editing");
    println!("  3) Continue anyway");

    loop {
        let line = prompt_line("Choose an option")?;
        let action = match line.trim() {
            "1" if reason == BlockReason::FindingHidden => ModalAction::RevealFinding,
            "2" => ModalAction::KeepEditing,
            "3" => ModalAction::ContinueAnyway,
            _ => {
                println!("pick one of the listed options");
                continue;
            }
        };

        match session.resolve_warning(action) {
            AdvanceOutcome::Dismissed => {
                if action == ModalAction::RevealFinding {
                    if let Some(case) = session.current_case() {
                        println!("RadAI: {}", case.ai_text);
                    }
                }
                return Ok(());
            }
            AdvanceOutcome::Committed { .. } | AdvanceOutcome::Finished => return Ok(()),
            _ => continue,
        }
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt} > ");
    io::stdout().flush().context("failed to flush stdout")?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read stdin")?;
    Ok(line)
}
