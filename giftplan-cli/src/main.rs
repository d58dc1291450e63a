mod backend;
mod common;
mod reports;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use backend::create_file_engine;
use common::{parse_gift_key, parse_ids};
use giftplan_core::{CommitOutcome, GiftKey, PlannerConfig, PlannerSession};
use reports::{PreviewRow, Report, ReportFormat, StatusReport, write_report};

#[derive(Debug, Parser)]
#[command(name = "giftplan", version)]
#[command(about = "Plan gift assignments and simulate bond progress")]
struct Args {
    /// Directory holding the reference data assets
    #[arg(long, global = true, default_value = "data")]
    data: PathBuf,

    /// Directory holding saved planner slots
    #[arg(long, global = true, default_value = ".giftplan")]
    state: PathBuf,

    /// Saved slot to operate on
    #[arg(long, global = true, default_value = "default")]
    slot: String,

    /// Planner config file (overrides planner.json in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Locale override for reference data
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Output report format
    #[arg(long, global = true, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze every gift against the selected characters
    Analyze {
        /// Only list the top-valued characters per gift
        #[arg(long)]
        optimal: bool,
    },
    /// Preview bond progress for tentative assignments
    Preview {
        #[arg(long)]
        character: Option<u32>,
    },
    /// Tentatively assign gifts to a character (clamped to what is available)
    Assign {
        character: u32,
        #[arg(value_parser = parse_gift_key)]
        gift: GiftKey,
        qty: u32,
    },
    /// Clear tentative assignments
    Unassign {
        #[arg(long)]
        character: Option<u32>,
    },
    /// Apply every preview and consume the assigned gifts
    Commit,
    /// Show or edit an owned gift quantity
    Stock {
        #[arg(value_parser = parse_gift_key)]
        gift: GiftKey,
        /// Set the owned quantity
        #[arg(conflicts_with_all = ["add", "remove"])]
        qty: Option<u32>,
        #[arg(long, conflicts_with = "remove")]
        add: Option<u32>,
        #[arg(long)]
        remove: Option<u32>,
    },
    /// Set a character's stored bond level and exp
    Bond { character: u32, level: u32, exp: u32 },
    /// Convert synthesis gifts into choice boxes in pairs
    Synthesize,
    /// Toggle characters in the selection (comma-separated ids)
    Select {
        ids: Option<String>,
        #[arg(long, conflicts_with = "ids")]
        reset: bool,
    },
    /// Print the share token for the current selection
    Share,
    /// Replace the selection with a share token's contents
    Open { token: String },
    /// Show inventory, selection, assignments and bonds
    Status,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    run(&args)
}

fn run(args: &Args) -> Result<()> {
    if args.verbose && args.report == ReportFormat::Console && args.output.is_none() {
        announce_banner(args);
    }

    let engine = create_file_engine(&args.data, &args.state);
    let config = load_config(args, &engine)?;
    let mut session = engine
        .open_session(&args.slot, config)
        .with_context(|| format!("failed to open slot {}", args.slot))?;

    let (report, mutated) = dispatch(&args.command, &mut session)?;

    if mutated {
        engine
            .save_session(&args.slot, &session)
            .with_context(|| format!("failed to save slot {}", args.slot))?;
    }

    let mut output_target = OutputTarget::new(args.output.clone())?;
    write_report(&mut output_target, args.report, &report)?;
    output_target.flush_inner()?;
    Ok(())
}

fn announce_banner(args: &Args) {
    println!("{}", "🎁 Gift Planner".bright_cyan().bold());
    println!("{}", "================".cyan());
    println!(
        "data: {}  state: {}  slot: {}",
        args.data.display(),
        args.state.display(),
        args.slot.yellow()
    );
}

fn load_config(
    args: &Args,
    engine: &giftplan_core::PlannerEngine<backend::AssetLoader, backend::FileStorage>,
) -> Result<PlannerConfig> {
    let mut config = if let Some(path) = &args.config {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        PlannerConfig::from_json(&json)
            .with_context(|| format!("failed to parse {}", path.display()))?
    } else {
        engine.load_config()?
    };
    if let Some(locale) = &args.locale {
        config.locale.clone_from(locale);
    }
    config.validate()?;
    Ok(config)
}

fn preview_row(session: &PlannerSession, character_id: u32) -> PreviewRow {
    PreviewRow {
        character_id,
        name: session
            .reference()
            .character(character_id)
            .map(|c| c.name.clone())
            .unwrap_or_default(),
        gifts: session
            .planner()
            .character_assignments(character_id)
            .cloned()
            .unwrap_or_default(),
        preview: session.preview(character_id),
    }
}

fn selection_report(session: &PlannerSession) -> Report {
    Report::Selection {
        selected: session.selection().ids().to_vec(),
        token: session.share_token(),
    }
}

/// Run one subcommand, returning its report and whether the slot changed.
fn dispatch(command: &Command, session: &mut PlannerSession) -> Result<(Report, bool)> {
    let outcome = match command {
        Command::Analyze { optimal } => {
            if *optimal {
                session.set_show_only_optimal(true);
            }
            let report = Report::Analysis {
                selected: session.selection().ids().to_vec(),
                gifts: session.analyzed_gifts(),
            };
            (report, false)
        }
        Command::Preview { character } => {
            let ids: Vec<u32> = match character {
                Some(id) => vec![*id],
                None => session.planner().assignments().keys().copied().collect(),
            };
            let previews = ids.into_iter().map(|id| preview_row(session, id)).collect();
            (Report::Previews { previews }, false)
        }
        Command::Assign {
            character,
            gift,
            qty,
        } => {
            if session.reference().character(*character).is_none() {
                bail!("unknown character {character}");
            }
            if !session.selection().contains(*character) {
                bail!("character {character} is not selected; run `giftplan select {character}` first");
            }
            let applied = session.set_assignment(*character, *gift, *qty);
            let report = Report::Assignment {
                character_id: *character,
                gift: *gift,
                requested: *qty,
                applied,
            };
            (report, true)
        }
        Command::Unassign { character } => {
            match character {
                Some(id) => session.planner_mut().clear_character_assignments(*id),
                None => session.planner_mut().clear_assignments(),
            }
            (
                Report::Unassigned {
                    character_id: *character,
                },
                true,
            )
        }
        Command::Commit => {
            let outcome = session.commit();
            let mutated = matches!(outcome, CommitOutcome::Applied(_));
            (Report::Commit { outcome }, mutated)
        }
        Command::Stock {
            gift,
            qty,
            add,
            remove,
        } => {
            let planner = session.planner_mut();
            let owned = planner.owned(*gift);
            let target = match (qty, add, remove) {
                (Some(qty), _, _) => Some(*qty),
                (None, Some(n), _) => Some(owned.saturating_add(*n)),
                (None, None, Some(n)) => Some(owned.saturating_sub(*n)),
                (None, None, None) => None,
            };
            if let Some(target) = target {
                planner.set_owned_quantity(*gift, target);
            }
            let report = Report::Stock {
                gift: *gift,
                owned: planner.owned(*gift),
                assigned: planner.total_assigned(*gift),
            };
            (report, target.is_some())
        }
        Command::Bond {
            character,
            level,
            exp,
        } => {
            let state = session
                .planner_mut()
                .set_bond_state(*character, *level, *exp);
            let report = Report::Bond {
                character_id: *character,
                state,
            };
            (report, true)
        }
        Command::Synthesize => {
            let outcome = session.convert_synthesis_gifts();
            (Report::Synthesis { outcome }, outcome.is_some())
        }
        Command::Select { ids, reset } => {
            if *reset {
                session.reset_selection();
            } else if let Some(ids) = ids {
                for id in parse_ids(ids)? {
                    if session.reference().character(id).is_none() {
                        eprintln!("⚠️  Unknown character: {}", id.to_string().yellow());
                        continue;
                    }
                    session.toggle_character(id);
                }
            }
            let mutated = *reset || ids.is_some();
            (selection_report(session), mutated)
        }
        Command::Share => (selection_report(session), false),
        Command::Open { token } => {
            if token.trim().is_empty() {
                bail!("share token is empty");
            }
            session
                .open_share_param(Some(token.clone()))
                .context("invalid share token; selection kept")?;
            (selection_report(session), true)
        }
        Command::Status => {
            let planner = session.planner();
            let status = StatusReport {
                locale: session.config().locale.clone(),
                owned: planner.inventory().iter().collect(),
                selected: session.selection().ids().to_vec(),
                assignments: planner.assignments().clone(),
                bonds: planner.bonds().clone(),
                share_token: session.share_token(),
            };
            (Report::Status(status), false)
        }
    };
    Ok(outcome)
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
