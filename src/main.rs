//! noteblaster CLI: study a document, replay saved content, inspect scores.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use noteblaster::config::{Config, Provider};
use noteblaster::leaderboard::LeaderboardStore;
use noteblaster::model::{GameKind, StudyContent};
use noteblaster::paths::AppPaths;
use noteblaster::session::Session;
use noteblaster::tui::NoteBlasterTui;
use noteblaster::tui::widgets::{NO_NOTES, format_date};
use noteblaster::upload::ACCEPTED_FILES;

#[derive(Parser)]
#[command(
    name = "noteblaster",
    version,
    about = "Turn documents into study notes and quiz games"
)]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/noteblaster/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model backend, overriding the config file.
    #[arg(long, global = true, value_enum)]
    provider: Option<Provider>,

    /// Model name for the selected provider.
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate study content from a document and open the games.
    Study {
        /// Document to study (.pdf, .docx or .txt, at most 10MB).
        file: PathBuf,
    },

    /// Open the games on previously generated content.
    Play {
        /// JSON written by `noteblaster generate`.
        #[arg(long)]
        content: PathBuf,
    },

    /// Generate study content and write it as JSON.
    Generate {
        /// Document to process.
        file: PathBuf,

        /// Output file; prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the study notes for a document or saved content.
    Notes {
        /// Document to process.
        #[arg(required_unless_present = "content")]
        file: Option<PathBuf>,

        /// Saved content JSON instead of a document.
        #[arg(long, conflicts_with = "file")]
        content: Option<PathBuf>,
    },

    /// Show or clear the leaderboards.
    Leaderboard {
        /// Only this game (shooting, flashcard, typing, matching).
        #[arg(long)]
        game: Option<GameKind>,

        /// Remove the stored scores.
        #[arg(long)]
        clear: bool,
    },
}

impl Commands {
    fn opens_tui(&self) -> bool {
        matches!(self, Commands::Study { .. } | Commands::Play { .. })
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    let cli = Cli::parse();
    let paths = AppPaths::resolve()?;
    init_logging(&paths, cli.command.opens_tui());

    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let mut config = Config::load(&config_path)?;
    if let Some(provider) = cli.provider {
        config.provider = provider;
    }
    if let Some(model) = cli.model {
        match config.provider {
            Provider::Gemini => config.gemini.model = model,
            Provider::Ollama => config.ollama.model = model,
        }
    }
    tracing::debug!(config = %config_path.display(), provider = ?config.provider, "configuration loaded");

    match cli.command {
        Commands::Study { file } => {
            let content = process(&config, &file)?;
            let mut tui = NoteBlasterTui::new(
                display_name(&file),
                content,
                LeaderboardStore::open(&paths.leaderboard_file()),
            );
            tui.run()?;
        }

        Commands::Play { content } => {
            let study = StudyContent::load(&content)?;
            let mut tui = NoteBlasterTui::new(
                display_name(&content),
                study,
                LeaderboardStore::open(&paths.leaderboard_file()),
            );
            tui.run()?;
        }

        Commands::Generate { file, out } => {
            let content = process(&config, &file)?;
            match out {
                Some(out) => {
                    content.save(&out)?;
                    println!(
                        "Wrote {} notes, {} questions and {} fill-in-the-blank questions to {}",
                        content.note_count(),
                        content.question_count(),
                        content.fill_in_the_blank_count(),
                        out.display()
                    );
                }
                None => {
                    let json = serde_json::to_string_pretty(&content).into_diagnostic()?;
                    println!("{json}");
                }
            }
        }

        Commands::Notes { file, content } => {
            let study = match (content, file) {
                (Some(saved), _) => StudyContent::load(&saved)?,
                (None, Some(file)) => process(&config, &file)?,
                (None, None) => miette::bail!("Provide a document or --content <JSON>."),
            };
            if study.notes.is_empty() {
                println!("{NO_NOTES}");
            }
            for note in &study.notes {
                println!("  • {note}");
            }
        }

        Commands::Leaderboard { game, clear } => {
            let mut store = LeaderboardStore::open(&paths.leaderboard_file());
            let kinds = match game {
                Some(kind) => vec![kind],
                None => GameKind::ALL.to_vec(),
            };
            for kind in kinds {
                if clear {
                    store.clear(kind)?;
                    println!("Cleared {}", kind.title());
                    continue;
                }
                let board = store.load(kind);
                println!("{}:", kind.title());
                if board.is_empty() {
                    println!("  (no scores yet)");
                }
                for (i, entry) in board.entries().iter().enumerate() {
                    println!("  {}. {:>5}  {}", i + 1, entry.score, format_date(&entry.date));
                }
            }
        }
    }

    Ok(())
}

/// Run the upload → extract → generate pipeline for one file.
fn process(config: &Config, file: &Path) -> Result<StudyContent> {
    let generator = config.generator()?;
    let mut session = Session::new(generator, config.limits.clone());
    eprintln!("Processing {} (accepted: {ACCEPTED_FILES})...", file.display());
    let content = session.process_file(file)?;
    Ok(content.clone())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Log to stderr, or to the state-dir log file while the TUI owns the terminal.
fn init_logging(paths: &AppPaths, to_file: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if to_file {
        let file = paths.ensure_dirs().ok().and_then(|()| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(paths.log_file())
                .ok()
        });
        if let Some(file) = file {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
            return;
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
