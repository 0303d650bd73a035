//! NoteGraph command-line entry point.
//!
//! # Responsibility
//! - Drive note CRUD, chat echo and note analysis from a terminal.
//! - Print analysis results as JSON for scripting.

use clap::{Parser, Subcommand};
use notegraph_core::db::open_db;
use notegraph_core::{
    analyze, chat_reply, core_version, init_logging, note_id_text, parse_note_id, ping,
    resolve_db_path, Note, NoteDraft, NoteService, SqliteNoteRepository,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "notegraph")]
#[command(about = "Local notes with goal/task plan extraction")]
#[command(version)]
struct Cli {
    /// SQLite database path (defaults to NOTEGRAPH_DB_PATH or the temp dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print core linkage information
    Ping,
    /// Note store operations
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },
    /// Canned chat reply
    Chat {
        message: Vec<String>,
    },
    /// Turn a note into summary, goals, tasks and a diagram
    Analyze {
        /// Analyze a stored note by id
        #[arg(long, conflicts_with_all = ["title", "content", "file"])]
        id: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read the note body from a file
        #[arg(long)]
        file: Option<PathBuf>,
        /// Print only the diagram text
        #[arg(long)]
        diagram_only: bool,
    },
}

#[derive(Subcommand, Debug)]
enum NoteAction {
    /// Create a note
    Add {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Show one note
    Get { id: String },
    /// Replace a note's title, content and tags
    Edit {
        id: String,
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Delete a note
    Rm { id: String },
    /// List notes, most recently updated first
    Ls {
        #[arg(long, short)]
        query: Option<String>,
        #[arg(long, short)]
        tag: Option<String>,
    },
    /// List tags in use
    Tags,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(&cli.log_level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    let db_path = cli.db.clone().unwrap_or_else(resolve_db_path);
    match run(cli.command, db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, db_path: PathBuf) -> Result<(), String> {
    match command {
        Commands::Ping => {
            println!("notegraph_core ping={}", ping());
            println!("notegraph_core version={}", core_version());
            Ok(())
        }
        Commands::Chat { message } => {
            println!("{}", chat_reply(&message.join(" ")));
            Ok(())
        }
        Commands::Note { action } => run_note(action, &db_path),
        Commands::Analyze {
            id,
            title,
            content,
            file,
            diagram_only,
        } => {
            let (title, content) = match id {
                Some(id) => {
                    let note = with_service(&db_path, |service| {
                        service.get_note(parse_id(&id)?).map_err(|err| err.to_string())
                    })?;
                    (note.title, note.content)
                }
                None => {
                    let content = match file {
                        Some(path) => std::fs::read_to_string(&path)
                            .map_err(|err| format!("cannot read {}: {err}", path.display()))?,
                        None => content.unwrap_or_default(),
                    };
                    (title.unwrap_or_default(), content)
                }
            };

            let result = analyze(&title, &content);
            if diagram_only {
                println!("{}", result.diagram);
            } else {
                let json = serde_json::to_string_pretty(&result).map_err(|err| err.to_string())?;
                println!("{json}");
            }
            Ok(())
        }
    }
}

fn run_note(action: NoteAction, db_path: &Path) -> Result<(), String> {
    match action {
        NoteAction::Add {
            title,
            content,
            tags,
        } => {
            let note = with_service(db_path, |service| {
                service
                    .create_note(NoteDraft::new(title, content).with_tags(tags))
                    .map_err(|err| err.to_string())
            })?;
            println!("{}", note_id_text(note.id));
        }
        NoteAction::Get { id } => {
            let note = with_service(db_path, |service| {
                service.get_note(parse_id(&id)?).map_err(|err| err.to_string())
            })?;
            print_note_json(&note)?;
        }
        NoteAction::Edit {
            id,
            title,
            content,
            tags,
        } => {
            let note = with_service(db_path, |service| {
                service
                    .update_note(parse_id(&id)?, NoteDraft::new(title, content).with_tags(tags))
                    .map_err(|err| err.to_string())
            })?;
            print_note_json(&note)?;
        }
        NoteAction::Rm { id } => {
            with_service(db_path, |service| {
                service.delete_note(parse_id(&id)?).map_err(|err| err.to_string())
            })?;
            println!("deleted {id}");
        }
        NoteAction::Ls { query, tag } => {
            let notes = with_service(db_path, |service| {
                service.list_notes(query, tag).map_err(|err| err.to_string())
            })?;
            for note in notes {
                let tags = if note.tags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", note.tags.join(", "))
                };
                println!("{}  {}{tags}", note_id_text(note.id), note.title);
            }
        }
        NoteAction::Tags => {
            let tags = with_service(db_path, |service| {
                service.list_tags().map_err(|err| err.to_string())
            })?;
            for tag in tags {
                println!("{tag}");
            }
        }
    }
    Ok(())
}

fn parse_id(raw: &str) -> Result<notegraph_core::NoteId, String> {
    parse_note_id(raw).ok_or_else(|| format!("note not found: {raw}"))
}

fn print_note_json(note: &Note) -> Result<(), String> {
    let json = serde_json::to_string_pretty(note).map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}

fn with_service<T>(
    db_path: &Path,
    f: impl FnOnce(&mut NoteService<SqliteNoteRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let mut conn = open_db(db_path).map_err(|err| format!("cannot open note store: {err}"))?;
    let repo = SqliteNoteRepository::try_new(&mut conn).map_err(|err| err.to_string())?;
    let mut service = NoteService::new(repo);
    f(&mut service)
}
