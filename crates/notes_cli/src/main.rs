//! Command-line driver for `notes_core`.
//!
//! # Responsibility
//! - Exercise the controller list/edit flow against the configured database.
//! - Keep output deterministic for quick local sanity checks.

use clap::{Parser, Subcommand};
use log::error;
use notes_core::{
    now_epoch_ms, Navigation, Note, NoteId, NotesConfig, NotesController, SqliteNoteStore,
    StoreError,
};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "notes", version, about = "Local note store driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core health and version.
    Ping,
    /// List all notes.
    List,
    /// Create a note.
    Add { title: String, text: String },
    /// Replace title and text of an existing note.
    Edit { id: NoteId, title: String, text: String },
    /// Delete a note.
    Delete { id: NoteId },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = NotesConfig::from_env();
    if let Err(err) = config.init_logging() {
        eprintln!("logging disabled: {err}");
    }

    if let Command::Ping = cli.command {
        println!("notes_core ping={}", notes_core::ping());
        println!("notes_core version={}", notes_core::core_version());
        return ExitCode::SUCCESS;
    }

    let store = match SqliteNoteStore::open(&config.db_path).await {
        Ok(store) => store,
        Err(err) => {
            eprintln!("failed to open {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let mut controller = NotesController::init(store.clone(), None).await;
    let outcome = run(&mut controller, cli.command).await;
    drop(controller);

    if let Err(err) = store.close().await {
        error!("event=cli_exit module=cli status=error error={err}");
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    controller: &mut NotesController<SqliteNoteStore>,
    command: Command,
) -> Result<(), StoreError> {
    if let Some(err) = controller.last_error() {
        return Err(StoreError::StorageUnavailable(err.to_string()));
    }

    match command {
        Command::Ping => {}
        Command::List => print_notes(controller.notes()),
        Command::Add { title, text } => {
            controller.begin_create();
            finish_edit(controller, title, text).await?;
        }
        Command::Edit { id, title, text } => {
            let note = find_note(controller, id)?;
            controller.begin_edit(note);
            finish_edit(controller, title, text).await?;
        }
        Command::Delete { id } => {
            let note = find_note(controller, id)?;
            controller.delete(&note).await?;
            print_notes(controller.notes());
        }
    }

    Ok(())
}

async fn finish_edit(
    controller: &mut NotesController<SqliteNoteStore>,
    title: String,
    text: String,
) -> Result<(), StoreError> {
    if controller.save(title, text).await? == Navigation::ShowList {
        print_notes(controller.notes());
    }
    Ok(())
}

fn find_note(
    controller: &NotesController<SqliteNoteStore>,
    id: NoteId,
) -> Result<Note, StoreError> {
    controller
        .notes()
        .iter()
        .find(|note| note.id == id)
        .cloned()
        .ok_or(StoreError::NotFound(id))
}

fn print_notes(notes: &[Note]) {
    let now = now_epoch_ms();
    if notes.is_empty() {
        println!("(no notes)");
    }
    for note in notes {
        println!("#{} [{}] {}", note.id, note.age_label(now), note.title);
        if !note.text.is_empty() {
            println!("    {}", note.text.replace('\n', "\n    "));
        }
    }
}
