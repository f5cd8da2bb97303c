//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `noteshare_core` linkage.
//! - Walk one create/share/update/history round trip in memory.

use noteshare_core::{
    default_log_level, init_logging, open_db_in_memory, IdentityDirectory, NoteService,
    SqliteIdentityDirectory, SqliteNoteRepository,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let log_dir = std::env::temp_dir().join("noteshare-cli-logs");
    let log_dir = log_dir.to_str().ok_or("log dir is not valid UTF-8")?;
    init_logging(default_log_level(), log_dir)?;

    println!("noteshare_core ping={}", noteshare_core::ping());
    println!("noteshare_core version={}", noteshare_core::core_version());

    let conn = open_db_in_memory()?;
    let directory = SqliteIdentityDirectory::new(&conn);
    let owner = directory.register_identity("owner")?;
    let reader = directory.register_identity("reader")?;

    let service = NoteService::new(
        SqliteNoteRepository::new(&conn),
        SqliteIdentityDirectory::new(&conn),
    );

    let note_id = service.create_note(owner, "smoke", "first draft")?;
    service.share_note(owner, note_id, &["reader".to_string()])?;
    service.update_note(reader, note_id, "second draft")?;

    let view = service.get_note(reader, note_id)?;
    println!("note title={} content={}", view.title, view.content);

    let history = service.get_history(owner, note_id)?;
    println!("history entries={}", history.len());

    Ok(())
}
