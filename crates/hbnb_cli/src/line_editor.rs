//! Terminal front end with line editing and in-session history.
//!
//! # Responsibility
//! - Read lines through `rustyline` and hand each one to the console.
//!
//! # Invariants
//! - Ctrl-C abandons the current line only; Ctrl-D ends the session.
//! - History lives for the session and is never written to disk.

use hbnb_core::{Console, PROMPT};
use log::{info, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{self, Write};

/// Runs the console against the terminal until `quit`, `EOF` or Ctrl-D.
///
/// # Errors
/// - Any terminal failure other than Ctrl-C / Ctrl-D, and write failures on
///   stdout.
pub fn run_terminal(console: &mut Console) -> rustyline::Result<()> {
    let mut editor = DefaultEditor::new()?;
    let mut stdout = io::stdout();
    info!(
        "event=shell_start module=cli status=ok records={} interactive=true",
        console.store().len()
    );

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => {
                writeln!(stdout)?;
                break;
            }
            Err(err) => {
                warn!("event=readline module=cli status=error error={}", err);
                return Err(err);
            }
        };

        if !line.trim().is_empty() {
            let _ = editor.add_history_entry(line.as_str());
        }
        if !console.handle_line(&line, &mut stdout)? {
            break;
        }
        stdout.flush()?;
    }

    info!("event=shell_stop module=cli status=ok");
    Ok(())
}
