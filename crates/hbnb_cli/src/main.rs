//! `hbnb` interactive record shell.
//!
//! # Responsibility
//! - Resolve configuration, start logging, load the store.
//! - Run the console over a line editor on a terminal, or over plain
//!   stdin/stdout for piped input, until `quit` or end of input.

mod line_editor;

use hbnb_core::{init_logging, Console, FileStore, ShellConfig};
use log::{error, info};
use std::io::{self, IsTerminal};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = ShellConfig::from_env();

    if let Some(log_dir) = config.log_dir.as_deref() {
        // Logging is optional; the shell still works without it.
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("hbnb: logging disabled: {err}");
        }
    }

    let store = match FileStore::open(&config.store_path) {
        Ok(store) => store,
        Err(err) => {
            error!("event=shell_start module=cli status=error error={}", err);
            eprintln!("hbnb: cannot load store: {err}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "event=store_open module=cli status=ok path={} records={} version={}",
        store.path().display(),
        store.len(),
        hbnb_core::core_version()
    );

    let mut console = Console::new(store);
    let outcome = if io::stdin().is_terminal() {
        line_editor::run_terminal(&mut console).map_err(|err| err.to_string())
    } else {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        console
            .run(stdin.lock(), &mut stdout, false)
            .map_err(|err| err.to_string())
    };
    if let Err(err) = outcome {
        error!("event=shell_stop module=cli status=error error={}", err);
        eprintln!("hbnb: {err}");
        return ExitCode::FAILURE;
    }

    let store = console.into_store();
    info!(
        "event=shell_exit module=cli status=ok records={}",
        store.len()
    );
    log::logger().flush();
    ExitCode::SUCCESS
}
