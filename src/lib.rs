mod libs {
    pub mod arguments;
    pub mod error;
    pub mod session;
    pub mod transport;
    pub mod xml;
}
use std::process::exit;

use clap::Parser;

pub use libs::arguments::Args;
pub use libs::error::{RacError, Step};
pub use libs::session::{execute, ConnectionConfig, ExecutionOutcome, Session, SessionState};
pub use libs::transport::Transport;
pub use libs::xml::{escape_text, extract_field, Field};

/// CLI entry point: parse arguments, run one command against the
/// controller, print its output, and exit non-zero on any failure.
pub fn racadm_run() {
    let args = Args::parse();
    let config = args.connection_config();
    let command = args.command_line();

    let outcome = execute(&config, &command);

    if !outcome.output.is_empty() {
        println!("{}", outcome.output);
    }

    if !outcome.success {
        eprintln!("{}", outcome.error_message);
        exit(1);
    }
}
