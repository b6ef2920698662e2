mod commands;
mod outline;

use command_tree_core::{ExecError, Execution, build_command_tree};
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();

    let tree = match build_command_tree(&commands::RootCommands) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(2);
        }
    };

    match tree.execute_from(std::env::args_os()) {
        Ok(Execution::Ran(_)) => {}
        Ok(Execution::Help(text)) => print!("{text}"),
        Err(ExecError::Usage(err)) => err.exit(),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
