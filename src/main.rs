use std::path::PathBuf;

use arbor::config::{ShellConfig, TreeKind};
use arbor::shell::{Reply, Session, ShellError};
use clap::Parser;
use rustyline::{DefaultEditor, error::ReadlineError};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const EXIT_CMD: &str = "quit";

#[derive(Parser, Debug)]
#[command(name = "arbor", about = "Interactive shell for B-trees and binary search trees")]
struct Args {
    /// Kind of tree to start with
    #[arg(long, value_enum)]
    tree: Option<TreeKind>,

    /// B-tree order (maximum children per node)
    #[arg(long)]
    order: Option<usize>,

    /// Path to a JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a command instead of starting the shell (repeatable)
    #[arg(short = 'e', long = "execute")]
    execute: Vec<String>,
}

fn main() -> Result<(), ShellError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arbor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ShellConfig::load(path)?,
        None => ShellConfig::default(),
    };
    if let Some(tree) = args.tree {
        config.tree = tree;
    }
    if let Some(order) = args.order {
        config.order = order;
    }
    config.validate()?;

    let mut session = Session::new(config)?;

    if !args.execute.is_empty() {
        for line in &args.execute {
            if !run(&mut session, line) {
                break;
            }
        }
        return Ok(());
    }

    repl(&mut session)
}

/// Execute one line and print its outcome; false once the session should end
fn run(session: &mut Session, line: &str) -> bool {
    match session.run_line(line) {
        Ok(Reply::Output(text)) => println!("{text}"),
        Ok(Reply::Silent) => {}
        Ok(Reply::Quit) => return false,
        Err(e) => println!("{e}"),
    }
    true
}

fn repl(session: &mut Session) -> Result<(), ShellError> {
    let mut rl = DefaultEditor::new()?;
    let history = session.config().history_file.clone();
    if let Some(path) = &history {
        if rl.load_history(path).is_err() {
            info!(path = %path.display(), "no previous history");
        }
    }

    println!("Type 'help' for the list of commands or '{EXIT_CMD}' to exit.\n");
    let prompt = session.config().prompt.clone();

    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    rl.add_history_entry(line.as_str())?;
                }
                if !run(session, &line) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    if let Some(path) = &history {
        if let Err(e) = rl.save_history(path) {
            warn!(path = %path.display(), error = %e, "failed to save history");
        }
    }
    Ok(())
}
