//! Interactive command layer over a single active tree

mod command;
mod session;

pub use command::{Command, HELP, parse, parser};
pub use session::{ActiveTree, Reply, Session, ShellError, ShellResult};
