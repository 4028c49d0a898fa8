use std::io;

use thiserror::Error;

/// Errors surfaced by the graph loaders and the method dispatcher.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A graph file did not match its format.
    #[error("parse error: {0}")]
    Parse(String),

    /// The dispatcher was handed a name outside the fixed method set.
    #[error("unknown coloring method '{0}'")]
    UnknownMethod(String),
}
