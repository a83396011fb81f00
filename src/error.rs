//! Error kinds. Errors local to one input graph (syntax, memory) let a
//! batch continue; internal invariant failures abort it.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  /// malformed edge list in the input file.
  #[error("syntax error: {0}")]
  InputSyntax(String),

  /// a command-line value that parsed but makes no sense.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// the cache arena cannot hold an entry even after eviction.
  #[error("cache exhausted: {0} bytes requested")]
  OutOfMemory(usize),

  /// a broken invariant; not recoverable.
  #[error("internal failure ({0})")]
  Internal(&'static str),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
