//! Error taxonomy surfaced to callers of the movie repository.

use color_eyre::Report;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MovieError>;

/// Classified failure of a repository read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MovieError {
  /// No or broken connectivity, or a timeout
  #[error("{0}")]
  Network(String),
  /// Remote returned an error status
  #[error("{0}")]
  Server(String),
  /// Local store operation failed
  #[error("{0}")]
  Cache(String),
  /// Requested id absent everywhere
  #[error("{0}")]
  DataNotFound(String),
  #[error("{0}")]
  Unknown(String),
}

impl MovieError {
  /// Classify a failure by keywords in its message.
  ///
  /// Case-insensitive substring match, first hit wins:
  /// network/connection/timeout, then server/http, then cache/database,
  /// then "not found". Anything else is `Unknown`.
  ///
  /// This is a heuristic: a server message that merely mentions a timeout is
  /// reported as a network error.
  pub fn classify(message: &str) -> Self {
    let lower = message.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["network", "connection", "timeout"]) {
      Self::Network(or_default(message, "Network connection failed"))
    } else if has(&["server", "http"]) {
      Self::Server(or_default(message, "Server error occurred"))
    } else if has(&["cache", "database"]) {
      Self::Cache(or_default(message, "Cache operation failed"))
    } else if has(&["not found"]) {
      Self::DataNotFound(or_default(message, "Requested data not found"))
    } else {
      Self::Unknown(or_default(message, "An unknown error occurred"))
    }
  }

  /// Classify a report using its whole context chain.
  pub fn from_report(report: &Report) -> Self {
    Self::classify(&format!("{:#}", report))
  }

  pub fn message(&self) -> &str {
    match self {
      Self::Network(m) | Self::Server(m) | Self::Cache(m) | Self::DataNotFound(m) | Self::Unknown(m) => m,
    }
  }

  /// Short label for the error kind
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Network(_) => "network",
      Self::Server(_) => "server",
      Self::Cache(_) => "cache",
      Self::DataNotFound(_) => "not found",
      Self::Unknown(_) => "unknown",
    }
  }
}

fn or_default(message: &str, default: &str) -> String {
  if message.is_empty() {
    default.to_string()
  } else {
    message.to_string()
  }
}
