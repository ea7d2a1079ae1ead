//! Typed failures for a single fetch.
//!
//! The CLI flattens all of these into one non-zero exit status; the variants
//! exist so tests and log lines can tell transport, HTTP and disk failures apart.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the (at most two) requests a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// First GET with only the file id.
    Initial,
    /// Second GET carrying the confirmation token.
    Confirm,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Initial => f.write_str("initial"),
            Stage::Confirm => f.write_str("confirmation"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// The id (or share link) did not yield a usable file id.
    #[error("invalid file id {0:?}")]
    InvalidId(String),

    /// The configured endpoint is not a valid absolute URL.
    #[error("invalid endpoint URL {url:?}")]
    Endpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Setting an option on the curl handle failed.
    #[error("configuring HTTP session")]
    Setup(#[from] curl::Error),

    /// Curl reported an error during the transfer (timeout, DNS, reset, short body).
    #[error("{stage} request failed")]
    Transport {
        stage: Stage,
        #[source]
        source: curl::Error,
    },

    /// Final response (after redirects) had a non-2xx status.
    #[error("{stage} request returned HTTP {status}")]
    Http { stage: Stage, status: u32 },

    /// Creating or writing the destination failed.
    #[error("writing {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
