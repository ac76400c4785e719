//! Handler faults: failures a handler did not anticipate.
//!
//! User input problems (missing argument, unknown command, foreign need) are
//! answered by the handler itself. Anything else surfaces as a [`HandlerFault`]
//! and is reported by the session controller's fault barrier.

use std::{fmt, panic::Location, path::Path};

use crate::errors::Error;

/// What went wrong, independent of where.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// An argument could not be interpreted (e.g. a non-numeric id).
    InvalidArgument(String),
    /// The need store failed.
    Store(String),
    /// Sending a reply failed.
    Transport(String),
}

impl FaultKind {
    /// Short category name shown to the requester.
    pub fn category(&self) -> &'static str {
        match self {
            FaultKind::InvalidArgument(_) => "InvalidArgument",
            FaultKind::Store(_) => "StoreError",
            FaultKind::Transport(_) => "TransportError",
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            FaultKind::InvalidArgument(s) | FaultKind::Store(s) | FaultKind::Transport(s) => s,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HandlerFault {
    pub kind: FaultKind,
    pub location: &'static Location<'static>,
}

impl HandlerFault {
    /// Record a fault at the caller's source location.
    #[track_caller]
    pub fn new(kind: FaultKind) -> Self {
        Self {
            kind,
            location: Location::caller(),
        }
    }

    #[track_caller]
    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::new(FaultKind::InvalidArgument(detail.into()))
    }

    pub fn category(&self) -> &'static str {
        self.kind.category()
    }

    /// File name (without directories) where the fault was raised.
    pub fn file_name(&self) -> &str {
        let file = self.location.file();
        Path::new(file)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(file)
    }

    /// `"<category> -> <file> : <line>"`.
    pub fn diagnostic(&self) -> String {
        format!(
            "{} -> {} : {}",
            self.category(),
            self.file_name(),
            self.location.line()
        )
    }
}

impl fmt::Display for HandlerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (at {}:{})",
            self.category(),
            self.kind.detail(),
            self.location.file(),
            self.location.line()
        )
    }
}

impl std::error::Error for HandlerFault {}

/// Store and transport errors crossing a handler become faults located at the
/// `?` that propagated them.
impl From<Error> for HandlerFault {
    #[track_caller]
    fn from(e: Error) -> Self {
        let kind = match e {
            Error::Transport(msg) => FaultKind::Transport(msg),
            other => FaultKind::Store(other.to_string()),
        };
        Self::new(kind)
    }
}

pub type HandlerResult = std::result::Result<(), HandlerFault>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_names_category_file_and_line() {
        let line = line!() + 1;
        let fault = HandlerFault::invalid_argument("not a number");
        assert_eq!(fault.file_name(), "fault.rs");
        assert_eq!(fault.diagnostic(), format!("InvalidArgument -> fault.rs : {line}"));
    }

    #[test]
    fn question_mark_records_propagation_site() {
        fn fails() -> HandlerResult {
            let sent: crate::Result<()> = Err(Error::Transport("socket closed".to_string()));
            sent?;
            Ok(())
        }

        let fault = fails().unwrap_err();
        assert_eq!(fault.category(), "TransportError");
        assert_eq!(fault.kind.detail(), "socket closed");
        assert_eq!(fault.file_name(), "fault.rs");
    }
}
