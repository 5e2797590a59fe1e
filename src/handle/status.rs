//! Status of an asynchronous handle
//!
//! Every handle in this crate moves through the same state machine: it is
//! created in [`AsyncStatus::Started`] and reaches, exactly once, one of the
//! three terminal states. Terminal states never change again.

use std::fmt;

/// The four-state lifecycle of an asynchronous handle.
///
/// The legal transitions are `Started -> Completed`, `Started -> Canceled`
/// and `Started -> Error`. A terminal status is never revisited or reversed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AsyncStatus {
    /// The work behind the handle has not finished yet.
    Started,
    /// The work finished and (for valued shapes) produced a result.
    Completed,
    /// The work was canceled before it could finish.
    Canceled,
    /// The work failed; the handle carries the captured failure.
    Error,
}

impl AsyncStatus {
    /// Returns true for the three states that end a handle's lifecycle.
    pub fn is_terminal(self) -> bool {
        !matches!(self, AsyncStatus::Started)
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            AsyncStatus::Started => 0,
            AsyncStatus::Completed => 1,
            AsyncStatus::Canceled => 2,
            AsyncStatus::Error => 3,
        }
    }

    pub(crate) fn from_u8(raw: u8) -> AsyncStatus {
        match raw {
            1 => AsyncStatus::Completed,
            2 => AsyncStatus::Canceled,
            3 => AsyncStatus::Error,
            _ => AsyncStatus::Started,
        }
    }
}

impl fmt::Display for AsyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AsyncStatus::Started => "started",
            AsyncStatus::Completed => "completed",
            AsyncStatus::Canceled => "canceled",
            AsyncStatus::Error => "error",
        };
        f.write_str(name)
    }
}
