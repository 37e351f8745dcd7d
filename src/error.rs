use std::io;

use thiserror::Error;

use crate::enums::ErrorCode;

/// Everything that can go wrong while talking JDWP to a remote VM.
///
/// [`JdwpError::Io`], [`JdwpError::HandshakeFailed`] and
/// [`JdwpError::BadFraming`] are fatal to the session: the socket is closed
/// and every subsequent call on the same [`crate::session::Session`] will
/// fail. [`JdwpError::Protocol`] and [`JdwpError::UnsupportedEventKind`] are
/// reported per-call; the session stays open.
#[derive(Debug, Error)]
pub enum JdwpError {
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    #[error("handshake failed: remote did not echo the JDWP magic")]
    HandshakeFailed,

    #[error("bad packet framing: {0}")]
    BadFraming(String),

    #[error("JDWP reply error: {0}")]
    Protocol(ErrorCode),

    #[error("unsupported event kind in composite packet: {0}")]
    UnsupportedEventKind(u8),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("already attached")]
    AlreadyAttached,

    #[error("operation cancelled")]
    Cancelled,
}

impl JdwpError {
    /// Whether this error closes the session, per the propagation policy:
    /// transport, framing, handshake and cancellation errors are fatal;
    /// protocol-level and caller errors are reported per-call and leave
    /// the session open.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            JdwpError::Io(_)
                | JdwpError::HandshakeFailed
                | JdwpError::BadFraming(_)
                | JdwpError::Cancelled
        )
    }
}

pub type Result<T> = std::result::Result<T, JdwpError>;
