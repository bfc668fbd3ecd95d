// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use thiserror::Error;

use crate::models::method::MethodStatus;

/// Failure taxonomy of the whole driver. Every public API surfaces one of
/// these; internal conditions are classified before they cross a module
/// boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// IF-SEND/IF-RECV or the underlying ioctl failed.
    #[error("device error: {0}")]
    Device(String),

    /// The transport yielded a ComPacket with no packets or sub-packets.
    #[error("received no response to packet")]
    NoResponse,

    /// Malformed bytes on the wire or malformed JSON input.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A Value does not match the Type it is interpreted under.
    #[error("expected a value of '{expected}' but got a value of '{actual}'")]
    InvalidType { expected: String, actual: String },

    /// A method completed with SUCCESS but returned an unexpected shape.
    #[error("invalid response to method '{method}': {message}")]
    InvalidResponse { method: String, message: String },

    /// A method returned a non-SUCCESS status with no more specific alias.
    #[error("call to method '{method}' failed: {status}")]
    Invocation { method: String, status: String },

    #[error("not authorized")]
    NotAuthorized,

    #[error("security provider busy")]
    SecurityProviderBusy,

    #[error("security provider failed")]
    SecurityProviderFailed,

    #[error("security provider disabled")]
    SecurityProviderDisabled,

    #[error("security provider frozen")]
    SecurityProviderFrozen,

    /// The TPer closed the session from its side.
    #[error("session terminated by TPer: {}", .0.text())]
    SessionTerminated(MethodStatus),

    /// Authentication rejected the supplied proof.
    #[error("invalid password")]
    Password,

    #[error("not implemented: {0}")]
    NotImplemented(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Device(value.to_string())
    }
}

impl Error {
    pub(crate) fn invalid_format(message: impl Into<String>) -> Self {
        Error::InvalidFormat(message.into())
    }

    pub(crate) fn invalid_type(
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Error::InvalidType {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
