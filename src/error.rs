// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error and Result implementations.

use std::fmt;

use reqwest::StatusCode;

/// Kind of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Missing or invalid configuration.
    ///
    /// Raised before a scaler is created, never during polling.
    InvalidConfig,

    /// Failure to issue or validate a token.
    ///
    /// Covers both transport failures talking to the Identity service and
    /// non-successful responses from it.
    AuthenticationFailed,

    /// Network-level failure reaching a metric endpoint.
    ///
    /// Includes request time outs.
    TransportError,

    /// Metric endpoint returned a non-successful status.
    ///
    /// The message contains the response body.
    ProtocolError,

    /// Response received from the server is malformed or unusable.
    InvalidResponse,

    /// The poll was cancelled by the caller.
    Cancelled,
}

/// Error from an OpenStack call.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    status: Option<StatusCode>,
    message: Option<String>,
}

/// Result of an OpenStack call.
pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    /// Create a new error of the provided kind.
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Error {
        Error {
            kind,
            status: None,
            message: Some(message.into()),
        }
    }

    /// Create with providing all details.
    #[inline]
    pub fn new_with_details(
        kind: ErrorKind,
        status: Option<StatusCode>,
        message: Option<String>,
    ) -> Error {
        Error {
            kind,
            status,
            message,
        }
    }

    /// Error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status code (if any).
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Error message (if any).
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Helper - error of kind InvalidConfig.
    pub(crate) fn invalid_config<S: Into<String>>(message: S) -> Error {
        Error::new(ErrorKind::InvalidConfig, message)
    }

    /// Helper - error of kind InvalidResponse.
    pub(crate) fn invalid_response<S: Into<String>>(message: S) -> Error {
        Error::new(ErrorKind::InvalidResponse, message)
    }

    /// Re-classify this error as an authentication failure, keeping details.
    pub(crate) fn into_auth_failure(self) -> Error {
        Error {
            kind: ErrorKind::AuthenticationFailed,
            ..self
        }
    }
}

impl ErrorKind {
    /// Short description of the error kind.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::InvalidConfig => "Configuration is invalid or incomplete",
            ErrorKind::AuthenticationFailed => "Failed to authenticate",
            ErrorKind::TransportError => "Error when accessing the server",
            ErrorKind::ProtocolError => "Server returned an error status",
            ErrorKind::InvalidResponse => "Received invalid response",
            ErrorKind::Cancelled => "Operation was cancelled",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status.as_u16())?;
        }

        if let Some(ref msg) = self.message {
            write!(f, ": {}", msg)
        } else {
            Ok(())
        }
    }
}

impl ::std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Error {
        let msg = if value.is_timeout() {
            format!("request timed out: {}", value)
        } else {
            value.to_string()
        };
        let kind = if value.is_decode() {
            ErrorKind::InvalidResponse
        } else if value.is_builder() {
            ErrorKind::InvalidConfig
        } else {
            ErrorKind::TransportError
        };

        Error::new_with_details(kind, value.status(), Some(msg))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Error {
        Error::invalid_response(format!("Cannot decode JSON: {}", value))
    }
}
