// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Transport error classification.
//!
//! Redfish error responses carry a JSON body of the form
//! `{"error": {"@Message.ExtendedInfo": [{"Severity": …, "Message": …,
//! "Resolution": …}]}}`; the first extended-info entry is unpacked into
//! [`HttpError`] so callers get a readable failure without touching raw
//! JSON.

use serde_json::Value;
use std::error::Error as StdError;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

/// Failure class of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    /// HTTP 400.
    BadRequest,
    /// HTTP 404.
    NotFound,
    /// HTTP 401 / 403.
    AccessDenied,
    /// HTTP 5xx.
    ServerError,
    /// Any other status >= 400.
    Other,
}

/// An HTTP-level failure reported by the iBMC.
#[derive(Debug)]
pub struct HttpError {
    pub kind: HttpErrorKind,
    pub method: String,
    pub url: String,
    pub status: u16,
    /// `Severity` of the first `@Message.ExtendedInfo` entry, if present.
    pub severity: Option<String>,
    /// `Message` of the first `@Message.ExtendedInfo` entry, if present.
    pub message: Option<String>,
    /// `Resolution` of the first `@Message.ExtendedInfo` entry, if present.
    pub resolution: Option<String>,
}

impl HttpError {
    pub(crate) fn new(method: &str, url: &str, status: u16, body: Option<&Value>) -> Self {
        let info = body
            .and_then(|body| body.get("error"))
            .and_then(|error| error.get("@Message.ExtendedInfo"))
            .and_then(Value::as_array)
            .and_then(|entries| entries.first());
        let field = |name: &str| {
            info.and_then(|info| info.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            kind: Self::classify(status),
            method: method.to_string(),
            url: url.to_string(),
            status,
            severity: field("Severity"),
            message: field("Message"),
            resolution: field("Resolution"),
        }
    }

    fn classify(status: u16) -> HttpErrorKind {
        match status {
            400 => HttpErrorKind::BadRequest,
            401 | 403 => HttpErrorKind::AccessDenied,
            404 => HttpErrorKind::NotFound,
            500..=599 => HttpErrorKind::ServerError,
            _ => HttpErrorKind::Other,
        }
    }

    /// Whether the response was an authentication failure that may be
    /// recovered by renewing the session.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.kind == HttpErrorKind::NotFound {
            return write!(f, "Resource {} not found", self.url);
        }
        write!(
            f,
            "HTTP {} {} returned code {}. ",
            self.method, self.url, self.status
        )?;
        match (&self.severity, &self.message) {
            (Some(severity), Some(message)) => {
                write!(f, "[{}] {}", severity, message)?;
                if let Some(resolution) = &self.resolution {
                    write!(f, " Resolution: {}", resolution)?;
                }
                Ok(())
            }
            _ => write!(f, "http status code: {}", self.status),
        }
    }
}

/// Transport failure.
#[derive(Debug)]
pub enum Error {
    /// The BMC could not be reached at all.
    Connection { url: String, source: reqwest::Error },
    /// The BMC answered with a non-success status.
    Http(Box<HttpError>),
    /// Session creation did not return an `X-Auth-Token` header.
    MissingAuthToken,
    /// The response body could not be decoded into the expected shape.
    Decode {
        url: String,
        source: serde_path_to_error::Error<serde_json::Error>,
    },
    /// The response decoded but did not carry what the protocol promises.
    Malformed { url: String, reason: String },
    /// A resource path could not be joined onto the BMC address.
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
}

impl Error {
    pub(crate) fn http(method: &str, url: &str, status: u16, body: Option<&Value>) -> Self {
        Self::Http(Box::new(HttpError::new(method, url, status, body)))
    }

    /// The HTTP failure detail, when this error is an HTTP one.
    #[must_use]
    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(http) => Some(http),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Connection { url, source } => {
                write!(f, "Unable to connect to {}. Error: {}", url, source)
            }
            Self::Http(http) => http.fmt(f),
            Self::MissingAuthToken => write!(
                f,
                "No X-Auth-Token returned from remote host when attempting to establish a session"
            ),
            Self::Decode { url, source } => write!(
                f,
                "Malformed response from {} at path {}: {}",
                url,
                source.path(),
                source.inner()
            ),
            Self::Malformed { url, reason } => {
                write!(f, "Malformed response from {}: {}", url, reason)
            }
            Self::InvalidUrl { url, source } => {
                write!(f, "Invalid resource URL {}: {}", url, source)
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Connection { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source.inner()),
            Self::InvalidUrl { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classification() {
        assert_eq!(HttpError::classify(400), HttpErrorKind::BadRequest);
        assert_eq!(HttpError::classify(401), HttpErrorKind::AccessDenied);
        assert_eq!(HttpError::classify(403), HttpErrorKind::AccessDenied);
        assert_eq!(HttpError::classify(404), HttpErrorKind::NotFound);
        assert_eq!(HttpError::classify(500), HttpErrorKind::ServerError);
        assert_eq!(HttpError::classify(503), HttpErrorKind::ServerError);
        assert_eq!(HttpError::classify(409), HttpErrorKind::Other);
    }

    #[test]
    fn test_extended_info_unpacking() {
        let body = json!({
            "error": {
                "code": "Base.1.0.GeneralError",
                "@Message.ExtendedInfo": [{
                    "Severity": "Warning",
                    "Message": "The operation failed.",
                    "Resolution": "Retry later."
                }]
            }
        });
        let error = HttpError::new("POST", "https://bmc/redfish/v1/x", 400, Some(&body));
        assert_eq!(error.severity.as_deref(), Some("Warning"));
        assert_eq!(error.message.as_deref(), Some("The operation failed."));
        assert_eq!(error.resolution.as_deref(), Some("Retry later."));
        let display = error.to_string();
        assert!(display.contains("[Warning] The operation failed."));
        assert!(display.contains("Resolution: Retry later."));
    }

    #[test]
    fn test_display_without_extended_info() {
        let error = HttpError::new("GET", "https://bmc/redfish/v1/x", 502, None);
        assert!(error.to_string().contains("http status code: 502"));
    }

    #[test]
    fn test_not_found_display() {
        let error = HttpError::new("GET", "https://bmc/redfish/v1/missing", 404, None);
        assert_eq!(
            error.to_string(),
            "Resource https://bmc/redfish/v1/missing not found"
        );
    }
}
