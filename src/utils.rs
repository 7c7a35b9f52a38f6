// Copyright 2017 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Various utilities.

use std::future::Future;

use log::debug;
#[cfg(feature = "object-storage")]
use reqwest::header::{HeaderMap, HeaderName};
use reqwest::Response;
use tokio_util::sync::CancellationToken;

use super::{Error, ErrorKind, Result};

/// Run a future until it completes or the token is cancelled.
///
/// The future is dropped on cancellation, which aborts any in-flight request.
pub async fn cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("Poll cancelled by the caller");
            Err(Error::new(ErrorKind::Cancelled, "poll was cancelled"))
        }
        result = fut => result,
    }
}

/// Fail with a `ProtocolError` carrying the body if the response is not a success.
pub(crate) async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.map_err(|e| {
        Error::new_with_details(
            ErrorKind::ProtocolError,
            Some(status),
            Some(format!("cannot read error body: {}", e)),
        )
    })?;
    Err(Error::new_with_details(
        ErrorKind::ProtocolError,
        Some(status),
        Some(body),
    ))
}

/// Get a header as a string if present.
#[cfg(feature = "object-storage")]
pub(crate) fn get_header<'m>(headers: &'m HeaderMap, key: &HeaderName) -> Result<Option<&'m str>> {
    match headers.get(key) {
        Some(hdr) => hdr.to_str().map(Some).map_err(|e| {
            Error::invalid_response(format!("Header {} is not a valid string: {}", key, e))
        }),
        None => Ok(None),
    }
}

/// Get a required header as a string.
#[cfg(feature = "object-storage")]
pub(crate) fn get_required_header<'m>(headers: &'m HeaderMap, key: &HeaderName) -> Result<&'m str> {
    get_header(headers, key)?
        .ok_or_else(|| Error::invalid_response(format!("Missing header {}", key)))
}

pub mod url {
    //! Handy primitives for working with URLs.

    use reqwest::Url;

    use super::super::{Error, Result};

    /// Parse a configured endpoint URL.
    pub fn parse(value: &str, what: &str) -> Result<Url> {
        let url = Url::parse(value)
            .map_err(|e| Error::invalid_config(format!("Invalid {}: {}", what, e)))?;
        if url.cannot_be_a_base() {
            return Err(Error::invalid_config(format!(
                "Invalid {}: wrong schema?",
                what
            )));
        }
        Ok(url)
    }

    /// Append path segments to the URL, ignoring a trailing slash.
    #[inline]
    #[allow(unused_results)]
    pub fn extend<'s, I>(mut url: Url, segments: I) -> Url
    where
        I: IntoIterator<Item = &'s str>,
    {
        // Only cannot-be-a-base URLs fail here and parse() rejects them.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
