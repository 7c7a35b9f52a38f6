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

//! Session structure definition.
//!
//! The session owns a token for one set of credentials and knows how to
//! issue, validate and re-issue it. The HTTP client is injected and may be
//! shared between any number of sessions.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use log::{debug, error, trace};
use reqwest::header::HeaderName;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use static_assertions::assert_impl_all;

use super::identity::{Credentials, INVALID_SUBJECT_HEADER, MISSING_SUBJECT_HEADER};
use super::utils::{self, url};
use super::{Error, ErrorKind, Result};

/// Request time out used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

static SUBJECT_TOKEN: HeaderName = HeaderName::from_static("x-subject-token");
static AUTH_TOKEN: HeaderName = HeaderName::from_static("x-auth-token");

/// An authentication session against the Identity service.
///
/// The token starts empty and is never assumed valid until issued.
#[derive(Clone)]
pub struct AuthSession {
    client: Client,
    credentials: Credentials,
    token_endpoint: Url,
    token: Option<String>,
    timeout: Duration,
}

assert_impl_all!(AuthSession: Send, Sync);

impl AuthSession {
    /// Create a new session.
    ///
    /// `auth_url` is the Identity endpoint including its version, e.g.
    /// `https://cloud.local:5000/v3`. No request is made at this point.
    pub fn new<U>(client: Client, auth_url: U, credentials: Credentials) -> Result<AuthSession>
    where
        U: AsRef<str>,
    {
        let auth_url = url::parse(auth_url.as_ref(), "authURL")?;
        let token_endpoint = url::extend(auth_url, ["auth", "tokens"]);
        Ok(AuthSession {
            client,
            credentials,
            token_endpoint,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Set the time out for every request made through this session.
    #[inline]
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Set the time out for every request made through this session.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> AuthSession {
        self.set_timeout(timeout);
        self
    }

    /// Request time out.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Credentials in use.
    #[inline]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Token endpoint URL.
    #[inline]
    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }

    /// Whether a token was ever issued.
    #[inline]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Issue a new token and store it in the session.
    pub async fn issue_token(&mut self) -> Result<String> {
        debug!(
            "Requesting a token from {} using {} authentication",
            self.token_endpoint,
            self.credentials.method()
        );
        let resp = self
            .client
            .post(self.token_endpoint.clone())
            .timeout(self.timeout)
            .json(&self.credentials.auth_body())
            .send()
            .await
            .map_err(|e| Error::from(e).into_auth_failure())?;
        let resp = utils::check_status(resp)
            .await
            .map_err(Error::into_auth_failure)?;
        let token = token_from_response(&resp)?;
        debug!("Received a new token from {}", self.token_endpoint);
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Check whether the current token is still accepted by the Identity service.
    ///
    /// Returns `false` without a request if no token was issued yet.
    pub async fn is_token_valid(&self) -> Result<bool> {
        let token = match self.token {
            Some(ref token) => token,
            None => return Ok(false),
        };

        let resp = self
            .client
            .head(self.token_endpoint.clone())
            .timeout(self.timeout)
            .header(&SUBJECT_TOKEN, token)
            .header(&AUTH_TOKEN, token)
            .send()
            .await
            .map_err(|e| Error::from(e).into_auth_failure())?;
        let status = resp.status();
        trace!("Token validation returned {}", status);
        Ok(!(status.is_client_error() || status.is_server_error()))
    }

    /// Make sure the session holds a valid token, re-issuing it if needed.
    ///
    /// A failed validity check is propagated without trying to re-issue.
    pub async fn ensure_valid(&mut self) -> Result<&str> {
        if self.token.is_none() {
            debug!("No token issued yet, authenticating");
            let _ = self.issue_token().await?;
        } else if !self.is_token_valid().await? {
            debug!("Token is no longer valid, re-authenticating");
            let _ = self.issue_token().await?;
        }

        self.token.as_deref().ok_or_else(|| {
            Error::new(ErrorKind::AuthenticationFailed, "No token after authentication")
        })
    }

    /// Create a request carrying the current token and the configured time out.
    pub fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
        let token = self.token.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::AuthenticationFailed, "Session has no token")
        })?;
        trace!("Sending {} request to {}", method, url);
        Ok(self
            .client
            .request(method, url)
            .timeout(self.timeout)
            .header(&AUTH_TOKEN, token))
    }

    /// Create a GET request carrying the current token.
    #[inline]
    pub fn get(&self, url: Url) -> Result<RequestBuilder> {
        self.request(Method::GET, url)
    }

    #[cfg(test)]
    pub(crate) fn set_token<S: Into<String>>(&mut self, token: S) {
        self.token = Some(token.into());
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let token = self.token.as_ref().map(|value| {
            let mut hasher = DefaultHasher::new();
            value.hash(&mut hasher);
            format!("hash({})", hasher.finish())
        });
        f.debug_struct("AuthSession")
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("credentials", &self.credentials)
            .field("token", &token)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn token_from_response(resp: &Response) -> Result<String> {
    match resp.headers().get(&SUBJECT_TOKEN) {
        Some(hdr) => match hdr.to_str() {
            Ok(s) => Ok(s.to_string()),
            Err(e) => {
                error!(
                    "Invalid X-Subject-Token {:?} received from {}: {}",
                    hdr,
                    resp.url(),
                    e
                );
                Err(Error::new_with_details(
                    ErrorKind::AuthenticationFailed,
                    Some(resp.status()),
                    Some(INVALID_SUBJECT_HEADER.to_string()),
                ))
            }
        },
        None => {
            error!("No X-Subject-Token header received from {}", resp.url());
            Err(Error::new_with_details(
                ErrorKind::AuthenticationFailed,
                Some(resp.status()),
                Some(MISSING_SUBJECT_HEADER.to_string()),
            ))
        }
    }
}

#[cfg(test)]
pub mod test {
    #![allow(missing_docs, unused_results)]

    use reqwest::Client;

    use super::{AuthSession, DEFAULT_TIMEOUT};
    use crate::identity::{ApplicationCredential, Credentials, Password};
    use crate::ErrorKind;

    pub fn new_session(auth_url: &str) -> AuthSession {
        AuthSession::new(
            Client::new(),
            auth_url,
            Credentials::from(Password::new("admin", "pa$$w0rd")),
        )
        .unwrap()
    }

    #[test]
    fn test_session_new() {
        let s = new_session("http://127.0.0.1:5000/v3");
        assert_eq!(
            s.token_endpoint().as_str(),
            "http://127.0.0.1:5000/v3/auth/tokens"
        );
        assert!(!s.has_token());
        assert_eq!(s.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_token_endpoint_with_trailing_slash() {
        let s = new_session("http://127.0.0.1:5000/v3/");
        assert_eq!(
            s.token_endpoint().as_str(),
            "http://127.0.0.1:5000/v3/auth/tokens"
        );
    }

    #[test]
    fn test_token_endpoint_root() {
        let s = new_session("http://127.0.0.1:5000");
        assert_eq!(s.token_endpoint().as_str(), "http://127.0.0.1:5000/auth/tokens");
    }

    #[test]
    fn test_session_new_invalid() {
        let err = AuthSession::new(
            Client::new(),
            "http://127.0.0.1 5000/",
            Credentials::from(ApplicationCredential::new("abcdef", "shhhh")),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_request_without_token() {
        let s = new_session("http://127.0.0.1:5000/v3");
        let url = s.token_endpoint().clone();
        assert_eq!(
            s.get(url).unwrap_err().kind(),
            ErrorKind::AuthenticationFailed
        );
    }

    #[test]
    fn test_request_with_token() {
        let mut s = new_session("http://127.0.0.1:5000/v3");
        s.set_token("abcd");
        let url = s.token_endpoint().clone();
        let req = s.get(url).unwrap().build().unwrap();
        assert_eq!(req.headers()["x-auth-token"], "abcd");
        assert_eq!(req.timeout(), Some(&DEFAULT_TIMEOUT));
    }

    #[test]
    fn test_debug_hides_token() {
        let mut s = new_session("http://127.0.0.1:5000/v3");
        s.set_token("very-secret-token");
        let repr = format!("{:?}", s);
        assert!(!repr.contains("very-secret-token"));
        assert!(!repr.contains("pa$$w0rd"));
    }

    #[tokio::test]
    async fn test_is_token_valid_without_token() {
        let s = new_session("http://127.0.0.1:5000/v3");
        assert!(!s.is_token_valid().await.unwrap());
    }

    #[tokio::test]
    async fn test_issue_token_unreachable() {
        // Nothing listens on the first privileged port.
        let mut s = new_session("http://127.0.0.1:1/v3");
        let err = s.issue_token().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
        assert!(!s.has_token());
    }

    #[tokio::test]
    async fn test_is_token_valid_unreachable() {
        let mut s = new_session("http://127.0.0.1:1/v3");
        s.set_token("abcd");
        let err = s.is_token_valid().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
        let err = s.ensure_valid().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
    }
}
