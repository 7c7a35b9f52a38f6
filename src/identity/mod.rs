// Copyright 2019-2020 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Authentication using Identity API v3.
//!
//! Currently supports [Password] and [ApplicationCredential] authentication.
//! Identity API v2 is not and will not be supported.

mod application_credential;
mod password;
pub(crate) mod protocol;

pub use self::application_credential::ApplicationCredential;
pub use self::password::Password;

pub(crate) const MISSING_SUBJECT_HEADER: &str = "Missing X-Subject-Token header";
pub(crate) const INVALID_SUBJECT_HEADER: &str = "Invalid X-Subject-Token header";

/// Credentials used to obtain a token.
///
/// Exactly one authentication method is always present.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// User ID and password, optionally scoped to a project.
    Password(Password),
    /// Application credential ID and secret.
    ApplicationCredential(ApplicationCredential),
}

impl Credentials {
    /// Name of the authentication method as understood by the Identity service.
    pub fn method(&self) -> &'static str {
        match self {
            Credentials::Password(..) => protocol::PASSWORD_METHOD,
            Credentials::ApplicationCredential(..) => protocol::APPLICATION_CREDENTIAL_METHOD,
        }
    }

    /// Request body for the token endpoint.
    pub(crate) fn auth_body(&self) -> protocol::AuthRoot {
        let auth = match self {
            Credentials::Password(ref pw) => pw.to_auth(),
            Credentials::ApplicationCredential(ref cred) => cred.to_auth(),
        };
        protocol::AuthRoot { auth }
    }
}

impl From<Password> for Credentials {
    fn from(value: Password) -> Credentials {
        Credentials::Password(value)
    }
}

impl From<ApplicationCredential> for Credentials {
    fn from(value: ApplicationCredential) -> Credentials {
        Credentials::ApplicationCredential(value)
    }
}
