// Copyright 2023 Matt Williams <matt@milliams.com>
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

//! Application Credential authentication.

use std::fmt;

use static_assertions::assert_impl_all;

use super::protocol;

/// Application Credential authentication using Identity API V3.
///
/// You need the application credential ID and its secret. Application
/// credentials are always bound to the project they were created in, so no
/// scope is ever sent.
#[derive(Clone)]
pub struct ApplicationCredential {
    id: String,
    secret: String,
}

assert_impl_all!(ApplicationCredential: Send, Sync);

impl ApplicationCredential {
    /// Create an application credential authentication.
    pub fn new<S1, S2>(id: S1, secret: S2) -> ApplicationCredential
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        ApplicationCredential {
            id: id.into(),
            secret: secret.into(),
        }
    }

    /// Application credential ID.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn to_auth(&self) -> protocol::Auth {
        protocol::Auth {
            identity: protocol::Identity::ApplicationCredential(protocol::ApplicationCredential {
                id: self.id.clone(),
                secret: self.secret.clone(),
            }),
            scope: None,
        }
    }
}

impl fmt::Debug for ApplicationCredential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ApplicationCredential")
            .field("id", &self.id)
            .field("secret", &"***")
            .finish()
    }
}
