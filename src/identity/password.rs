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

//! Password authentication.

use std::fmt;

use static_assertions::assert_impl_all;

use super::protocol;

/// Password authentication using Identity API V3.
///
/// Users are always referenced by ID. The token is scoped to a project only
/// when a project ID is provided:
///
/// ```rust
/// use openstack_scaler::identity::Password;
///
/// let auth = Password::new("1f0c2781b4114d13a44b8898f85340be", "pa$$w0rd")
///     .with_project_id("b161dc518cd24bda84d94d9a0e73fc87");
/// assert_eq!(auth.project_id(), Some("b161dc518cd24bda84d94d9a0e73fc87"));
/// ```
#[derive(Clone)]
pub struct Password {
    user_id: String,
    password: String,
    project_id: Option<String>,
}

assert_impl_all!(Password: Send, Sync);

impl Password {
    /// Create a password authentication.
    pub fn new<S1, S2>(user_id: S1, password: S2) -> Password
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Password {
            user_id: user_id.into(),
            password: password.into(),
            project_id: None,
        }
    }

    /// Scope authentication to the given project.
    #[inline]
    pub fn set_project_id<S: Into<String>>(&mut self, project_id: S) {
        self.project_id = Some(project_id.into());
    }

    /// Scope authentication to the given project.
    ///
    /// A convenience wrapper around `set_project_id`.
    #[inline]
    pub fn with_project_id<S: Into<String>>(mut self, project_id: S) -> Password {
        self.set_project_id(project_id);
        self
    }

    /// User ID.
    #[inline]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Project ID (if project scoped).
    #[inline]
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub(crate) fn to_auth(&self) -> protocol::Auth {
        protocol::Auth {
            identity: protocol::Identity::Password(protocol::PasswordAuth {
                user: protocol::User {
                    id: self.user_id.clone(),
                    password: self.password.clone(),
                },
            }),
            scope: self.project_id.as_ref().map(|id| protocol::Scope {
                project: protocol::Project { id: id.clone() },
            }),
        }
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Password")
            .field("user_id", &self.user_id)
            .field("password", &"***")
            .field("project_id", &self.project_id)
            .finish()
    }
}
