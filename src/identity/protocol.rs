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

//! JSON structures and protocol bits for the Identity V3 API.

#![allow(missing_docs)]

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

pub const PASSWORD_METHOD: &str = "password";
pub const APPLICATION_CREDENTIAL_METHOD: &str = "application_credential";

#[derive(Clone, Debug, Serialize)]
pub struct User {
    pub id: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct PasswordAuth {
    pub user: User,
}

#[derive(Clone, Debug, Serialize)]
pub struct ApplicationCredential {
    pub id: String,
    pub secret: String,
}

/// Identity part of the token request.
///
/// Serialized as `{"methods": [<method>], <method>: {...}}`.
#[derive(Clone, Debug)]
pub enum Identity {
    Password(PasswordAuth),
    ApplicationCredential(ApplicationCredential),
}

#[derive(Clone, Debug, Serialize)]
pub struct Project {
    pub id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Scope {
    pub project: Project,
}

#[derive(Clone, Debug, Serialize)]
pub struct Auth {
    pub identity: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AuthRoot {
    pub auth: Auth,
}

impl Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut inner = serializer.serialize_struct("Identity", 2)?;
        match self {
            Identity::Password(ref pw) => {
                inner.serialize_field("methods", &[PASSWORD_METHOD])?;
                inner.serialize_field(PASSWORD_METHOD, pw)?;
            }
            Identity::ApplicationCredential(ref cred) => {
                inner.serialize_field("methods", &[APPLICATION_CREDENTIAL_METHOD])?;
                inner.serialize_field(APPLICATION_CREDENTIAL_METHOD, cred)?;
            }
        }
        inner.end()
    }
}
