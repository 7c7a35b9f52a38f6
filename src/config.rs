// Copyright 2018 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Support for trigger configuration.
//!
//! A trigger is described by its type, a metadata map with adapter settings
//! and a map of authentication parameters:
//!
//! ```yaml
//! type: openstack-swift
//! metadata:
//!   swiftURL: http://10.100.26.100:8080/v1/AUTH_b161dc518cd24bda84d94d9a0e73fc87
//!   containerName: my-container
//!   objectCount: 5
//! authParams:
//!   authURL: http://10.100.26.100:5000/v3/
//!   userID: 1f0c2781b4114d13a44b8898f85340be
//!   password: adminPass
//!   projectID: b161dc518cd24bda84d94d9a0e73fc87
//! ```

use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Client;
use serde::de::Error as DeserError;
use serde::{Deserialize, Deserializer};

use super::identity::{ApplicationCredential, Credentials, Password};
use super::session::{AuthSession, DEFAULT_TIMEOUT};
use super::utils::url;
use super::{Error, Result};

/// Key of the request time out (in seconds) in the trigger metadata.
pub const TIMEOUT_KEY: &str = "timeout";

const ENV_MAPPING: &[(&str, &str)] = &[
    ("OS_AUTH_URL", "authURL"),
    ("OS_USER_ID", "userID"),
    ("OS_PASSWORD", "password"),
    ("OS_PROJECT_ID", "projectID"),
    ("OS_APPLICATION_CREDENTIAL_ID", "appCredentialID"),
    ("OS_APPLICATION_CREDENTIAL_SECRET", "appCredentialSecret"),
];

/// Type of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TriggerType {
    /// Aggregated measures of a metric.
    #[serde(rename = "openstack-metric")]
    Metric,
    /// State of an alarm.
    #[serde(rename = "openstack-alarm")]
    Alarm,
    /// Object count of a Swift container.
    #[serde(rename = "openstack-swift")]
    Swift,
}

/// Trigger definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerConfig {
    /// Trigger type.
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    /// Adapter settings.
    #[serde(default, deserialize_with = "deser_string_map")]
    pub metadata: HashMap<String, String>,
    /// Authentication parameters.
    #[serde(default, deserialize_with = "deser_string_map")]
    pub auth_params: HashMap<String, String>,
}

/// Identity endpoint and credentials.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Identity endpoint including the API version.
    pub auth_url: String,
    /// Credentials to authenticate with.
    pub credentials: Credentials,
}

impl TriggerConfig {
    /// Load a trigger from a YAML string.
    pub fn from_yaml_str<S: AsRef<str>>(value: S) -> Result<TriggerConfig> {
        serde_yaml::from_str(value.as_ref())
            .map_err(|e| Error::invalid_config(format!("Cannot parse trigger: {}", e)))
    }

    /// Load a trigger from a YAML reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<TriggerConfig> {
        serde_yaml::from_reader(reader)
            .map_err(|e| Error::invalid_config(format!("Cannot parse trigger: {}", e)))
    }

    /// Load a trigger from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<TriggerConfig> {
        let path = path.as_ref();
        debug!("Loading trigger from {:?}", path);
        let file = File::open(path)
            .map_err(|e| Error::invalid_config(format!("Cannot read {:?}: {}", path, e)))?;
        TriggerConfig::from_reader(file)
    }

    /// Authentication configuration of this trigger.
    #[inline]
    pub fn auth(&self) -> Result<AuthConfig> {
        AuthConfig::from_auth_params(&self.auth_params)
    }

    /// Request time out of this trigger.
    #[inline]
    pub fn timeout(&self) -> Result<Duration> {
        timeout(&self.metadata)
    }
}

impl AuthConfig {
    /// Parse authentication parameters.
    ///
    /// `appCredentialID` selects application credentials, otherwise `userID`
    /// must be present. `projectID` is optional for password authentication.
    pub fn from_auth_params(params: &HashMap<String, String>) -> Result<AuthConfig> {
        let auth_url = required(params, "authURL")?;
        let _ = url::parse(auth_url, "authURL")?;

        let credentials = if let Some(id) = optional(params, "appCredentialID") {
            let secret = required(params, "appCredentialSecret")?;
            Credentials::from(ApplicationCredential::new(id, secret))
        } else if let Some(user_id) = optional(params, "userID") {
            let password = required(params, "password")?;
            let mut pw = Password::new(user_id, password);
            if let Some(project_id) = optional(params, "projectID") {
                pw.set_project_id(project_id);
            }
            Credentials::from(pw)
        } else {
            return Err(Error::invalid_config(
                "neither userID nor appCredentialID was provided",
            ));
        };

        Ok(AuthConfig {
            auth_url: auth_url.to_string(),
            credentials,
        })
    }

    /// Read authentication parameters from `OS_*` environment variables.
    pub fn from_env() -> Result<AuthConfig> {
        let mut params = HashMap::new();
        for (var, key) in ENV_MAPPING {
            match env::var(var) {
                Ok(value) => {
                    let _ = params.insert(key.to_string(), value);
                }
                Err(env::VarError::NotUnicode(..)) => {
                    warn!("Ignoring {} with a non-unicode value", var)
                }
                Err(env::VarError::NotPresent) => {}
            }
        }
        AuthConfig::from_auth_params(&params)
    }

    /// Create a session with these credentials.
    pub fn into_session(self, client: Client) -> Result<AuthSession> {
        AuthSession::new(client, self.auth_url, self.credentials)
    }
}

/// Request time out from the trigger metadata.
pub fn timeout(metadata: &HashMap<String, String>) -> Result<Duration> {
    match parse_optional::<u64>(metadata, TIMEOUT_KEY)? {
        Some(0) => Err(Error::invalid_config("timeout must be positive")),
        Some(secs) => Ok(Duration::from_secs(secs)),
        None => Ok(DEFAULT_TIMEOUT),
    }
}

/// Get a required non-empty value.
pub(crate) fn required<'m>(map: &'m HashMap<String, String>, key: &str) -> Result<&'m str> {
    optional(map, key).ok_or_else(|| Error::invalid_config(format!("no {} given", key)))
}

/// Get an optional value, treating empty strings as missing.
pub(crate) fn optional<'m>(map: &'m HashMap<String, String>, key: &str) -> Option<&'m str> {
    map.get(key).map(String::as_str).filter(|s| !s.is_empty())
}

/// Parse a required value.
pub(crate) fn parse_required<T>(map: &HashMap<String, String>, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    parse_value(key, required(map, key)?)
}

/// Parse an optional value.
pub(crate) fn parse_optional<T>(map: &HashMap<String, String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    optional(map, key)
        .map(|value| parse_value(key, value))
        .transpose()
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::invalid_config(format!("{} parsing error: {}", key, e)))
}

/// Deserialize a map of scalars into a map of strings.
fn deser_string_map<'de, D>(des: D) -> ::std::result::Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: HashMap<String, serde_yaml::Value> = Deserialize::deserialize(des)?;
    value
        .into_iter()
        .map(|(key, item)| {
            let item = match item {
                serde_yaml::Value::String(s) => s,
                serde_yaml::Value::Number(n) => n.to_string(),
                serde_yaml::Value::Bool(b) => b.to_string(),
                serde_yaml::Value::Null => String::new(),
                _ => {
                    return Err(DeserError::custom(format!(
                        "value of {} must be a scalar",
                        key
                    )))
                }
            };
            Ok((key, item))
        })
        .collect()
}

#[cfg(test)]
pub mod test {
    #![allow(missing_docs, unused_results)]

    use std::collections::HashMap;
    use std::env;
    use std::io::Write;
    use std::time::Duration;

    use serial_test::serial;
    use tempfile::NamedTempFile;

    use super::{timeout, AuthConfig, TriggerConfig, TriggerType};
    use crate::identity::Credentials;
    use crate::session::DEFAULT_TIMEOUT;
    use crate::ErrorKind;

    pub fn map(items: &[(&str, &str)]) -> HashMap<String, String> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_password_auth() {
        let auth = AuthConfig::from_auth_params(&map(&[
            ("userID", "my-id"),
            ("password", "my-password"),
            ("projectID", "my-project-id"),
            ("authURL", "http://localhost:5000/v3/"),
        ]))
        .unwrap();
        assert_eq!(auth.auth_url, "http://localhost:5000/v3/");
        match auth.credentials {
            Credentials::Password(pw) => {
                assert_eq!(pw.user_id(), "my-id");
                assert_eq!(pw.project_id(), Some("my-project-id"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_password_auth_without_project() {
        let auth = AuthConfig::from_auth_params(&map(&[
            ("userID", "my-id"),
            ("password", "my-password"),
            ("authURL", "http://localhost:5000/v3/"),
        ]))
        .unwrap();
        match auth.credentials {
            Credentials::Password(pw) => assert_eq!(pw.project_id(), None),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_application_credential_auth() {
        let auth = AuthConfig::from_auth_params(&map(&[
            ("appCredentialID", "my-app-credential-id"),
            ("appCredentialSecret", "my-app-credential-secret"),
            ("authURL", "http://localhost:5000/v3/"),
        ]))
        .unwrap();
        match auth.credentials {
            Credentials::ApplicationCredential(cred) => {
                assert_eq!(cred.id(), "my-app-credential-id")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_application_credential_wins() {
        let auth = AuthConfig::from_auth_params(&map(&[
            ("appCredentialID", "my-app-credential-id"),
            ("appCredentialSecret", "my-app-credential-secret"),
            ("userID", "my-id"),
            ("authURL", "http://localhost:5000/v3/"),
        ]))
        .unwrap();
        assert_eq!(auth.credentials.method(), "application_credential");
    }

    #[test]
    fn test_invalid_auth_params() {
        let cases = [
            // missing userID
            map(&[
                ("password", "my-password"),
                ("projectID", "my-project-id"),
                ("authURL", "http://localhost:5000/v3/"),
            ]),
            // missing password
            map(&[
                ("userID", "my-id"),
                ("projectID", "my-project-id"),
                ("authURL", "http://localhost:5000/v3/"),
            ]),
            // missing authURL
            map(&[
                ("userID", "my-id"),
                ("password", "my-password"),
                ("projectID", "my-project-id"),
            ]),
            // missing appCredentialID
            map(&[
                ("appCredentialSecret", "my-app-credential-secret"),
                ("authURL", "http://localhost:5000/v3/"),
            ]),
            // missing appCredentialSecret
            map(&[
                ("appCredentialID", "my-app-credential-id"),
                ("authURL", "http://localhost:5000/v3/"),
            ]),
            // empty appCredentialSecret
            map(&[
                ("appCredentialID", "my-app-credential-id"),
                ("appCredentialSecret", ""),
                ("authURL", "http://localhost:5000/v3/"),
            ]),
            // invalid authURL
            map(&[
                ("userID", "my-id"),
                ("password", "my-password"),
                ("authURL", "localhost:5000 v3"),
            ]),
        ];
        for params in cases.iter() {
            let err = AuthConfig::from_auth_params(params).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfig, "{:?}", params);
        }
    }

    #[test]
    fn test_timeout() {
        assert_eq!(timeout(&map(&[])).unwrap(), DEFAULT_TIMEOUT);
        assert_eq!(
            timeout(&map(&[("timeout", "30")])).unwrap(),
            Duration::from_secs(30)
        );
        assert!(timeout(&map(&[("timeout", "2.5")])).is_err());
        assert!(timeout(&map(&[("timeout", "0")])).is_err());
    }

    #[test]
    fn test_trigger_from_yaml() {
        let trigger = TriggerConfig::from_yaml_str(
            r#"
type: openstack-swift
metadata:
  swiftURL: http://localhost:8080/v1/my-account-id
  containerName: my-container
  objectCount: 5
  onlyFiles: true
authParams:
  appCredentialID: my-app-credential-id
  appCredentialSecret: my-app-credential-secret
  authURL: http://localhost:5000/v3/
"#,
        )
        .unwrap();
        assert_eq!(trigger.trigger_type, TriggerType::Swift);
        assert_eq!(trigger.metadata["objectCount"], "5");
        assert_eq!(trigger.metadata["onlyFiles"], "true");
        assert_eq!(trigger.timeout().unwrap(), DEFAULT_TIMEOUT);
        assert_eq!(
            trigger.auth().unwrap().credentials.method(),
            "application_credential"
        );
    }

    #[test]
    fn test_trigger_unknown_type() {
        let err = TriggerConfig::from_yaml_str("type: openstack-nova\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_trigger_nested_metadata() {
        let err = TriggerConfig::from_yaml_str(
            "type: openstack-alarm\nmetadata:\n  alarmID:\n    - a\n",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    const ENV_VARS: &[&str] = &[
        "OS_AUTH_URL",
        "OS_USER_ID",
        "OS_PASSWORD",
        "OS_PROJECT_ID",
        "OS_APPLICATION_CREDENTIAL_ID",
        "OS_APPLICATION_CREDENTIAL_SECRET",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], check: F) {
        for var in ENV_VARS {
            env::remove_var(var);
        }
        for (var, value) in vars {
            env::set_var(var, value);
        }
        check();
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_password() {
        with_env(
            &[
                ("OS_AUTH_URL", "http://localhost:5000/v3"),
                ("OS_USER_ID", "my-id"),
                ("OS_PASSWORD", "my-password"),
                ("OS_PROJECT_ID", "my-project-id"),
            ],
            || {
                let auth = AuthConfig::from_env().unwrap();
                assert_eq!(auth.auth_url, "http://localhost:5000/v3");
                match auth.credentials {
                    Credentials::Password(pw) => {
                        assert_eq!(pw.user_id(), "my-id");
                        assert_eq!(pw.project_id(), Some("my-project-id"));
                    }
                    other => panic!("unexpected credentials {:?}", other),
                }
            },
        );
    }

    #[test]
    #[serial]
    fn test_from_env_application_credential() {
        with_env(
            &[
                ("OS_AUTH_URL", "http://localhost:5000/v3"),
                ("OS_APPLICATION_CREDENTIAL_ID", "app-id"),
                ("OS_APPLICATION_CREDENTIAL_SECRET", "app-secret"),
            ],
            || {
                let auth = AuthConfig::from_env().unwrap();
                match auth.credentials {
                    Credentials::ApplicationCredential(cred) => {
                        assert_eq!(cred.id(), "app-id");
                    }
                    other => panic!("unexpected credentials {:?}", other),
                }
            },
        );
    }

    #[test]
    #[serial]
    fn test_from_env_without_credentials() {
        with_env(&[("OS_AUTH_URL", "http://localhost:5000/v3")], || {
            let err = AuthConfig::from_env().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        });
    }

    const SWIFT_TRIGGER: &str = r#"
type: openstack-swift
metadata:
  swiftURL: http://localhost:8080/v1/AUTH_account
  containerName: my-container
  timeout: 10
authParams:
  authURL: http://localhost:5000/v3
  userID: my-id
  password: my-password
"#;

    #[test]
    fn test_trigger_from_reader() {
        let trigger = TriggerConfig::from_reader(SWIFT_TRIGGER.as_bytes()).unwrap();
        assert_eq!(trigger.trigger_type, TriggerType::Swift);
        assert_eq!(trigger.metadata["containerName"], "my-container");
        assert_eq!(trigger.timeout().unwrap(), Duration::from_secs(10));
        assert_eq!(trigger.auth().unwrap().credentials.method(), "password");
    }

    #[test]
    fn test_trigger_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SWIFT_TRIGGER.as_bytes()).unwrap();
        let trigger = TriggerConfig::from_file(file.path()).unwrap();
        assert_eq!(trigger.metadata["swiftURL"], "http://localhost:8080/v1/AUTH_account");
    }

    #[test]
    fn test_trigger_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TriggerConfig::from_file(dir.path().join("missing.yaml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
