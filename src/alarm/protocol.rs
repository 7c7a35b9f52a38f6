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

//! JSON structures and protocol bits for the alarming API.

#![allow(missing_docs)]

use log::error;
use serde::de::Error as DeserError;
use serde::{Deserialize, Deserializer};

use super::super::{Error, Result};

pub const OK_STATE: &str = "ok";
pub const INSUFFICIENT_DATA_STATE: &str = "insufficient data";
pub const ALARM_STATE: &str = "alarm";

#[derive(Clone, Debug, Deserialize)]
pub struct Alarm {
    #[serde(deserialize_with = "deser_bool_ish")]
    pub enabled: bool,
    pub state: String,
}

/// Deserialize a boolean that may also come as a string.
fn deser_bool_ish<'de, D>(des: D) -> ::std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolIsh {
        Bool(bool),
        String(String),
    }

    match BoolIsh::deserialize(des)? {
        BoolIsh::Bool(value) => Ok(value),
        BoolIsh::String(value) => match value.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(DeserError::custom(format!(
                "expected a boolean, got {:?}",
                value
            ))),
        },
    }
}

impl Alarm {
    /// Numeric value of the alarm: 0 when fine, 1 when alarming.
    pub fn value(&self) -> Result<f64> {
        if !self.enabled {
            return Err(Error::invalid_response(
                "Alarm is disabled and cannot be used for scaling",
            ));
        }

        match self.state.as_str() {
            OK_STATE | INSUFFICIENT_DATA_STATE => Ok(0.0),
            ALARM_STATE => Ok(1.0),
            other => {
                error!("Unexpected alarm state {:?}", other);
                Err(Error::invalid_response(format!(
                    "Unknown alarm state {:?}",
                    other
                )))
            }
        }
    }
}

/// Decode an alarm and compute its value.
pub fn alarm_value(body: &[u8]) -> Result<f64> {
    let alarm: Alarm = serde_json::from_slice(body).map_err(|e| {
        error!("Failed to decode alarm: {}", e);
        Error::from(e)
    })?;
    alarm.value()
}

#[cfg(test)]
pub mod test {
    use super::alarm_value;
    use crate::ErrorKind;

    #[test]
    fn test_alarm_states() {
        assert_eq!(
            alarm_value(br#"{"enabled": "true", "state": "alarm"}"#).unwrap(),
            1.0
        );
        assert_eq!(
            alarm_value(br#"{"enabled": "true", "state": "ok"}"#).unwrap(),
            0.0
        );
        assert_eq!(
            alarm_value(br#"{"enabled": true, "state": "insufficient data"}"#).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_alarm_full_payload() {
        let body = br#"{
            "alarm_id": "e2a7b7a8-8f3a-4b8e-9f1e-0b6a6b8a3c11",
            "name": "cpu_high",
            "type": "gnocchi_resources_threshold",
            "enabled": true,
            "state": "alarm",
            "severity": "low",
            "repeat_actions": false
        }"#;
        assert_eq!(alarm_value(body).unwrap(), 1.0);
    }

    #[test]
    fn test_alarm_disabled() {
        let err = alarm_value(br#"{"enabled": "false", "state": "alarm"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        let err = alarm_value(br#"{"enabled": false, "state": "ok"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_alarm_unknown_state() {
        let err = alarm_value(br#"{"enabled": "true", "state": "flapping"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_alarm_malformed() {
        for body in [
            &br#"{"state": "ok"}"#[..],
            &br#"{"enabled": "yes", "state": "ok"}"#[..],
            &br#"{"enabled": true}"#[..],
            &br#"[]"#[..],
        ] {
            let err = alarm_value(body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        }
    }
}
