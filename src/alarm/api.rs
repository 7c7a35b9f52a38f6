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

//! Foundation bits exposing the alarming API.

use log::{debug, trace};
use reqwest::Url;

use super::super::session::AuthSession;
use super::super::utils::{self, url};
use super::super::Result;
use super::protocol;
use super::AlarmMetadata;

/// URL of the configured alarm.
pub fn alarm_url(metadata: &AlarmMetadata) -> Url {
    url::extend(metadata.alarms_url.clone(), [metadata.alarm_id.as_str()])
}

/// Fetch an alarm and convert its state into a number.
pub async fn get_alarm_value(session: &AuthSession, metadata: &AlarmMetadata) -> Result<f64> {
    debug!("Fetching state of alarm {}", metadata.alarm_id);
    let resp = session.get(alarm_url(metadata))?.send().await?;
    let body = utils::check_status(resp).await?.bytes().await?;
    let value = protocol::alarm_value(&body)?;
    trace!("Alarm {} has value {}", metadata.alarm_id, value);
    Ok(value)
}
