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

//! Alarm state as a metric.
//!
//! An alarm in the `alarm` state is reported as `1`, an alarm in the `ok` or
//! `insufficient data` state as `0`. Disabled alarms are an error.

mod api;
mod protocol;

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Url;

use super::adapters::{AdapterKind, MetricAdapter};
use super::config;
use super::session::AuthSession;
use super::utils::url;
use super::Result;

/// Default target value.
pub const DEFAULT_THRESHOLD: i64 = 1;

/// Settings of the alarm adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmMetadata {
    /// Base URL of the alarms API, e.g. `http://localhost:8042/v2/alarms`.
    pub alarms_url: Url,
    /// Alarm ID.
    pub alarm_id: String,
    /// Target value per replica.
    pub threshold: i64,
}

impl AlarmMetadata {
    /// Parse trigger metadata.
    ///
    /// `alarmsURL` and `alarmID` are required, `threshold` defaults to
    /// [DEFAULT_THRESHOLD].
    pub fn from_trigger_metadata(metadata: &HashMap<String, String>) -> Result<AlarmMetadata> {
        let alarms_url = url::parse(config::required(metadata, "alarmsURL")?, "alarmsURL")?;
        let alarm_id = config::required(metadata, "alarmID")?.to_string();
        let threshold = config::parse_optional(metadata, "threshold")?.unwrap_or(DEFAULT_THRESHOLD);

        Ok(AlarmMetadata {
            alarms_url,
            alarm_id,
            threshold,
        })
    }
}

/// Adapter reporting the state of an alarm.
#[derive(Debug, Clone)]
pub struct AlarmStateAdapter {
    metadata: AlarmMetadata,
}

impl AlarmStateAdapter {
    /// Create an adapter.
    pub fn new(metadata: AlarmMetadata) -> AlarmStateAdapter {
        AlarmStateAdapter { metadata }
    }

    /// Create an adapter from trigger metadata.
    pub fn from_trigger_metadata(metadata: &HashMap<String, String>) -> Result<AlarmStateAdapter> {
        AlarmMetadata::from_trigger_metadata(metadata).map(AlarmStateAdapter::new)
    }

    /// Adapter settings.
    #[inline]
    pub fn metadata(&self) -> &AlarmMetadata {
        &self.metadata
    }
}

#[async_trait]
impl MetricAdapter for AlarmStateAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::AlarmState
    }

    fn identifier(&self) -> &str {
        &self.metadata.alarm_id
    }

    fn target_value(&self) -> f64 {
        self.metadata.threshold as f64
    }

    async fn read(&self, session: &AuthSession) -> Result<f64> {
        api::get_alarm_value(session, &self.metadata).await
    }
}
