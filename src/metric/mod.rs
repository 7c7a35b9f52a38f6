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

//! Aggregated measures of a metric.
//!
//! The adapter asks the metric service for measures of one metric over the
//! last aggregation window and reports the most recent one.

mod api;
mod protocol;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Url;

use super::adapters::{AdapterKind, MetricAdapter};
use super::config;
use super::session::AuthSession;
use super::utils::url;
use super::{Error, Result};

pub use self::api::MIN_GRANULARITY;

/// Settings of the measures adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuresMetadata {
    /// Base URL of the metric API, e.g. `http://localhost:8041/v1/metric`.
    pub metrics_url: Url,
    /// Metric ID.
    pub metric_id: String,
    /// Aggregation method, e.g. `mean`.
    pub aggregation_method: String,
    /// Width of an aggregation window in seconds.
    pub granularity: u32,
    /// Target value per replica.
    pub threshold: f64,
}

impl MeasuresMetadata {
    /// Parse trigger metadata.
    ///
    /// All of `metricsURL`, `metricID`, `aggregationMethod`, `granularity`
    /// and `threshold` are required.
    pub fn from_trigger_metadata(metadata: &HashMap<String, String>) -> Result<MeasuresMetadata> {
        let metrics_url = url::parse(config::required(metadata, "metricsURL")?, "metricsURL")?;
        let metric_id = config::required(metadata, "metricID")?.to_string();
        let aggregation_method = config::required(metadata, "aggregationMethod")?.to_string();
        let granularity = config::parse_required(metadata, "granularity")?;
        let threshold = config::parse_required::<f64>(metadata, "threshold")?;
        if !threshold.is_finite() {
            return Err(Error::invalid_config("threshold must be a finite number"));
        }

        Ok(MeasuresMetadata {
            metrics_url,
            metric_id,
            aggregation_method,
            granularity,
            threshold,
        })
    }
}

/// Adapter reporting the latest aggregated measure of a metric.
#[derive(Debug, Clone)]
pub struct MeasuresAdapter {
    metadata: MeasuresMetadata,
}

impl MeasuresAdapter {
    /// Create an adapter.
    pub fn new(metadata: MeasuresMetadata) -> MeasuresAdapter {
        MeasuresAdapter { metadata }
    }

    /// Create an adapter from trigger metadata.
    pub fn from_trigger_metadata(metadata: &HashMap<String, String>) -> Result<MeasuresAdapter> {
        MeasuresMetadata::from_trigger_metadata(metadata).map(MeasuresAdapter::new)
    }

    /// Adapter settings.
    #[inline]
    pub fn metadata(&self) -> &MeasuresMetadata {
        &self.metadata
    }
}

#[async_trait]
impl MetricAdapter for MeasuresAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Measures
    }

    fn identifier(&self) -> &str {
        &self.metadata.metric_id
    }

    fn target_value(&self) -> f64 {
        self.metadata.threshold
    }

    async fn read(&self, session: &AuthSession) -> Result<f64> {
        api::get_last_measure(session, &self.metadata, Utc::now()).await
    }
}
