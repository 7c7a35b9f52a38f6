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

//! Scaler: a metric source bound to one adapter and one session.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, trace};
use reqwest::Client;
use static_assertions::assert_impl_all;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "alarm")]
use super::alarm::AlarmStateAdapter;
use super::adapters::MetricAdapter;
use super::config::{TriggerConfig, TriggerType};
#[cfg(feature = "metric")]
use super::metric::MeasuresAdapter;
#[cfg(feature = "object-storage")]
use super::object_storage::ContainerAdapter;
use super::session::AuthSession;
use super::utils;
use super::{Error, Result};

/// Metric exposed to the host with its target value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSpec {
    /// Metric name.
    pub metric_name: String,
    /// Target value per replica.
    pub target_value: f64,
}

/// One observed value of a metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    /// Metric name.
    pub name: String,
    /// Observed value.
    pub value: f64,
    /// Time of the observation.
    pub timestamp: DateTime<Utc>,
}

/// Contract between an autoscaler and a metric source.
#[async_trait]
pub trait MetricSource: Send {
    /// Metric exposed by this source and its target.
    fn describe_target(&self) -> MetricSpec;

    /// Observe the current value of the metric.
    async fn sample(&mut self, cancel: &CancellationToken, name: &str) -> Result<MetricSample>;

    /// Whether the observed value is above zero.
    async fn is_active(&mut self, cancel: &CancellationToken) -> Result<bool>;

    /// Release the source.
    async fn close(&mut self) -> Result<()>;
}

/// Metric source reading one adapter through an authenticated session.
///
/// A scaler always holds a session with an issued token. Every sample first
/// makes sure the token is still valid, re-authenticating if needed, and then
/// reads the adapter once.
#[derive(Debug)]
pub struct Scaler<A: MetricAdapter = Box<dyn MetricAdapter>> {
    session: AuthSession,
    adapter: A,
}

assert_impl_all!(Scaler: Send, Sync);

impl<A: MetricAdapter> Scaler<A> {
    /// Create a scaler, authenticating the session.
    pub async fn new(mut session: AuthSession, adapter: A) -> Result<Scaler<A>> {
        let _ = session.issue_token().await?;
        debug!("Created a scaler for {}", adapter.metric_name());
        Ok(Scaler { session, adapter })
    }

    /// Session used by this scaler.
    #[inline]
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Adapter used by this scaler.
    #[inline]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }
}

impl Scaler {
    /// Create a scaler from a trigger definition.
    ///
    /// All settings are validated before contacting the identity service.
    pub async fn from_trigger(client: Client, trigger: &TriggerConfig) -> Result<Scaler> {
        let adapter = adapter_from_trigger(trigger)?;
        let timeout = trigger.timeout()?;
        let session = trigger.auth()?.into_session(client)?.with_timeout(timeout);
        Scaler::new(session, adapter).await
    }
}

fn adapter_from_trigger(trigger: &TriggerConfig) -> Result<Box<dyn MetricAdapter>> {
    Ok(match trigger.trigger_type {
        #[cfg(feature = "metric")]
        TriggerType::Metric => Box::new(MeasuresAdapter::from_trigger_metadata(
            &trigger.metadata,
        )?),
        #[cfg(feature = "alarm")]
        TriggerType::Alarm => Box::new(AlarmStateAdapter::from_trigger_metadata(
            &trigger.metadata,
        )?),
        #[cfg(feature = "object-storage")]
        TriggerType::Swift => Box::new(ContainerAdapter::from_trigger_metadata(
            &trigger.metadata,
        )?),
        #[allow(unreachable_patterns)]
        other => {
            return Err(Error::invalid_config(format!(
                "Trigger type {:?} is not enabled",
                other
            )))
        }
    })
}

#[async_trait]
impl<A: MetricAdapter> MetricSource for Scaler<A> {
    fn describe_target(&self) -> MetricSpec {
        MetricSpec {
            metric_name: self.adapter.metric_name(),
            target_value: self.adapter.target_value(),
        }
    }

    async fn sample(&mut self, cancel: &CancellationToken, name: &str) -> Result<MetricSample> {
        let session = &mut self.session;
        let adapter = &self.adapter;
        let value = utils::cancellable(cancel, async move {
            let _ = session.ensure_valid().await?;
            adapter.read(session).await
        })
        .await?;
        trace!("Metric {} has value {}", name, value);
        Ok(MetricSample {
            name: name.to_string(),
            value,
            timestamp: Utc::now(),
        })
    }

    async fn is_active(&mut self, cancel: &CancellationToken) -> Result<bool> {
        let name = self.adapter.metric_name();
        Ok(self.sample(cancel, &name).await?.value > 0.0)
    }

    async fn close(&mut self) -> Result<()> {
        debug!("Closing the scaler for {}", self.adapter.metric_name());
        Ok(())
    }
}
