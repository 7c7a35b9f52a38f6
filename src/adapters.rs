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

//! Adapters turning OpenStack API responses into metric values.

use std::fmt;
use std::fmt::Write;

use async_trait::async_trait;

use super::session::AuthSession;
use super::Result;

/// Kind of a metric adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    /// Aggregated measures of a metric.
    Measures,
    /// State of an alarm.
    AlarmState,
    /// Number of objects in an object storage container.
    ContainerObjectCount,
}

impl AdapterKind {
    /// Prefix of metric names produced by this kind.
    pub fn metric_prefix(&self) -> &'static str {
        match self {
            AdapterKind::Measures => "openstack-metric",
            AdapterKind::AlarmState => "openstack-alarm",
            AdapterKind::ContainerObjectCount => "swift",
        }
    }

    /// Derive a metric name for the given identifier.
    ///
    /// Lower case letters, digits and dashes are kept as they are. Every other
    /// byte is written as a dot followed by two hex digits, so two different
    /// identifiers never produce the same name.
    pub fn metric_name<S: AsRef<str>>(&self, identifier: S) -> String {
        let identifier = identifier.as_ref();
        let mut result = String::with_capacity(self.metric_prefix().len() + identifier.len() + 1);
        result.push_str(self.metric_prefix());
        result.push('-');
        for byte in identifier.bytes() {
            match byte {
                b'a'..=b'z' | b'0'..=b'9' | b'-' => result.push(char::from(byte)),
                // Writing to a String cannot fail.
                _ => {
                    let _ = write!(result, ".{:02x}", byte);
                }
            }
        }
        result
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            AdapterKind::Measures => "measures",
            AdapterKind::AlarmState => "alarm state",
            AdapterKind::ContainerObjectCount => "container object count",
        })
    }
}

/// A source of a single numeric value read from an OpenStack service.
///
/// Implementations must only be called with a session holding a token; the
/// [Scaler](../scaler/struct.Scaler.html) takes care of validating it first.
#[async_trait]
pub trait MetricAdapter: fmt::Debug + Send + Sync {
    /// Kind of this adapter.
    fn kind(&self) -> AdapterKind;

    /// Identifier distinguishing this adapter from others of the same kind.
    fn identifier(&self) -> &str;

    /// Desired value of the metric per replica.
    fn target_value(&self) -> f64;

    /// Read the current value.
    async fn read(&self, session: &AuthSession) -> Result<f64>;

    /// Name of the metric exposed to the host.
    fn metric_name(&self) -> String {
        self.kind().metric_name(self.identifier())
    }
}

#[async_trait]
impl<T: MetricAdapter + ?Sized> MetricAdapter for Box<T> {
    fn kind(&self) -> AdapterKind {
        (**self).kind()
    }

    fn identifier(&self) -> &str {
        (**self).identifier()
    }

    fn target_value(&self) -> f64 {
        (**self).target_value()
    }

    async fn read(&self, session: &AuthSession) -> Result<f64> {
        (**self).read(session).await
    }

    fn metric_name(&self) -> String {
        (**self).metric_name()
    }
}
