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

//! Foundation bits exposing the metric measures API.

use chrono::{DateTime, SecondsFormat, TimeDelta, Timelike, Utc};
use log::{debug, trace};
use reqwest::Url;

use super::super::session::AuthSession;
use super::super::utils::{self, url};
use super::super::Result;
use super::protocol;
use super::MeasuresMetadata;

/// Smallest granularity sent to the server.
pub const MIN_GRANULARITY: u32 = 2;

/// Granularity actually requested.
#[inline]
pub fn effective_granularity(granularity: u32) -> u32 {
    granularity.max(MIN_GRANULARITY)
}

/// Start of the query window.
///
/// One granularity back from `now`, truncated to the minute, so that the most
/// recent aggregation window is always included.
pub fn window_start(now: DateTime<Utc>, granularity: u32) -> String {
    let start = now
        .checked_sub_signed(TimeDelta::seconds(i64::from(granularity)))
        .unwrap_or(now);
    let start = start
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(start);
    start.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// URL of the measures of the configured metric.
pub fn measures_url(metadata: &MeasuresMetadata) -> Url {
    url::extend(
        metadata.metrics_url.clone(),
        [metadata.metric_id.as_str(), "measures"],
    )
}

/// Fetch the most recent measure of a metric.
pub async fn get_last_measure(
    session: &AuthSession,
    metadata: &MeasuresMetadata,
    now: DateTime<Utc>,
) -> Result<f64> {
    let granularity = effective_granularity(metadata.granularity);
    let start = window_start(now, granularity);
    let url = measures_url(metadata);
    debug!(
        "Fetching {} measures of metric {} since {}",
        metadata.aggregation_method, metadata.metric_id, start
    );
    let resp = session
        .get(url)?
        .query(&[
            ("granularity", granularity.to_string()),
            ("aggregation", metadata.aggregation_method.clone()),
            ("start", start),
        ])
        .send()
        .await?;
    let body = utils::check_status(resp).await?.bytes().await?;
    let value = protocol::last_measure(&body)?;
    trace!("Metric {} has value {}", metadata.metric_id, value);
    Ok(value)
}

#[cfg(test)]
pub mod test {
    #![allow(missing_docs)]

    use chrono::{TimeZone, Utc};

    use super::{effective_granularity, window_start};

    #[test]
    fn test_effective_granularity() {
        assert_eq!(effective_granularity(0), 2);
        assert_eq!(effective_granularity(1), 2);
        assert_eq!(effective_granularity(2), 2);
        assert_eq!(effective_granularity(300), 300);
    }

    #[test]
    fn test_window_start() {
        let now = Utc.with_ymd_and_hms(2021, 5, 10, 10, 7, 42).unwrap();
        assert_eq!(window_start(now, 300), "2021-05-10T10:02:00Z");
        assert_eq!(window_start(now, 2), "2021-05-10T10:07:00Z");
        assert_eq!(window_start(now, 60), "2021-05-10T10:06:00Z");
    }

    #[test]
    fn test_window_start_crosses_midnight() {
        let now = Utc.with_ymd_and_hms(2021, 5, 10, 0, 0, 30).unwrap();
        assert_eq!(window_start(now, 3600), "2021-05-09T23:00:00Z");
    }
}
