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

//! JSON structures and protocol bits for the metric measures API.

use log::{error, trace};
use serde_json::Value;

use super::super::{Error, Result};

/// One measure: `[timestamp, granularity, value]`.
pub type Measure = Vec<Value>;

/// Extract the value of the most recent measure.
pub fn last_measure(body: &[u8]) -> Result<f64> {
    let measures: Vec<Measure> = serde_json::from_slice(body).map_err(|e| {
        error!("Failed to decode measures: {}", e);
        Error::from(e)
    })?;
    trace!("Received {} measures", measures.len());

    let last = measures
        .last()
        .ok_or_else(|| Error::invalid_response("No measures returned"))?;
    match last.as_slice() {
        [_, _, value] => value.as_f64().ok_or_else(|| {
            error!("Measure value {} is not a number", value);
            Error::invalid_response(format!("Measure value {} is not a number", value))
        }),
        _ => {
            error!(
                "Unexpected measure {:?}, expected [timestamp, granularity, value]",
                last
            );
            Err(Error::invalid_response(format!(
                "Expected a measure of 3 elements, got {}",
                last.len()
            )))
        }
    }
}
