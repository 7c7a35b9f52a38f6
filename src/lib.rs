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

//! OpenStack metric sources for external autoscalers.
//!
//! A [Scaler] authenticates against the identity service and exposes one
//! metric to an autoscaler through the [MetricSource] trait. Supported
//! metrics:
//!
//! * Aggregated [measures of a metric](metric/index.html) (feature `metric`)
//! * [Alarm state](alarm/index.html) (feature `alarm`)
//! * [Object count of a container](object_storage/index.html) (feature `object-storage`)
//!
//! # Example
//!
//! ```rust,no_run
//! use openstack_scaler::config::TriggerConfig;
//! use openstack_scaler::{MetricSource, Scaler};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> openstack_scaler::Result<()> {
//! let trigger = TriggerConfig::from_file("trigger.yaml")?;
//! let mut scaler = Scaler::from_trigger(reqwest::Client::new(), &trigger).await?;
//! let target = scaler.describe_target();
//! let sample = scaler
//!     .sample(&CancellationToken::new(), &target.metric_name)
//!     .await?;
//! println!("{} = {} (target {})", sample.name, sample.value, target.target_value);
//! # Ok(()) }
//! ```

#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
// Taken from https://github.com/rust-unofficial/patterns/
#![deny(
    dead_code,
    improper_ctypes,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_import_braces,
    unused_parens,
    unused_qualifications,
    unused_results,
    while_true
)]

#[macro_use]
extern crate serde_derive;

pub mod adapters;
#[cfg(feature = "alarm")]
pub mod alarm;
pub mod config;
mod error;
pub mod identity;
#[cfg(feature = "metric")]
pub mod metric;
#[cfg(feature = "object-storage")]
pub mod object_storage;
mod scaler;
pub mod session;
mod utils;

pub use crate::adapters::{AdapterKind, MetricAdapter};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::scaler::{MetricSample, MetricSource, MetricSpec, Scaler};
pub use crate::session::AuthSession;
pub use crate::utils::cancellable;
