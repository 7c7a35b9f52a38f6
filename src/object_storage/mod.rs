// Copyright 2019 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Number of objects in an object storage container.
//!
//! By default the count is taken from the container headers. Setting any of
//! the listing filters switches to counting the entries of a plain-text
//! container listing.

mod api;
mod protocol;

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Url;

use super::adapters::{AdapterKind, MetricAdapter};
use super::config;
use super::session::AuthSession;
use super::utils::url;
use super::{Error, Result};

/// Default target object count.
pub const DEFAULT_OBJECT_COUNT: i64 = 2;

/// Settings of the container adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerMetadata {
    /// Account URL of the object storage, e.g. `http://localhost:8080/v1/AUTH_abc`.
    pub swift_url: Url,
    /// Container name.
    pub container_name: String,
    /// Target object count per replica.
    pub object_count: i64,
    /// Only count objects with this prefix.
    pub object_prefix: Option<String>,
    /// Roll up names sharing a prefix up to this delimiter.
    pub object_delimiter: Option<String>,
    /// Maximum number of listed objects.
    pub object_limit: Option<u32>,
    /// Skip pseudo-folders.
    pub only_files: bool,
}

impl ContainerMetadata {
    /// Parse trigger metadata.
    pub fn from_trigger_metadata(metadata: &HashMap<String, String>) -> Result<ContainerMetadata> {
        let swift_url = url::parse(config::required(metadata, "swiftURL")?, "swiftURL")?;
        let container_name = config::required(metadata, "containerName")?.to_string();
        let object_count =
            config::parse_optional(metadata, "objectCount")?.unwrap_or(DEFAULT_OBJECT_COUNT);
        let object_prefix = config::optional(metadata, "objectPrefix").map(From::from);
        let object_delimiter = config::optional(metadata, "objectDelimiter").map(From::from);
        let object_limit = config::parse_optional(metadata, "objectLimit")?;
        if object_limit == Some(0) {
            return Err(Error::invalid_config("objectLimit must be positive"));
        }
        let only_files = config::parse_optional(metadata, "onlyFiles")?.unwrap_or(false);

        Ok(ContainerMetadata {
            swift_url,
            container_name,
            object_count,
            object_prefix,
            object_delimiter,
            object_limit,
            only_files,
        })
    }

    /// Whether the count requires listing the container.
    pub fn needs_listing(&self) -> bool {
        self.object_prefix.is_some()
            || self.object_delimiter.is_some()
            || self.object_limit.is_some()
            || self.only_files
    }
}

/// Adapter reporting the number of objects in a container.
#[derive(Debug, Clone)]
pub struct ContainerAdapter {
    metadata: ContainerMetadata,
}

impl ContainerAdapter {
    /// Create an adapter.
    pub fn new(metadata: ContainerMetadata) -> ContainerAdapter {
        ContainerAdapter { metadata }
    }

    /// Create an adapter from trigger metadata.
    pub fn from_trigger_metadata(metadata: &HashMap<String, String>) -> Result<ContainerAdapter> {
        ContainerMetadata::from_trigger_metadata(metadata).map(ContainerAdapter::new)
    }

    /// Adapter settings.
    #[inline]
    pub fn metadata(&self) -> &ContainerMetadata {
        &self.metadata
    }
}

#[async_trait]
impl MetricAdapter for ContainerAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::ContainerObjectCount
    }

    fn identifier(&self) -> &str {
        &self.metadata.container_name
    }

    fn target_value(&self) -> f64 {
        self.metadata.object_count as f64
    }

    async fn read(&self, session: &AuthSession) -> Result<f64> {
        let count = if self.metadata.needs_listing() {
            api::list_object_count(session, &self.metadata).await?
        } else {
            api::get_object_count(session, &self.metadata).await?
        };
        Ok(count as f64)
    }
}
