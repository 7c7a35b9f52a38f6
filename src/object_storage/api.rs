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

//! Foundation bits exposing the object storage API.

use log::{debug, trace};
use reqwest::{StatusCode, Url};

use super::super::session::AuthSession;
use super::super::utils::{self, url};
use super::super::Result;
use super::protocol;
use super::ContainerMetadata;

/// URL of the configured container.
pub fn container_url(metadata: &ContainerMetadata) -> Url {
    url::extend(
        metadata.swift_url.clone(),
        [metadata.container_name.as_str()],
    )
}

/// Number of names the server returns per listing page by default.
pub const LISTING_PAGE_SIZE: u32 = 10_000;

/// Query of one page of a plain-text listing.
pub fn listing_query(
    metadata: &ContainerMetadata,
    limit: u32,
    marker: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("format", "plain".to_string())];
    if let Some(ref prefix) = metadata.object_prefix {
        query.push(("prefix", prefix.clone()));
    }
    if let Some(ref delimiter) = metadata.object_delimiter {
        query.push(("delimiter", delimiter.clone()));
    }
    query.push(("limit", limit.to_string()));
    if let Some(marker) = marker {
        query.push(("marker", marker.to_string()));
    }
    query
}

/// Get the object count from the container headers.
pub async fn get_object_count(session: &AuthSession, metadata: &ContainerMetadata) -> Result<u64> {
    debug!("Fetching object count of container {}", metadata.container_name);
    let resp = session.get(container_url(metadata))?.send().await?;
    let resp = utils::check_status(resp).await?;
    let count = protocol::object_count_from_headers(resp.headers())?;
    trace!(
        "Container {} has {} objects",
        metadata.container_name,
        count
    );
    Ok(count)
}

/// Count objects by listing the container page by page.
///
/// Stops at a short page or once `object_limit` names were listed.
pub async fn list_object_count(session: &AuthSession, metadata: &ContainerMetadata) -> Result<u64> {
    let mut marker: Option<String> = None;
    let mut listed: u32 = 0;
    let mut count: u64 = 0;

    loop {
        let page_size = match metadata.object_limit {
            Some(limit) => LISTING_PAGE_SIZE.min(limit.saturating_sub(listed)),
            None => LISTING_PAGE_SIZE,
        };
        if page_size == 0 {
            break;
        }

        let query = listing_query(metadata, page_size, marker.as_deref());
        trace!(
            "Listing objects in container {} with {:?}",
            metadata.container_name,
            query
        );
        let resp = session
            .get(container_url(metadata))?
            .query(&query)
            .send()
            .await?;
        let resp = utils::check_status(resp).await?;
        if resp.status() == StatusCode::NO_CONTENT {
            break;
        }

        let listing = resp.text().await?;
        let names = protocol::listing_names(&listing);
        count += protocol::count_objects(
            &names,
            metadata.only_files,
            metadata.object_delimiter.as_deref(),
        );
        let received = u32::try_from(names.len()).unwrap_or(u32::MAX);
        listed = listed.saturating_add(received);
        if received < page_size {
            break;
        }
        marker = names.last().map(|name| name.to_string());
    }

    trace!(
        "Container {} has {} matching objects",
        metadata.container_name,
        count
    );
    Ok(count)
}
