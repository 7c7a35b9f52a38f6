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

//! Protocol bits for the object storage API.

#![allow(missing_docs)]

use log::error;
use reqwest::header::{HeaderMap, HeaderName};

use super::super::utils;
use super::super::{Error, Result};

pub static OBJECT_COUNT: HeaderName = HeaderName::from_static("x-container-object-count");

/// Object count reported in the container headers.
pub fn object_count_from_headers(value: &HeaderMap) -> Result<u64> {
    let count = utils::get_required_header(value, &OBJECT_COUNT)?;
    count.trim().parse().map_err(|e| {
        error!("Container object count {:?} is not a non-negative integer", count);
        Error::invalid_response(format!(
            "Container-Object-Count is not a non-negative integer: {}",
            e
        ))
    })
}

/// Names in one page of a plain-text listing.
pub fn listing_names(listing: &str) -> Vec<&str> {
    listing.lines().filter(|name| !name.is_empty()).collect()
}

/// Count listed objects.
///
/// Pseudo-folders (names ending with the delimiter, `/` by default) are
/// skipped when `only_files` is set.
pub fn count_objects(names: &[&str], only_files: bool, delimiter: Option<&str>) -> u64 {
    let suffix = delimiter.filter(|d| !d.is_empty()).unwrap_or("/");
    let count = names
        .iter()
        .filter(|name| !only_files || !name.ends_with(suffix))
        .count();
    u64::try_from(count).unwrap_or(u64::MAX)
}

#[cfg(test)]
pub mod test {
    #![allow(missing_docs)]

    use reqwest::header::{HeaderMap, HeaderValue};

    use super::{count_objects, listing_names, object_count_from_headers, OBJECT_COUNT};
    use crate::ErrorKind;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(OBJECT_COUNT.clone(), HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_object_count_from_headers() {
        assert_eq!(object_count_from_headers(&headers("42")).unwrap(), 42);
        assert_eq!(object_count_from_headers(&headers("0")).unwrap(), 0);
    }

    #[test]
    fn test_object_count_from_headers_invalid() {
        for value in ["many", "-3", "4.5", ""] {
            let err = object_count_from_headers(&headers(value)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidResponse, "{:?}", value);
        }
        let err = object_count_from_headers(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_listing_names() {
        assert_eq!(listing_names("a\nb/\n\nc\n"), vec!["a", "b/", "c"]);
        assert!(listing_names("").is_empty());
        assert!(listing_names("\n\n").is_empty());
    }

    #[test]
    fn test_count_objects() {
        let names = listing_names("folder/\nfolder/a.txt\nfolder/b.txt\nc.txt\n");
        assert_eq!(count_objects(&names, false, None), 4);
        assert_eq!(count_objects(&names, true, None), 3);
        assert_eq!(count_objects(&[], true, None), 0);
    }

    #[test]
    fn test_count_objects_custom_delimiter() {
        let names = listing_names("logs-\nlogs-2021\nimages-\nreadme.txt\nold/\n");
        assert_eq!(count_objects(&names, true, Some("-")), 3);
        assert_eq!(count_objects(&names, true, Some("")), 4);
        assert_eq!(count_objects(&names, false, Some("-")), 5);
    }
}
