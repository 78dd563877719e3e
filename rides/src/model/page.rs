// Rides
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! The `PageNumber` data type.

use rides_core::model::{ModelError, ModelResult};

/// A page number requested by a caller.
///
/// Pages are windows over ride IDs, not over row offsets: page `n` starts at the ride with ID
/// `(n - 1) * page_size + 1`.  Any gaps in the ID sequence therefore shift page boundaries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PageNumber(i64);

impl PageNumber {
    /// Parses a page number from the untrusted `raw` query value.
    ///
    /// Surrounding whitespace is ignored and any finite, non-zero number without a fractional part
    /// is accepted, so `"2"`, `" 2 "` and `"2.0"` all denote the second page.
    pub(crate) fn parse(raw: Option<&str>) -> ModelResult<Self> {
        let error = || ModelError("Page must be an integer".to_owned());

        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(error());
        }
        let page = raw.parse::<f64>().map_err(|_| error())?;
        if !page.is_finite() || page == 0.0 || page.fract() != 0.0 {
            return Err(error());
        }

        // Float to integer casts saturate, which is fine because out-of-range pages are empty.
        Ok(Self(page as i64))
    }

    /// Returns the ID of the first ride that belongs to this page given a `page_size`.
    pub(crate) fn first_id(self, page_size: u16) -> i64 {
        self.0.saturating_sub(1).saturating_mul(i64::from(page_size)).saturating_add(1)
    }
}
