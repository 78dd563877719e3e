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

//! Business logic for the service.

use rides_core::db::Db;
use rides_core::env::get_optional_var;
use std::sync::Arc;

mod rides;
#[cfg(test)]
mod testutils;

/// Default value of the `page_size` setting when not explicitly set.
const DEFAULT_PAGE_SIZE: u16 = 3;

/// Configuration options for the rides driver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RidesOptions {
    /// Maximum number of rides returned in a single page.  Must be positive.
    pub page_size: u16,
}

impl Default for RidesOptions {
    fn default() -> Self {
        Self { page_size: DEFAULT_PAGE_SIZE }
    }
}

impl RidesOptions {
    /// Creates a new set of options from environment variables.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let page_size =
            get_optional_var::<u16>(prefix, "PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(format!("{}_PAGE_SIZE must be positive", prefix));
        }
        Ok(Self { page_size })
    }
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot" so they consume the driver.
/// Callers clone the driver for every request, which is cheap.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Options for the driver.
    opts: RidesOptions,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, opts: RidesOptions) -> Self {
        Self { db, opts }
    }
}
