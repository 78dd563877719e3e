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

//! API to list rides one page at a time.

use crate::driver::Driver;
use crate::model::PageNumber;
use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use rides_core::rest::{EmptyBody, RestResult};
use serde::Deserialize;

/// Query parameters accepted by this API.
#[derive(Deserialize)]
pub(crate) struct PageQuery {
    /// The page to return, as given by the caller.
    page: Option<String>,
}

/// GET handler for this API.
///
/// A query string that cannot be decoded, such as one that repeats `page`, is treated as if no
/// page had been given.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    query: Result<Query<PageQuery>, QueryRejection>,
    _: EmptyBody,
) -> RestResult<impl IntoResponse> {
    let raw_page = query.ok().and_then(|Query(query)| query.page);
    let page = PageNumber::parse(raw_page.as_deref())?;
    let rides = driver.get_rides_page(page).await?;
    Ok(Json(rides))
}
