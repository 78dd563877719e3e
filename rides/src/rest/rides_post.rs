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

//! API to create a new ride.

use crate::driver::Driver;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use rides_core::rest::RestResult;
use serde_json::Value;

/// POST handler for this API.
///
/// The payload is taken as free-form JSON so that the checks on its fields all go through the
/// validator and report their failures in the same way.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    payload: Result<Json<Value>, JsonRejection>,
) -> RestResult<impl IntoResponse> {
    let Json(candidate) = payload?;
    let rides = driver.create_ride(&candidate).await?;
    Ok(Json(rides))
}
