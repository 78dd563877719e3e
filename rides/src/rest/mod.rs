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

//! REST interface for the service.
//!
//! Every API replies with HTTP 200.  Failures are reported in the body as an `ErrorResponse`
//! whose `error_code` tells the caller what went wrong.

use crate::driver::Driver;
use axum::Router;

mod health_get;
mod ride_get;
mod rides_get;
mod rides_post;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;
    Router::new()
        .route("/health", get(health_get::handler))
        .route("/rides", get(rides_get::handler).post(rides_post::handler))
        .route("/rides/:id", get(ride_get::handler))
        .with_state(driver)
}
