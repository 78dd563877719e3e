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

//! Operations on rides.

use crate::db;
use crate::driver::Driver;
use crate::model::{PageNumber, Ride, RideId, validate};
use rides_core::driver::DriverResult;
use serde_json::Value;

impl Driver {
    /// Validates and stores the `candidate` ride, returning it as read back from the database.
    ///
    /// Storing and reading back are two separate operations.  If the read fails after a successful
    /// insertion, the ride stays stored.
    pub(crate) async fn create_ride(self, candidate: &Value) -> DriverResult<Vec<Ride>> {
        let ride = validate(candidate)?;
        let id = db::insert_ride(&mut self.db.ex().await?, &ride).await?;
        let rides = db::get_rides_by_id(&mut self.db.ex().await?, &RideId::from(id)).await?;
        Ok(rides)
    }

    /// Gets the rides that match `id`.
    pub(crate) async fn get_ride(self, id: RideId) -> DriverResult<Vec<Ride>> {
        let rides = db::get_rides_by_id(&mut self.db.ex().await?, &id).await?;
        Ok(rides)
    }

    /// Gets the rides in `page` according to the configured page size.
    pub(crate) async fn get_rides_page(self, page: PageNumber) -> DriverResult<Vec<Ride>> {
        let rides =
            db::get_rides_page(&mut self.db.ex().await?, page, self.opts.page_size).await?;
        Ok(rides)
    }
}
