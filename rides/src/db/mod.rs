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

//! Database abstraction in terms of the operations needed by the server.
//!
//! Every statement in this module binds caller-supplied values as query parameters.  Never format
//! them into the query text.

use crate::model::{NewRide, PageNumber, Ride, RideId};
use rides_core::db::sqlite::{self, build_timestamp, map_sqlx_error};
use rides_core::db::{DbError, DbResult, Executor};
use serde_json::json;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;


/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    sqlite::run_schema(ex, include_str!("sqlite.sql")).await
}

/// Populates an empty database with `count` sample rides.
///
/// The fixtures are only inserted if there are no rides yet, so this is safe to call every time
/// the service starts.  The caller should pass a transaction so that either all or none of the
/// fixtures are stored.
pub async fn seed_fixtures(ex: &mut Executor, count: usize) -> DbResult<()> {
    let query_str = "SELECT COUNT(*) AS count FROM rides";
    let row = sqlx::query(query_str).fetch_one(ex.conn()).await.map_err(map_sqlx_error)?;
    let existing: i64 = row.try_get("count").map_err(map_sqlx_error)?;
    if existing > 0 {
        return Ok(());
    }

    for i in 1..=count {
        let candidate = json!({
            "start_lat": -70 + i as i64,
            "start_long": 90 + i as i64,
            "end_lat": -75 + i as i64,
            "end_long": 95 + i as i64,
            "rider_name": format!("rider{}", i),
            "driver_name": format!("driver{}", i),
            "driver_vehicle": "Toyota Prius",
        });
        let ride = crate::model::validate(&candidate)?;
        insert_ride(ex, &ride).await?;
    }
    Ok(())
}

impl TryFrom<SqliteRow> for Ride {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        let start_lat: f64 = row.try_get("start_lat").map_err(map_sqlx_error)?;
        let start_long: f64 = row.try_get("start_long").map_err(map_sqlx_error)?;
        let end_lat: f64 = row.try_get("end_lat").map_err(map_sqlx_error)?;
        let end_long: f64 = row.try_get("end_long").map_err(map_sqlx_error)?;
        let rider_name: String = row.try_get("rider_name").map_err(map_sqlx_error)?;
        let driver_name: String = row.try_get("driver_name").map_err(map_sqlx_error)?;
        let driver_vehicle: String = row.try_get("driver_vehicle").map_err(map_sqlx_error)?;
        let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

        let details = NewRide::new(
            start_lat,
            start_long,
            end_lat,
            end_long,
            rider_name,
            driver_name,
            driver_vehicle,
        )?;
        Ok(Ride::new(id, details, build_timestamp(created_at)?))
    }
}

/// Converts the raw `rows` returned by a query into rides, failing if there are none.
fn rows_to_rides(rows: Vec<SqliteRow>) -> DbResult<Vec<Ride>> {
    if rows.is_empty() {
        return Err(DbError::NotFound);
    }
    rows.into_iter().map(Ride::try_from).collect()
}

/// Checks that an insertion touched exactly one row given the number of `affected` rows.
fn check_single_insertion(affected: u64) -> DbResult<()> {
    if affected != 1 {
        return Err(DbError::BackendError(format!(
            "Insertion did not affect exactly one row (affected {})",
            affected
        )));
    }
    Ok(())
}

/// Stores a new `ride` and returns the ID that the database assigned to it.
pub(crate) async fn insert_ride(ex: &mut Executor, ride: &NewRide) -> DbResult<i64> {
    let query_str = "
        INSERT INTO rides
            (start_lat, start_long, end_lat, end_long, rider_name, driver_name, driver_vehicle)
        VALUES (?, ?, ?, ?, ?, ?, ?)
    ";
    let done = sqlx::query(query_str)
        .bind(ride.start_lat())
        .bind(ride.start_long())
        .bind(ride.end_lat())
        .bind(ride.end_long())
        .bind(ride.rider_name())
        .bind(ride.driver_name())
        .bind(ride.driver_vehicle())
        .execute(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    check_single_insertion(done.rows_affected())?;
    Ok(done.last_insert_rowid())
}

/// Gets all rides whose ID matches `id`.
///
/// The `id` is compared as given by the caller, so values that are not valid IDs simply match
/// nothing.
pub(crate) async fn get_rides_by_id(ex: &mut Executor, id: &RideId) -> DbResult<Vec<Ride>> {
    let query_str = "SELECT * FROM rides WHERE id = ?";
    let rows = sqlx::query(query_str)
        .bind(id.as_str())
        .fetch_all(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    rows_to_rides(rows)
}

/// Gets up to `page_size` rides that belong to `page`, ordered by ID.
pub(crate) async fn get_rides_page(
    ex: &mut Executor,
    page: PageNumber,
    page_size: u16,
) -> DbResult<Vec<Ride>> {
    let query_str = "SELECT * FROM rides WHERE id >= ? ORDER BY id LIMIT ?";
    let rows = sqlx::query(query_str)
        .bind(page.first_id(page_size))
        .bind(i64::from(page_size))
        .fetch_all(ex.conn())
        .await
        .map_err(map_sqlx_error)?;
    rows_to_rides(rows)
}
