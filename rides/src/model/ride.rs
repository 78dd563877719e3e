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

//! The `Ride` data type and its companions.

use derive_getters::Getters;
use derive_more::Constructor;
#[cfg(test)]
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

/// Identifier of a ride as supplied by a caller.
///
/// The identifier is opaque: it is never parsed and is only ever handed to the database as a bound
/// parameter, so whatever the caller sends is compared against the ride IDs as a literal value.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RideId(String);

impl RideId {
    /// Creates a new identifier from an untrusted string `s`.
    pub(crate) fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// Returns a string view of the identifier.
    pub(crate) fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<i64> for RideId {
    /// Creates an identifier for a ride whose ID was assigned by the database.
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// Details of a ride that has passed validation but may not have been stored yet.
///
/// Instances of this type can only be obtained via `NewRide::new` or `validate`, so holding one
/// guarantees that all fields are within range.
#[derive(Clone, Debug, Getters, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct NewRide {
    /// Latitude where the ride starts, in degrees.
    pub(super) start_lat: f64,

    /// Longitude where the ride starts, in degrees.
    pub(super) start_long: f64,

    /// Latitude where the ride ends, in degrees.
    pub(super) end_lat: f64,

    /// Longitude where the ride ends, in degrees.
    pub(super) end_long: f64,

    /// Name of the person requesting the ride.
    pub(super) rider_name: String,

    /// Name of the person driving.
    pub(super) driver_name: String,

    /// Description of the vehicle used for the ride.
    pub(super) driver_vehicle: String,
}

/// A ride as stored in the database.
#[derive(Constructor, Debug, Getters, Serialize)]
#[cfg_attr(test, derive(Deserialize, PartialEq))]
pub(crate) struct Ride {
    /// Identifier assigned by the database on insertion.
    id: i64,

    /// Details of the ride as provided at creation time.
    #[serde(flatten)]
    details: NewRide,

    /// Time at which the database stored the ride.
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::validate;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn test_ride_id_from_i64() {
        assert_eq!("1234", RideId::from(1234).as_str());
        assert_eq!(RideId::new("5"), RideId::from(5));
    }

    #[test]
    fn test_ride_id_is_opaque() {
        let raw = "1 UNION SELECT * FROM rides LIMIT 3--";
        assert_eq!(raw, RideId::new(raw).as_str());
    }

    #[test]
    fn test_ride_serialization() {
        let details = validate(&json!({
            "start_lat": 10,
            "start_long": -20.5,
            "end_lat": 11,
            "end_long": -21,
            "rider_name": "the rider",
            "driver_name": "the driver",
            "driver_vehicle": "the car",
        }))
        .unwrap();
        let ride = Ride::new(7, details, datetime!(2023-12-01 05:50:00 UTC));

        assert_eq!(
            json!({
                "id": 7,
                "start_lat": 10.0,
                "start_long": -20.5,
                "end_lat": 11.0,
                "end_long": -21.0,
                "rider_name": "the rider",
                "driver_name": "the driver",
                "driver_vehicle": "the car",
                "created_at": "2023-12-01T05:50:00Z",
            }),
            serde_json::to_value(&ride).unwrap()
        );
    }
}
