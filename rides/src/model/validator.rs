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

//! Validation of untrusted ride data.

use crate::model::NewRide;
use rides_core::model::{ModelError, ModelResult};
use serde_json::Value;

/// Checks that `lat` and `long` fall within the valid ranges for latitudes and longitudes.
fn in_range(lat: f64, long: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&long)
}

impl NewRide {
    /// Creates a new ride from untrusted but typed values, making sure they are valid.
    ///
    /// Rules are checked in a fixed order and the first one that fails determines the error: start
    /// coordinates, end coordinates, rider name, driver name and driver vehicle.
    pub(crate) fn new(
        start_lat: f64,
        start_long: f64,
        end_lat: f64,
        end_long: f64,
        rider_name: String,
        driver_name: String,
        driver_vehicle: String,
    ) -> ModelResult<Self> {
        if !in_range(start_lat, start_long) {
            return Err(ModelError(
                "Start latitude and longitude must be between -90 - 90 and -180 to 180 degrees \
                respectively"
                    .to_owned(),
            ));
        }
        if !in_range(end_lat, end_long) {
            return Err(ModelError(
                "End latitude and longitude must be between -90 - 90 and -180 to 180 degrees \
                respectively"
                    .to_owned(),
            ));
        }
        if rider_name.is_empty() {
            return Err(ModelError("Rider name must be a non empty string".to_owned()));
        }
        if driver_name.is_empty() {
            return Err(ModelError("Driver name must be a non empty string".to_owned()));
        }
        if driver_vehicle.is_empty() {
            return Err(ModelError("Driver vehicle must be a non empty string".to_owned()));
        }

        Ok(Self {
            start_lat,
            start_long,
            end_lat,
            end_long,
            rider_name,
            driver_name,
            driver_vehicle,
        })
    }
}

/// Coerces the untrusted `key` field of `candidate` to a number.
///
/// Numbers are taken as is and strings are parsed after trimming whitespace, with the empty
/// string standing for zero.  Anything else is not a number and yields NaN, which no range
/// check accepts.
fn get_number(candidate: &Value, key: &str) -> f64 {
    match candidate.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() { 0.0 } else { s.parse::<f64>().unwrap_or(f64::NAN) }
        }
        _ => f64::NAN,
    }
}

/// Extracts the untrusted `key` field of `candidate` as text.
///
/// Values that are not strings yield the empty string, which no text check accepts.
fn get_text(candidate: &Value, key: &str) -> String {
    match candidate.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Validates the untrusted fields of a ride given in `candidate` and returns them in typed form.
pub(crate) fn validate(candidate: &Value) -> ModelResult<NewRide> {
    NewRide::new(
        get_number(candidate, "start_lat"),
        get_number(candidate, "start_long"),
        get_number(candidate, "end_lat"),
        get_number(candidate, "end_long"),
        get_text(candidate, "rider_name"),
        get_text(candidate, "driver_name"),
        get_text(candidate, "driver_vehicle"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Returns a candidate ride that passes validation.
    fn valid_candidate() -> Value {
        json!({
            "start_lat": -70,
            "start_long": 90,
            "end_lat": -75,
            "end_long": 95,
            "rider_name": "newRider",
            "driver_name": "newDriver",
            "driver_vehicle": "Toyota",
        })
    }

    /// Returns a valid candidate ride with `key` replaced by `value`.
    fn candidate_with(key: &str, value: Value) -> Value {
        let mut candidate = valid_candidate();
        candidate[key] = value;
        candidate
    }

    /// Returns a valid candidate ride with `key` removed.
    fn candidate_without(key: &str) -> Value {
        let mut candidate = valid_candidate();
        candidate.as_object_mut().unwrap().remove(key);
        candidate
    }

    /// Checks that validating `candidate` fails with a message that starts with `exp_prefix`.
    fn assert_invalid(exp_prefix: &str, candidate: &Value) {
        let err = validate(candidate).unwrap_err();
        assert!(
            err.0.starts_with(exp_prefix),
            "Error '{}' does not start with '{}' for {}",
            err,
            exp_prefix,
            candidate
        );
    }

    #[test]
    fn test_validate_ok() {
        let ride = validate(&valid_candidate()).unwrap();
        assert_eq!(-70.0, *ride.start_lat());
        assert_eq!(90.0, *ride.start_long());
        assert_eq!(-75.0, *ride.end_lat());
        assert_eq!(95.0, *ride.end_long());
        assert_eq!("newRider", ride.rider_name());
        assert_eq!("newDriver", ride.driver_name());
        assert_eq!("Toyota", ride.driver_vehicle());
    }

    #[test]
    fn test_validate_coordinate_boundaries_ok() {
        let mut candidate = valid_candidate();
        candidate["start_lat"] = json!(-90);
        candidate["start_long"] = json!(180);
        candidate["end_lat"] = json!(90);
        candidate["end_long"] = json!(-180);
        validate(&candidate).unwrap();
    }

    #[test]
    fn test_validate_coordinates_coerced_from_strings() {
        let mut candidate = valid_candidate();
        candidate["start_lat"] = json!(" 12.5 ");
        candidate["start_long"] = json!("");
        let ride = validate(&candidate).unwrap();
        assert_eq!(12.5, *ride.start_lat());
        assert_eq!(0.0, *ride.start_long());
    }

    #[test]
    fn test_validate_start_out_of_range() {
        for (key, value) in [
            ("start_lat", json!(-91)),
            ("start_lat", json!(90.5)),
            ("start_long", json!(-180.01)),
            ("start_long", json!("181")),
        ] {
            assert_invalid("Start latitude", &candidate_with(key, value));
        }
    }

    #[test]
    fn test_validate_start_not_numeric() {
        for value in [json!(null), json!(true), json!("north"), json!([1]), json!({"lat": 1})] {
            assert_invalid("Start latitude", &candidate_with("start_lat", value));
        }
        assert_invalid("Start latitude", &candidate_without("start_long"));
    }

    #[test]
    fn test_validate_end_out_of_range() {
        for (key, value) in [
            ("end_lat", json!(91)),
            ("end_lat", json!("-90.1")),
            ("end_long", json!(180.5)),
            ("end_long", json!("NaN")),
        ] {
            assert_invalid("End latitude", &candidate_with(key, value));
        }
        assert_invalid("End latitude", &candidate_without("end_lat"));
    }

    #[test]
    fn test_validate_rider_name() {
        assert_invalid("Rider name", &candidate_with("rider_name", json!("")));
        assert_invalid("Rider name", &candidate_with("rider_name", json!(1)));
        assert_invalid("Rider name", &candidate_without("rider_name"));
    }

    #[test]
    fn test_validate_driver_name() {
        assert_invalid("Driver name", &candidate_with("driver_name", json!(1)));
        assert_invalid("Driver name", &candidate_with("driver_name", json!("")));
        assert_invalid("Driver name", &candidate_with("driver_name", json!(null)));
    }

    #[test]
    fn test_validate_driver_vehicle() {
        assert_invalid("Driver vehicle", &candidate_with("driver_vehicle", json!("")));
        assert_invalid("Driver vehicle", &candidate_with("driver_vehicle", json!(["car"])));
    }

    #[test]
    fn test_validate_first_failure_wins() {
        let candidate = json!({
            "start_lat": 0,
            "start_long": 0,
            "end_lat": 100,
            "end_long": 0,
            "rider_name": "",
            "driver_name": 5,
        });
        assert_invalid("End latitude", &candidate);
    }

    #[test]
    fn test_new_ride_typed_checks() {
        let new_ride = |start_lat: f64, rider_name: &str| {
            NewRide::new(
                start_lat,
                0.0,
                0.0,
                0.0,
                rider_name.to_owned(),
                "driver".to_owned(),
                "car".to_owned(),
            )
        };

        new_ride(45.0, "rider").unwrap();
        assert!(new_ride(f64::NAN, "rider").unwrap_err().0.starts_with("Start latitude"));
        assert!(new_ride(f64::INFINITY, "rider").unwrap_err().0.starts_with("Start latitude"));
        assert!(new_ride(45.0, "").unwrap_err().0.starts_with("Rider name"));
    }

    #[test]
    fn test_validate_not_an_object() {
        assert_invalid("Start latitude", &json!("a ride"));
        assert_invalid("Start latitude", &json!([1, 2, 3]));
    }
}
