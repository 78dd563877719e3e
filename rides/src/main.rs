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

//! Entry point to the rides service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::info;
use rides::db::{init_schema, seed_fixtures};
use rides::driver::RidesOptions;
use rides::serve;
use rides_core::db::Db;
use rides_core::db::sqlite;
use rides_core::env::get_optional_var;
use std::error::Error;
use std::net::Ipv4Addr;
use std::sync::Arc;

/// Prefix of all environment variables that configure the service.
const ENV_PREFIX: &str = "RIDES";

/// Port to listen on when not explicitly configured.
const DEFAULT_PORT: u16 = 8010;

/// Database to use when not explicitly configured.
const DEFAULT_DATABASE: &str = ":memory:";

/// Number of sample rides to store in an empty database when not explicitly configured.
const DEFAULT_FIXTURES: usize = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let port = get_optional_var::<u16>(ENV_PREFIX, "PORT")?.unwrap_or(DEFAULT_PORT);
    let addr = (Ipv4Addr::LOCALHOST, port);
    let database = get_optional_var::<String>(ENV_PREFIX, "DATABASE")?
        .unwrap_or_else(|| DEFAULT_DATABASE.to_owned());
    let fixtures = get_optional_var::<usize>(ENV_PREFIX, "FIXTURES")?.unwrap_or(DEFAULT_FIXTURES);
    let opts = RidesOptions::from_env(ENV_PREFIX)?;

    info!("Opening database {}", database);
    let db = Arc::from(sqlite::connect(&database).await?);
    init_schema(&mut db.ex().await?).await?;

    let mut tx = db.begin().await?;
    seed_fixtures(tx.ex(), fixtures).await?;
    tx.commit().await?;

    serve(addr, db, opts).await
}
