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

//! Test utilities for the business layer.

use crate::db;
use crate::driver::{Driver, RidesOptions};
use rides_core::db::{Db, Executor};
use rides_core::db::sqlite::testutils::setup;
use std::sync::Arc;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database that backs the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes a driver over an empty in-memory database with the default options.
    pub(crate) async fn setup() -> Self {
        Self::setup_with_opts(RidesOptions::default()).await
    }

    /// Initializes a driver over an empty in-memory database with custom `opts`.
    pub(crate) async fn setup_with_opts(opts: RidesOptions) -> Self {
        let db: Arc<dyn Db + Send + Sync> = Arc::from(setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = Driver::new(db.clone(), opts);
        Self { db, driver }
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Inserts `count` fixture rides into the database.
    pub(crate) async fn seed(&self, count: usize) {
        db::seed_fixtures(&mut self.ex().await, count).await.unwrap();
    }

    /// Gets a copy of the driver under test.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }
}
