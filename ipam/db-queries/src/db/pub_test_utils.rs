// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Test database support.
//!
//! The datastore tests exercise a real PostgreSQL server, named by the
//! `IPAM_TEST_DATABASE_URL` environment variable as a URL whose database
//! component is a maintenance database the tests may connect to (e.g.
//! `postgresql://postgres@127.0.0.1:5432/postgres`).  Each [`TestDatabase`]
//! provisions a scratch database with a random name, applies
//! `schema/dbinit.sql` to it, and drops it again on
//! [`TestDatabase::terminate`].  When the variable is unset, the tests
//! skip with a note on stderr.

use crate::db::datastore::DataStore;
use crate::db::{Config, Pool};
use async_bb8_diesel::AsyncSimpleConnection;
use diesel::connection::SimpleConnection;
use diesel::Connection;
use diesel::PgConnection;
use slog::Logger;
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_DATABASE_URL_VAR: &str = "IPAM_TEST_DATABASE_URL";

const DBINIT_SQL: &str = include_str!("../../../../schema/dbinit.sql");

/// Returns a logger suitable for tests.
pub fn test_setup_log(_test_name: &str) -> Logger {
    Logger::root(slog::Discard, o!())
}

/// A scratch database together with a [`DataStore`] pointed at it.
pub struct TestDatabase {
    datastore: Arc<DataStore>,
    admin_url: String,
    db_name: String,
}

impl TestDatabase {
    /// Sets up a scratch database, or returns `None` when no test database
    /// server is configured.
    pub async fn new(log: &Logger) -> Option<TestDatabase> {
        let admin_url = match std::env::var(TEST_DATABASE_URL_VAR) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "skipping test ({} is not set)",
                    TEST_DATABASE_URL_VAR
                );
                return None;
            }
        };

        let db_name = format!("ipam_test_{}", Uuid::new_v4().simple());
        let create_sql = format!("CREATE DATABASE {}", db_name);
        let admin = admin_url.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = PgConnection::establish(&admin)
                .expect("failed to connect to the test database server");
            conn.batch_execute(&create_sql)
                .expect("failed to create a scratch database");
        })
        .await
        .expect("task panicked creating a scratch database");

        let url = replace_database(&admin_url, &db_name);
        let pool = Arc::new(Pool::new(log, &Config { url }));
        {
            let conn = pool
                .pool()
                .get()
                .await
                .expect("failed to connect to the scratch database");
            conn.batch_execute_async(DBINIT_SQL)
                .await
                .expect("failed to apply the schema");
        }
        let datastore = Arc::new(DataStore::new(log, pool));
        Some(TestDatabase { datastore, admin_url, db_name })
    }

    pub fn datastore(&self) -> &Arc<DataStore> {
        &self.datastore
    }

    /// Drops the scratch database.
    pub async fn terminate(self) {
        let TestDatabase { datastore, admin_url, db_name } = self;
        // The pool's connections must not outlive the DROP; FORCE evicts
        // any that do.
        drop(datastore);
        let drop_sql =
            format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", db_name);
        tokio::task::spawn_blocking(move || {
            let mut conn = PgConnection::establish(&admin_url)
                .expect("failed to connect to the test database server");
            conn.batch_execute(&drop_sql)
                .expect("failed to drop the scratch database");
        })
        .await
        .expect("task panicked dropping the scratch database");
    }
}

/// Replaces the database component of a `postgresql://` URL.
fn replace_database(url: &str, db_name: &str) -> String {
    let (base, params) = match url.split_once('?') {
        Some((base, params)) => (base, Some(params)),
        None => (url, None),
    };
    let authority_start = base.find("://").map(|i| i + 3).unwrap_or(0);
    let base = match base[authority_start..].find('/') {
        Some(i) => &base[..authority_start + i],
        None => base,
    };
    match params {
        Some(params) => format!("{}/{}?{}", base, db_name, params),
        None => format!("{}/{}", base, db_name),
    }
}

#[cfg(test)]
mod test {
    use super::replace_database;

    #[test]
    fn test_replace_database() {
        assert_eq!(
            replace_database(
                "postgresql://postgres@127.0.0.1:5432/postgres",
                "scratch"
            ),
            "postgresql://postgres@127.0.0.1:5432/scratch"
        );
        assert_eq!(
            replace_database("postgresql://postgres@db", "scratch"),
            "postgresql://postgres@db/scratch"
        );
        assert_eq!(
            replace_database(
                "postgresql://u@db:26257/defaultdb?sslmode=disable",
                "scratch"
            ),
            "postgresql://u@db:26257/scratch?sslmode=disable"
        );
    }
}
