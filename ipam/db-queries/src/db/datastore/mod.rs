// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primary interface for database read and write operations

use super::pool::DbConnection;
use super::Pool;
use async_bb8_diesel::ConnectionManager;
use ipam_common::api::external::Error;
use slog::Logger;
use std::sync::Arc;

mod route_target;
mod tenant;
mod vrf;

pub use vrf::VrfPageMarker;

/// Abstracts over the database used to store the IPAM entities.
///
/// The methods implemented on this object live in the per-entity modules
/// of this directory.  Uniqueness and referential-integrity rules are
/// enforced by the database's own indexes and constraints, so operations
/// remain atomic under concurrent writers; the datastore's job is to issue
/// the statements and translate the failures.
pub struct DataStore {
    log: Logger,
    pool: Arc<Pool>,
}

impl DataStore {
    pub fn new(log: &Logger, pool: Arc<Pool>) -> Self {
        DataStore { log: log.new(o!("component" => "DataStore")), pool }
    }

    async fn pool_connection(
        &self,
    ) -> Result<
        bb8::PooledConnection<'_, ConnectionManager<DbConnection>>,
        Error,
    > {
        self.pool.pool().get().await.map_err(|err| {
            Error::unavail(&format!("Failed to access DB connection: {}", err))
        })
    }
}
