// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Facilities for working with the IPAM database

mod config;
// This is marked public for use by the integration tests
pub mod datastore;
// This is marked public because the error types are used by callers that
// need to distinguish transaction outcomes.
pub mod error;
pub mod pagination;
mod pool;

#[cfg(any(test, feature = "testing"))]
pub mod pub_test_utils;

pub use config::Config;
pub use datastore::DataStore;
pub use pool::Pool;

pub use ipam_db_model as model;
pub use ipam_db_model::schema;
