// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structures stored to the database.

#[macro_use]
extern crate diesel;
#[macro_use]
extern crate newtype_derive;

mod name;
mod natural_sort;
mod route_target;
pub mod schema;
mod tenant;
mod vrf;

pub use name::*;
pub use natural_sort::*;
pub use route_target::*;
pub use tenant::*;
pub use vrf::*;
