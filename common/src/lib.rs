// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Common facilities for the IPAM subsystem of the network documentation
//! system.
//!
//! This crate holds the transport-agnostic representations of the IPAM
//! resources (VRFs, route targets, and the tenant surface they reference),
//! along with the error taxonomy shared by every layer that touches them.

pub mod api;
