// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::schema::tenant;
use chrono::{DateTime, Utc};
use ipam_common::api::external;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organizational owner of VRFs and route targets.
///
/// Tenancy proper lives in a separate subsystem; this is the surface the
/// IPAM entities reference.  The referencing foreign keys are declared
/// RESTRICT, so a tenant cannot be deleted while anything points at it.
#[derive(
    Queryable, Insertable, Selectable, Clone, Debug, Serialize, Deserialize,
)]
#[diesel(table_name = tenant)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub time_created: DateTime<Utc>,
    pub time_modified: DateTime<Utc>,
}

impl Tenant {
    pub fn new(params: external::TenantCreateParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: params.name,
            description: params.description,
            time_created: now,
            time_modified: now,
        }
    }
}

impl From<Tenant> for external::Tenant {
    fn from(tenant: Tenant) -> Self {
        Self {
            id: tenant.id,
            name: tenant.name,
            description: tenant.description,
            time_created: tenant.time_created,
            time_modified: tenant.time_modified,
        }
    }
}
