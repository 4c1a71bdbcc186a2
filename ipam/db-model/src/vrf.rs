// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::name::{RouteDistinguisher, VrfName};
use crate::natural_sort::natural_sort_key;
use crate::schema::{vrf, vrf_export_targets, vrf_import_targets};
use chrono::{DateTime, Utc};
use ipam_common::api::external;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A virtual routing and forwarding (VRF) table: a discrete layer-three
/// forwarding domain.
///
/// Prefixes and addresses can optionally be assigned to VRFs; those
/// assigned to none exist in the "global" table.  The `(name, rd)` pair is
/// intentionally not unique.  Only the route distinguisher alone is, when
/// present, via a partial unique index.
#[derive(
    Queryable, Insertable, Selectable, Clone, Debug, Serialize, Deserialize,
)]
#[diesel(table_name = vrf)]
pub struct Vrf {
    pub id: Uuid,
    pub name: VrfName,
    pub name_key: String,
    pub rd: Option<RouteDistinguisher>,
    pub tenant_id: Option<Uuid>,
    pub enforce_unique: bool,
    pub description: String,
    pub comments: String,
    pub tags: Vec<String>,
    pub custom_field_data: serde_json::Value,
    pub time_created: DateTime<Utc>,
    pub time_modified: DateTime<Utc>,
}

impl Vrf {
    pub fn new(params: external::VrfCreateParams) -> Self {
        let now = Utc::now();
        let name_key = natural_sort_key(params.name.as_str());
        Self {
            id: Uuid::new_v4(),
            name: params.name.into(),
            name_key,
            rd: params.rd.map(RouteDistinguisher),
            tenant_id: params.tenant_id,
            enforce_unique: params.enforce_unique,
            description: params.identity.description,
            comments: params.identity.comments,
            tags: params.identity.tags,
            custom_field_data: params.identity.custom_fields,
            time_created: now,
            time_modified: now,
        }
    }
}

impl fmt::Display for Vrf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rd {
            Some(rd) => write!(f, "{} ({})", self.name, rd),
            None => write!(f, "{}", self.name),
        }
    }
}

impl From<Vrf> for external::Vrf {
    fn from(vrf: Vrf) -> Self {
        Self {
            identity: external::IdentityMetadata {
                id: vrf.id,
                description: vrf.description,
                comments: vrf.comments,
                tags: vrf.tags,
                custom_fields: vrf.custom_field_data,
                time_created: vrf.time_created,
                time_modified: vrf.time_modified,
            },
            name: vrf.name.into(),
            rd: vrf.rd.map(|rd| rd.into()),
            tenant_id: vrf.tenant_id,
            enforce_unique: vrf.enforce_unique,
        }
    }
}

/// Describes a set of updates for the [`Vrf`] model.
///
/// The nested `Option` on `rd` follows the changeset convention: `None`
/// leaves the column unchanged, `Some(None)` clears it.
#[derive(AsChangeset)]
#[diesel(table_name = vrf)]
pub struct VrfUpdate {
    pub name: Option<VrfName>,
    pub name_key: Option<String>,
    pub rd: Option<Option<RouteDistinguisher>>,
    pub enforce_unique: Option<bool>,
    pub description: Option<String>,
    pub comments: Option<String>,
    pub time_modified: DateTime<Utc>,
}

impl From<external::VrfUpdateParams> for VrfUpdate {
    fn from(params: external::VrfUpdateParams) -> Self {
        let name_key =
            params.name.as_ref().map(|n| natural_sort_key(n.as_str()));
        Self {
            name: params.name.map(VrfName),
            name_key,
            rd: params.rd.map(|rd| rd.map(RouteDistinguisher)),
            enforce_unique: params.enforce_unique,
            description: params.identity.description,
            comments: params.identity.comments,
            time_modified: Utc::now(),
        }
    }
}

/// Membership row linking a VRF to a route target it imports.
///
/// The composite primary key makes the import set a set: re-adding an
/// existing member is a no-op, not a duplicate.
#[derive(
    Queryable, Insertable, Selectable, Clone, Debug, Serialize, Deserialize,
)]
#[diesel(table_name = vrf_import_targets)]
pub struct VrfImportTarget {
    pub vrf_id: Uuid,
    pub route_target_id: Uuid,
}

/// Membership row linking a VRF to a route target it exports.
///
/// Held separately from [`VrfImportTarget`]: the import and export sets
/// are independent relations, and a route target may appear in both,
/// either, or neither.
#[derive(
    Queryable, Insertable, Selectable, Clone, Debug, Serialize, Deserialize,
)]
#[diesel(table_name = vrf_export_targets)]
pub struct VrfExportTarget {
    pub vrf_id: Uuid,
    pub route_target_id: Uuid,
}

#[cfg(test)]
mod test {
    use super::Vrf;
    use ipam_common::api::external;

    fn params(name: &str, rd: Option<&str>) -> external::VrfCreateParams {
        external::VrfCreateParams {
            identity: Default::default(),
            name: name.parse().unwrap(),
            rd: rd.map(|rd| rd.parse().unwrap()),
            tenant_id: None,
            enforce_unique: true,
        }
    }

    #[test]
    fn test_display_includes_rd_when_set() {
        let vrf = Vrf::new(params("Customer-A", Some("65000:100")));
        assert_eq!(vrf.to_string(), "Customer-A (65000:100)");

        let vrf = Vrf::new(params("Customer-B", None));
        assert_eq!(vrf.to_string(), "Customer-B");
    }

    #[test]
    fn test_name_key_derived_on_create() {
        let nine = Vrf::new(params("vrf-9", None));
        let ten = Vrf::new(params("vrf-10", None));
        assert!(nine.name_key < ten.name_key);
    }
}
