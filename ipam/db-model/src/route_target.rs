// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::name::RouteTargetName;
use crate::natural_sort::natural_sort_key;
use crate::schema::route_target;
use chrono::{DateTime, Utc};
use ipam_common::api::external;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A BGP extended community used to control the redistribution of routes
/// among VRFs, as defined in RFC 4364.
///
/// The value is globally unique, enforced by a database index; `name_key`
/// is the derived natural-sort key listings order by.
#[derive(
    Queryable, Insertable, Selectable, Clone, Debug, Serialize, Deserialize,
)]
#[diesel(table_name = route_target)]
pub struct RouteTarget {
    pub id: Uuid,
    pub name: RouteTargetName,
    pub name_key: String,
    pub tenant_id: Option<Uuid>,
    pub description: String,
    pub comments: String,
    pub tags: Vec<String>,
    pub custom_field_data: serde_json::Value,
    pub time_created: DateTime<Utc>,
    pub time_modified: DateTime<Utc>,
}

impl RouteTarget {
    pub fn new(params: external::RouteTargetCreateParams) -> Self {
        let now = Utc::now();
        let name_key = natural_sort_key(params.name.as_str());
        Self {
            id: Uuid::new_v4(),
            name: params.name.into(),
            name_key,
            tenant_id: params.tenant_id,
            description: params.identity.description,
            comments: params.identity.comments,
            tags: params.identity.tags,
            custom_field_data: params.identity.custom_fields,
            time_created: now,
            time_modified: now,
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<RouteTarget> for external::RouteTarget {
    fn from(rt: RouteTarget) -> Self {
        Self {
            identity: external::IdentityMetadata {
                id: rt.id,
                description: rt.description,
                comments: rt.comments,
                tags: rt.tags,
                custom_fields: rt.custom_field_data,
                time_created: rt.time_created,
                time_modified: rt.time_modified,
            },
            name: rt.name.into(),
            tenant_id: rt.tenant_id,
        }
    }
}

/// Describes a set of updates for the [`RouteTarget`] model.
///
/// A rename re-derives the natural-sort key so the stored ordering stays
/// consistent with the name.
#[derive(AsChangeset)]
#[diesel(table_name = route_target)]
pub struct RouteTargetUpdate {
    pub name: Option<RouteTargetName>,
    pub name_key: Option<String>,
    pub description: Option<String>,
    pub comments: Option<String>,
    pub time_modified: DateTime<Utc>,
}

impl From<external::RouteTargetUpdateParams> for RouteTargetUpdate {
    fn from(params: external::RouteTargetUpdateParams) -> Self {
        let name_key =
            params.name.as_ref().map(|n| natural_sort_key(n.as_str()));
        Self {
            name: params.name.map(RouteTargetName),
            name_key,
            description: params.identity.description,
            comments: params.identity.comments,
            time_modified: Utc::now(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::RouteTarget;
    use ipam_common::api::external;

    #[test]
    fn test_display_is_the_value() {
        let rt = RouteTarget::new(external::RouteTargetCreateParams {
            identity: Default::default(),
            name: "65000:100".parse().unwrap(),
            tenant_id: None,
        });
        assert_eq!(rt.to_string(), "65000:100");
    }

    #[test]
    fn test_name_key_derived_on_create() {
        let rt = RouteTarget::new(external::RouteTargetCreateParams {
            identity: Default::default(),
            name: "RT-9".parse().unwrap(),
            tenant_id: None,
        });
        let later = RouteTarget::new(external::RouteTargetCreateParams {
            identity: Default::default(),
            name: "RT-10".parse().unwrap(),
            tenant_id: None,
        });
        assert!(rt.name_key < later.name_key);
    }
}
