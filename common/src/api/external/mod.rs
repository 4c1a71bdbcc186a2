// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Data structures and related facilities for representing IPAM resources
//!
//! These are the representations shared with consumers of the data model
//! (configuration generators, serializers).  The contents here are all
//! HTTP-agnostic.

mod error;
pub use error::*;

use chrono::DateTime;
use chrono::Utc;
use parse_display::Display;
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;
use std::convert::TryFrom;
use std::fmt;
use std::fmt::Formatter;
use std::num::NonZeroU32;
use std::str::FromStr;
use uuid::Uuid;

/// Result of a create operation for the specified type
pub type CreateResult<T> = Result<T, Error>;
/// Result of a delete operation for the specified type
pub type DeleteResult = Result<(), Error>;
/// Result of a list operation that returns a vector
pub type ListResultVec<T> = Result<Vec<T>, Error>;
/// Result of a lookup operation for the specified type
pub type LookupResult<T> = Result<T, Error>;
/// Result of an update operation for the specified type
pub type UpdateResult<T> = Result<T, Error>;

/// Maximum length of a route distinguisher or route target value
/// (RFC 4360 section 4 allows the same format options for both).
pub const RD_MAX_LENGTH: usize = 21;

/// Maximum length of a VRF name.
pub const VRF_NAME_MAX_LENGTH: usize = 100;

/// Direction of a paginated scan.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum PaginationOrder {
    Ascending,
    Descending,
}

/// Parameters used to request a specific page of results when listing a
/// collection of objects
///
/// By the time this struct is constructed, the type of the sort field is
/// known, and `DataPageParams` is specialized to that type.  This makes it
/// considerably simpler to implement the backend for most of our paginated
/// APIs.
///
/// `NameType` is the type of the field used to sort the returned values.
#[derive(Debug)]
pub struct DataPageParams<'a, NameType> {
    /// If present, this is the value of the sort field for the last object
    /// seen
    pub marker: Option<&'a NameType>,

    /// Whether the sort is in ascending order
    pub direction: PaginationOrder,

    /// This identifies how many results should be returned on this page.
    /// Backend implementations must provide this many results unless we're
    /// at the end of the scan.
    pub limit: NonZeroU32,
}

impl<'a, NameType> DataPageParams<'a, NameType> {
    /// Maps the marker type to a new type.
    ///
    /// Equivalent to [std::option::Option::map], because that's what it
    /// calls.
    pub fn map_name<OtherName, F>(&self, f: F) -> DataPageParams<'a, OtherName>
    where
        F: FnOnce(&'a NameType) -> &'a OtherName,
    {
        DataPageParams {
            marker: self.marker.map(f),
            direction: self.direction,
            limit: self.limit,
        }
    }
}

fn validate_label(
    value: &str,
    what: &str,
    max_length: usize,
) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} requires at least one character", what));
    }
    if value.len() > max_length {
        return Err(format!(
            "{} may contain at most {} characters",
            what, max_length
        ));
    }
    Ok(())
}

/// Name of a VRF
///
/// VRF names are free-form labels.  They are deliberately not unique: the
/// route distinguisher, not the name, disambiguates VRFs that carry
/// overlapping prefixes.
#[derive(
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    JsonSchema,
)]
#[display("{0}")]
#[serde(try_from = "String")]
pub struct VrfName(String);

impl TryFrom<String> for VrfName {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_label(&value, "name", VRF_NAME_MAX_LENGTH)?;
        Ok(VrfName(value))
    }
}

impl FromStr for VrfName {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        VrfName::try_from(String::from(value))
    }
}

impl VrfName {
    /// Parse a `VrfName`, marshalling any error into an appropriate
    /// `Error`.
    pub fn from_param(value: String, label: &str) -> Result<VrfName, Error> {
        value.parse().map_err(|e| Error::InvalidValue {
            label: String::from(label),
            message: e,
        })
    }

    /// Return the `&str` representing the actual name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Value of a route target (RFC 4360 extended community syntax)
///
/// Values are globally unique, compared case-sensitively.  The full RFC
/// 4360 syntax check is performed by the surrounding framework; only the
/// length constraint is enforced here.
#[derive(
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    JsonSchema,
)]
#[display("{0}")]
#[serde(try_from = "String")]
pub struct RouteTargetName(String);

impl TryFrom<String> for RouteTargetName {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_label(&value, "name", RD_MAX_LENGTH)?;
        Ok(RouteTargetName(value))
    }
}

impl FromStr for RouteTargetName {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RouteTargetName::try_from(String::from(value))
    }
}

impl RouteTargetName {
    pub fn from_param(
        value: String,
        label: &str,
    ) -> Result<RouteTargetName, Error> {
        value.parse().map_err(|e| Error::InvalidValue {
            label: String::from(label),
            message: e,
        })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A route distinguisher (RFC 4364)
///
/// Prepended to routes to disambiguate otherwise-identical prefixes across
/// VRFs.  Unique across all VRFs when present.
#[derive(
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    JsonSchema,
)]
#[display("{0}")]
#[serde(try_from = "String")]
pub struct RouteDistinguisher(String);

impl TryFrom<String> for RouteDistinguisher {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_label(&value, "rd", RD_MAX_LENGTH)?;
        Ok(RouteDistinguisher(value))
    }
}

impl FromStr for RouteDistinguisher {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        RouteDistinguisher::try_from(String::from(value))
    }
}

impl RouteDistinguisher {
    pub fn from_param(
        value: String,
        label: &str,
    ) -> Result<RouteDistinguisher, Error> {
        value.parse().map_err(|e| Error::InvalidValue {
            label: String::from(label),
            message: e,
        })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/*
 * General types used to implement API resources
 */

/// Identifies a type of API resource
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ResourceType {
    Tenant,
    Vrf,
    RouteTarget,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ResourceType::Tenant => "tenant",
                ResourceType::Vrf => "vrf",
                ResourceType::RouteTarget => "route target",
            }
        )
    }
}

/*
 * IDENTITY METADATA
 */

/// Identity-related metadata that's included in every primary resource
///
/// This is the read-side surface of the base "primary entity" contract:
/// system identity, free-form annotations, tags, the custom-field
/// document, and timestamps.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, JsonSchema)]
pub struct IdentityMetadata {
    /// unique, immutable, system-controlled identifier for each resource
    pub id: Uuid,
    /// human-readable free-form text about a resource
    pub description: String,
    /// longer free-form annotations
    pub comments: String,
    /// tags applied to this resource
    pub tags: Vec<String>,
    /// custom-field values keyed by field name; the field definitions live
    /// in the surrounding framework
    pub custom_fields: serde_json::Value,
    /// timestamp when this resource was created
    pub time_created: DateTime<Utc>,
    /// timestamp when this resource was last modified
    pub time_modified: DateTime<Utc>,
}

/// Create-time identity-related parameters
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct IdentityMetadataCreateParams {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "empty_custom_fields")]
    pub custom_fields: serde_json::Value,
}

fn empty_custom_fields() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for IdentityMetadataCreateParams {
    fn default() -> Self {
        IdentityMetadataCreateParams {
            description: String::new(),
            comments: String::new(),
            tags: Vec::new(),
            custom_fields: empty_custom_fields(),
        }
    }
}

/// Updateable identity-related parameters
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct IdentityMetadataUpdateParams {
    pub description: Option<String>,
    pub comments: Option<String>,
}

/*
 * Specific API resources
 */

/// View of a tenant
///
/// Tenants belong to a separate subsystem; this is the surface the IPAM
/// entities reference.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, JsonSchema)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub time_created: DateTime<Utc>,
    pub time_modified: DateTime<Utc>,
}

/// Create-time parameters for a tenant
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct TenantCreateParams {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// View of a route target
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, JsonSchema)]
pub struct RouteTarget {
    pub identity: IdentityMetadata,
    pub name: RouteTargetName,
    pub tenant_id: Option<Uuid>,
}

/// Create-time parameters for a route target
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct RouteTargetCreateParams {
    #[serde(default)]
    pub identity: IdentityMetadataCreateParams,
    pub name: RouteTargetName,
    pub tenant_id: Option<Uuid>,
}

/// Updateable parameters for a route target
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct RouteTargetUpdateParams {
    #[serde(default)]
    pub identity: IdentityMetadataUpdateParams,
    pub name: Option<RouteTargetName>,
}

/// View of a VRF
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, JsonSchema)]
pub struct Vrf {
    pub identity: IdentityMetadata,
    pub name: VrfName,
    /// route distinguisher (RFC 4364); unique across VRFs when present
    pub rd: Option<RouteDistinguisher>,
    pub tenant_id: Option<Uuid>,
    /// when true, prefixes and addresses within this VRF must not
    /// duplicate each other (consumed by the allocation subsystem)
    pub enforce_unique: bool,
}

impl Vrf {
    /// Pre-populates creation parameters for a VRF derived from this one.
    ///
    /// The tenant, uniqueness enforcement, and description carry over; the
    /// name and route distinguisher must be supplied by the caller.
    pub fn params_for_clone(
        &self,
        name: VrfName,
        rd: Option<RouteDistinguisher>,
    ) -> VrfCreateParams {
        VrfCreateParams {
            identity: IdentityMetadataCreateParams {
                description: self.identity.description.clone(),
                ..Default::default()
            },
            name,
            rd,
            tenant_id: self.tenant_id,
            enforce_unique: self.enforce_unique,
        }
    }
}

/// Create-time parameters for a VRF
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct VrfCreateParams {
    #[serde(default)]
    pub identity: IdentityMetadataCreateParams,
    pub name: VrfName,
    pub rd: Option<RouteDistinguisher>,
    pub tenant_id: Option<Uuid>,
    #[serde(default = "enforce_unique_default")]
    pub enforce_unique: bool,
}

fn enforce_unique_default() -> bool {
    true
}

/// Updateable parameters for a VRF
///
/// The outer `Option` on `rd` distinguishes "leave unchanged" (`None`)
/// from "set or clear" (`Some`).
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
pub struct VrfUpdateParams {
    #[serde(default)]
    pub identity: IdentityMetadataUpdateParams,
    pub name: Option<VrfName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rd: Option<Option<RouteDistinguisher>>,
    pub enforce_unique: Option<bool>,
}

#[cfg(test)]
mod test {
    use super::{
        Error, RouteDistinguisher, RouteTargetName, VrfName, RD_MAX_LENGTH,
        VRF_NAME_MAX_LENGTH,
    };

    #[test]
    fn test_name_parse() {
        // Error cases
        let long_name = "a".repeat(VRF_NAME_MAX_LENGTH + 1);
        let error_cases: Vec<(&str, &str)> = vec![
            ("", "name requires at least one character"),
            (&long_name, "name may contain at most 100 characters"),
        ];
        for (input, expected_message) in error_cases {
            let result: Result<VrfName, String> = input.parse();
            assert_eq!(result, Err(String::from(expected_message)));
        }

        // Success cases
        let name: VrfName = "Customer-A".parse().unwrap();
        assert_eq!(name.as_str(), "Customer-A");
        let name: VrfName = "a".repeat(VRF_NAME_MAX_LENGTH).parse().unwrap();
        assert_eq!(name.as_str().len(), VRF_NAME_MAX_LENGTH);
    }

    #[test]
    fn test_route_target_name_parse() {
        let long = "6".repeat(RD_MAX_LENGTH + 1);
        let result: Result<RouteTargetName, String> = long.parse();
        assert_eq!(
            result,
            Err(String::from("name may contain at most 21 characters"))
        );

        let name: RouteTargetName = "65000:100".parse().unwrap();
        assert_eq!(name.as_str(), "65000:100");
        assert_eq!(name.to_string(), "65000:100");
    }

    #[test]
    fn test_route_distinguisher_parse() {
        let long = "6".repeat(RD_MAX_LENGTH + 1);
        let result: Result<RouteDistinguisher, String> = long.parse();
        assert_eq!(
            result,
            Err(String::from("rd may contain at most 21 characters"))
        );
        let empty: Result<RouteDistinguisher, String> = "".parse();
        assert_eq!(
            empty,
            Err(String::from("rd requires at least one character"))
        );

        let rd: RouteDistinguisher = "65000:100".parse().unwrap();
        assert_eq!(rd.as_str(), "65000:100");

        // Validation failures surface before any write as InvalidValue.
        let err =
            RouteDistinguisher::from_param("6".repeat(30), "rd").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_name_serde() {
        // Names serialize as plain strings and validate on deserialization.
        let rd: RouteDistinguisher =
            serde_json::from_str("\"65000:100\"").unwrap();
        assert_eq!(rd.as_str(), "65000:100");
        assert_eq!(serde_json::to_string(&rd).unwrap(), "\"65000:100\"");

        let too_long = format!("\"{}\"", "x".repeat(30));
        let result: Result<RouteDistinguisher, _> =
            serde_json::from_str(&too_long);
        assert!(result.is_err());
    }
}
