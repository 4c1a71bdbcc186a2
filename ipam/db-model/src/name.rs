// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Database newtypes around the validated name types.

use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, ToSql};
use diesel::sql_types;
use ipam_common::api::external;
use parse_display::Display;
use ref_cast::RefCast;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Newtype wrapper around [`external::VrfName`].
#[derive(
    Clone,
    Debug,
    Display,
    AsExpression,
    FromSqlRow,
    Eq,
    Hash,
    PartialEq,
    Ord,
    PartialOrd,
    RefCast,
    JsonSchema,
    Serialize,
    Deserialize,
)]
#[diesel(sql_type = sql_types::Text)]
#[serde(transparent)]
#[repr(transparent)]
#[display("{0}")]
pub struct VrfName(pub external::VrfName);

NewtypeFrom! { () pub struct VrfName(external::VrfName); }
NewtypeDeref! { () pub struct VrfName(external::VrfName); }

impl<DB> ToSql<sql_types::Text, DB> for VrfName
where
    DB: Backend,
    str: ToSql<sql_types::Text, DB>,
{
    fn to_sql<'a>(
        &'a self,
        out: &mut serialize::Output<'a, '_, DB>,
    ) -> serialize::Result {
        self.as_str().to_sql(out)
    }
}

// Deserialize the "VrfName" object from SQL TEXT.
impl<DB> FromSql<sql_types::Text, DB> for VrfName
where
    DB: Backend,
    String: FromSql<sql_types::Text, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        String::from_sql(bytes)?.parse().map(VrfName).map_err(|e| e.into())
    }
}

/// Newtype wrapper around [`external::RouteTargetName`].
#[derive(
    Clone,
    Debug,
    Display,
    AsExpression,
    FromSqlRow,
    Eq,
    Hash,
    PartialEq,
    Ord,
    PartialOrd,
    RefCast,
    JsonSchema,
    Serialize,
    Deserialize,
)]
#[diesel(sql_type = sql_types::Text)]
#[serde(transparent)]
#[repr(transparent)]
#[display("{0}")]
pub struct RouteTargetName(pub external::RouteTargetName);

NewtypeFrom! { () pub struct RouteTargetName(external::RouteTargetName); }
NewtypeDeref! { () pub struct RouteTargetName(external::RouteTargetName); }

impl<DB> ToSql<sql_types::Text, DB> for RouteTargetName
where
    DB: Backend,
    str: ToSql<sql_types::Text, DB>,
{
    fn to_sql<'a>(
        &'a self,
        out: &mut serialize::Output<'a, '_, DB>,
    ) -> serialize::Result {
        self.as_str().to_sql(out)
    }
}

impl<DB> FromSql<sql_types::Text, DB> for RouteTargetName
where
    DB: Backend,
    String: FromSql<sql_types::Text, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        String::from_sql(bytes)?
            .parse()
            .map(RouteTargetName)
            .map_err(|e| e.into())
    }
}

/// Newtype wrapper around [`external::RouteDistinguisher`].
#[derive(
    Clone,
    Debug,
    Display,
    AsExpression,
    FromSqlRow,
    Eq,
    Hash,
    PartialEq,
    Ord,
    PartialOrd,
    RefCast,
    JsonSchema,
    Serialize,
    Deserialize,
)]
#[diesel(sql_type = sql_types::Text)]
#[serde(transparent)]
#[repr(transparent)]
#[display("{0}")]
pub struct RouteDistinguisher(pub external::RouteDistinguisher);

NewtypeFrom! { () pub struct RouteDistinguisher(external::RouteDistinguisher); }
NewtypeDeref! { () pub struct RouteDistinguisher(external::RouteDistinguisher); }

impl<DB> ToSql<sql_types::Text, DB> for RouteDistinguisher
where
    DB: Backend,
    str: ToSql<sql_types::Text, DB>,
{
    fn to_sql<'a>(
        &'a self,
        out: &mut serialize::Output<'a, '_, DB>,
    ) -> serialize::Result {
        self.as_str().to_sql(out)
    }
}

impl<DB> FromSql<sql_types::Text, DB> for RouteDistinguisher
where
    DB: Backend,
    String: FromSql<sql_types::Text, DB>,
{
    fn from_sql(bytes: DB::RawValue<'_>) -> deserialize::Result<Self> {
        String::from_sql(bytes)?
            .parse()
            .map(RouteDistinguisher)
            .map_err(|e| e.into())
    }
}
