// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Describes the Diesel database schema.
//!
//! NOTE: Should be kept up-to-date with schema/dbinit.sql.

table! {
    tenant (id) {
        id -> Uuid,
        name -> Text,
        description -> Text,
        time_created -> Timestamptz,
        time_modified -> Timestamptz,
    }
}

table! {
    route_target (id) {
        id -> Uuid,
        name -> Text,
        name_key -> Text,
        tenant_id -> Nullable<Uuid>,
        description -> Text,
        comments -> Text,
        tags -> Array<Text>,
        custom_field_data -> Jsonb,
        time_created -> Timestamptz,
        time_modified -> Timestamptz,
    }
}

table! {
    vrf (id) {
        id -> Uuid,
        name -> Text,
        name_key -> Text,
        rd -> Nullable<Text>,
        tenant_id -> Nullable<Uuid>,
        enforce_unique -> Bool,
        description -> Text,
        comments -> Text,
        tags -> Array<Text>,
        custom_field_data -> Jsonb,
        time_created -> Timestamptz,
        time_modified -> Timestamptz,
    }
}

table! {
    vrf_import_targets (vrf_id, route_target_id) {
        vrf_id -> Uuid,
        route_target_id -> Uuid,
    }
}

table! {
    vrf_export_targets (vrf_id, route_target_id) {
        vrf_id -> Uuid,
        route_target_id -> Uuid,
    }
}

joinable!(vrf -> tenant (tenant_id));
joinable!(route_target -> tenant (tenant_id));
joinable!(vrf_import_targets -> vrf (vrf_id));
joinable!(vrf_import_targets -> route_target (route_target_id));
joinable!(vrf_export_targets -> vrf (vrf_id));
joinable!(vrf_export_targets -> route_target (route_target_id));

allow_tables_to_appear_in_same_query!(
    tenant,
    route_target,
    vrf,
    vrf_import_targets,
    vrf_export_targets,
);
