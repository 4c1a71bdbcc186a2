// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`DataStore`] methods on [`Tenant`]s.

use super::DataStore;
use crate::db;
use crate::db::error::public_error_from_diesel;
use crate::db::error::ErrorHandler;
use crate::db::model::Tenant;
use crate::db::pagination::paginated;
use async_bb8_diesel::AsyncRunQueryDsl;
use diesel::prelude::*;
use ipam_common::api::external::CreateResult;
use ipam_common::api::external::DataPageParams;
use ipam_common::api::external::DeleteResult;
use ipam_common::api::external::Error;
use ipam_common::api::external::ListResultVec;
use ipam_common::api::external::LookupResult;
use ipam_common::api::external::LookupType;
use ipam_common::api::external::ResourceType;
use uuid::Uuid;

// Generates internal functions used for validation during tenant deletion.
// Used simply to reduce boilerplate.
//
// It assumes:
//
// - $i is an identifier for a type of resource.
// - $i has a corresponding "db::schema::$i", which has a tenant_id and a
// $label field.
// - $label is a mandatory column of the table which is (1) looked up, and
// (2) used in an error message, if the resource still references the
// tenant.
macro_rules! generate_fn_to_ensure_none_for_tenant {
    ($i:ident, $label:ident, $label_ty:ty) => {
        ::paste::paste! {
            async fn [<ensure_no_ $i s_for_tenant>](
                &self,
                tenant_id: Uuid,
            ) -> DeleteResult {
                use db::schema::$i;

                let maybe_label = $i::dsl::$i
                    .filter($i::dsl::tenant_id.eq(tenant_id))
                    .select($i::dsl::$label)
                    .limit(1)
                    .first_async::<$label_ty>(&*self.pool_connection().await?)
                    .await
                    .optional()
                    .map_err(|e| public_error_from_diesel(e, ErrorHandler::Server))?;

                if let Some(label) = maybe_label {
                    let object = stringify!($i).replace('_', " ");
                    return Err(Error::in_use(
                        ResourceType::Tenant,
                        &format!("referenced by {} \"{}\"", object, label),
                    ));
                }

                Ok(())
            }
        }
    };
}

impl DataStore {
    /// Create a tenant
    pub async fn tenant_create(&self, tenant: Tenant) -> CreateResult<Tenant> {
        use db::schema::tenant::dsl;
        let name = tenant.name.clone();
        diesel::insert_into(dsl::tenant)
            .values(tenant)
            .returning(Tenant::as_returning())
            .get_result_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| {
                public_error_from_diesel(
                    e,
                    ErrorHandler::Conflict(ResourceType::Tenant, &name),
                )
            })
    }

    /// Fetch a tenant by id
    pub async fn tenant_fetch(&self, id: Uuid) -> LookupResult<Tenant> {
        use db::schema::tenant::dsl;
        dsl::tenant
            .filter(dsl::id.eq(id))
            .select(Tenant::as_select())
            .first_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| {
                public_error_from_diesel(
                    e,
                    ErrorHandler::NotFoundByLookup(
                        ResourceType::Tenant,
                        LookupType::ById(id),
                    ),
                )
            })
    }

    /// List tenants, ordered by name
    pub async fn tenants_list(
        &self,
        pagparams: &DataPageParams<'_, String>,
    ) -> ListResultVec<Tenant> {
        use db::schema::tenant::dsl;
        paginated(dsl::tenant, dsl::name, pagparams)
            .select(Tenant::as_select())
            .load_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| public_error_from_diesel(e, ErrorHandler::Server))
    }

    generate_fn_to_ensure_none_for_tenant!(vrf, name, String);
    generate_fn_to_ensure_none_for_tenant!(route_target, name, String);

    /// Delete a tenant
    ///
    /// Fails with [`Error::InUse`] while any VRF or route target still
    /// references the tenant; nothing is changed in that case.  The
    /// RESTRICT foreign keys backstop the explicit checks against a racing
    /// writer.
    pub async fn tenant_delete(&self, id: Uuid) -> DeleteResult {
        self.ensure_no_vrfs_for_tenant(id).await?;
        self.ensure_no_route_targets_for_tenant(id).await?;

        use db::schema::tenant::dsl;
        let rows = diesel::delete(dsl::tenant)
            .filter(dsl::id.eq(id))
            .execute_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| {
                public_error_from_diesel(
                    e,
                    ErrorHandler::Protect(ResourceType::Tenant, "tenant"),
                )
            })?;
        if rows == 0 {
            return Err(Error::not_found_by_id(ResourceType::Tenant, &id));
        }
        info!(self.log, "deleted tenant"; "tenant_id" => %id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::db::model::{RouteTarget, Tenant, Vrf};
    use crate::db::pub_test_utils::{test_setup_log, TestDatabase};
    use ipam_common::api::external::{self, Error};

    fn tenant_params(name: &str) -> external::TenantCreateParams {
        external::TenantCreateParams {
            name: name.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_tenant_delete_protected_while_referenced() {
        let log = test_setup_log("test_tenant_delete_protected");
        let Some(db) = TestDatabase::new(&log).await else { return };
        let datastore = db.datastore().clone();

        let tenant = datastore
            .tenant_create(Tenant::new(tenant_params("acme")))
            .await
            .unwrap();

        let vrf = datastore
            .vrf_create(Vrf::new(external::VrfCreateParams {
                identity: Default::default(),
                name: "Customer-A".parse().unwrap(),
                rd: None,
                tenant_id: Some(tenant.id),
                enforce_unique: true,
            }))
            .await
            .unwrap();

        // The delete must fail and leave both rows in place.
        let err = datastore
            .tenant_delete(tenant.id)
            .await
            .expect_err("tenant delete should fail while a vrf references it");
        assert!(matches!(err, Error::InUse { .. }), "error was: {:?}", err);
        datastore.tenant_fetch(tenant.id).await.unwrap();
        datastore.vrf_fetch(vrf.id).await.unwrap();

        // Route target references protect the tenant the same way.
        datastore.vrf_delete(vrf.id).await.unwrap();
        let rt = datastore
            .route_target_create(RouteTarget::new(
                external::RouteTargetCreateParams {
                    identity: Default::default(),
                    name: "65000:100".parse().unwrap(),
                    tenant_id: Some(tenant.id),
                },
            ))
            .await
            .unwrap();
        let err = datastore
            .tenant_delete(tenant.id)
            .await
            .expect_err("tenant delete should fail while a target references it");
        assert!(matches!(err, Error::InUse { .. }), "error was: {:?}", err);

        // Once the references are gone the delete goes through.
        datastore.route_target_delete(rt.id).await.unwrap();
        datastore.tenant_delete(tenant.id).await.unwrap();
        let err = datastore.tenant_fetch(tenant.id).await.unwrap_err();
        assert!(matches!(err, Error::ObjectNotFound { .. }));

        db.terminate().await;
    }

    #[tokio::test]
    async fn test_tenant_names_are_unique() {
        let log = test_setup_log("test_tenant_names_are_unique");
        let Some(db) = TestDatabase::new(&log).await else { return };
        let datastore = db.datastore().clone();

        datastore
            .tenant_create(Tenant::new(tenant_params("acme")))
            .await
            .unwrap();
        let err = datastore
            .tenant_create(Tenant::new(tenant_params("acme")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ObjectAlreadyExists { .. }));

        db.terminate().await;
    }
}
