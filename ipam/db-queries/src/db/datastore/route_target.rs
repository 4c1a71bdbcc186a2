// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`DataStore`] methods on [`RouteTarget`]s.

use super::DataStore;
use crate::db;
use crate::db::error::public_error_from_diesel;
use crate::db::error::ErrorHandler;
use crate::db::error::TransactionError;
use crate::db::model::{RouteTarget, RouteTargetUpdate, Vrf};
use async_bb8_diesel::{AsyncConnection, AsyncRunQueryDsl};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::result::Error as DieselError;
use ipam_common::api::external::CreateResult;
use ipam_common::api::external::DataPageParams;
use ipam_common::api::external::DeleteResult;
use ipam_common::api::external::Error;
use ipam_common::api::external::ListResultVec;
use ipam_common::api::external::LookupResult;
use ipam_common::api::external::LookupType;
use ipam_common::api::external::PaginationOrder;
use ipam_common::api::external::ResourceType;
use ipam_common::api::external::UpdateResult;
use ipam_db_model::natural_sort_key;
use uuid::Uuid;

impl DataStore {
    /// Create a route target
    ///
    /// The value's global uniqueness is enforced by the database index, so
    /// of two concurrent writers inserting the same value, exactly one
    /// succeeds and the other sees [`Error::ObjectAlreadyExists`].
    pub async fn route_target_create(
        &self,
        rt: RouteTarget,
    ) -> CreateResult<RouteTarget> {
        use db::schema::route_target::dsl;
        let name = rt.name.to_string();
        diesel::insert_into(dsl::route_target)
            .values(rt)
            .returning(RouteTarget::as_returning())
            .get_result_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| match &e {
                DieselError::DatabaseError(
                    DatabaseErrorKind::ForeignKeyViolation,
                    _,
                ) => Error::invalid_request("tenant does not exist"),
                _ => public_error_from_diesel(
                    e,
                    ErrorHandler::Conflict(ResourceType::RouteTarget, &name),
                ),
            })
    }

    /// Fetch a route target by id
    pub async fn route_target_fetch(
        &self,
        id: Uuid,
    ) -> LookupResult<RouteTarget> {
        use db::schema::route_target::dsl;
        dsl::route_target
            .filter(dsl::id.eq(id))
            .select(RouteTarget::as_select())
            .first_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| {
                public_error_from_diesel(
                    e,
                    ErrorHandler::NotFoundByLookup(
                        ResourceType::RouteTarget,
                        LookupType::ById(id),
                    ),
                )
            })
    }

    /// Update a route target (clobbering update -- no etag)
    pub async fn route_target_update(
        &self,
        id: Uuid,
        updates: RouteTargetUpdate,
    ) -> UpdateResult<RouteTarget> {
        use db::schema::route_target::dsl;
        let name =
            updates.name.as_ref().map(|n| n.to_string()).unwrap_or_default();
        diesel::update(dsl::route_target)
            .filter(dsl::id.eq(id))
            .set(updates)
            .returning(RouteTarget::as_returning())
            .get_result_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| match &e {
                DieselError::DatabaseError(
                    DatabaseErrorKind::UniqueViolation,
                    _,
                ) => public_error_from_diesel(
                    e,
                    ErrorHandler::Conflict(ResourceType::RouteTarget, &name),
                ),
                _ => public_error_from_diesel(
                    e,
                    ErrorHandler::NotFoundByLookup(
                        ResourceType::RouteTarget,
                        LookupType::ById(id),
                    ),
                ),
            })
    }

    /// List route targets in natural-sort order of their values.
    ///
    /// The pagination marker is the value of the last target seen.  The
    /// scan orders by the derived sort key, breaking ties between
    /// numerically-equal values on the value itself.
    pub async fn route_targets_list(
        &self,
        pagparams: &DataPageParams<'_, String>,
    ) -> ListResultVec<RouteTarget> {
        use db::schema::route_target::dsl;

        let mut query = dsl::route_target
            .into_boxed()
            .limit(pagparams.limit.get().into());
        match pagparams.direction {
            PaginationOrder::Ascending => {
                if let Some(marker) = pagparams.marker {
                    let key = natural_sort_key(marker);
                    query = query.filter(
                        dsl::name_key.gt(key.clone()).or(dsl::name_key
                            .eq(key)
                            .and(dsl::name.gt(marker.clone()))),
                    );
                }
                query = query
                    .order(dsl::name_key.asc())
                    .then_order_by(dsl::name.asc());
            }
            PaginationOrder::Descending => {
                if let Some(marker) = pagparams.marker {
                    let key = natural_sort_key(marker);
                    query = query.filter(
                        dsl::name_key.lt(key.clone()).or(dsl::name_key
                            .eq(key)
                            .and(dsl::name.lt(marker.clone()))),
                    );
                }
                query = query
                    .order(dsl::name_key.desc())
                    .then_order_by(dsl::name.desc());
            }
        }

        query
            .select(RouteTarget::as_select())
            .load_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| public_error_from_diesel(e, ErrorHandler::Server))
    }

    /// Delete a route target
    ///
    /// Membership in VRF import/export sets never blocks the delete: the
    /// membership rows are removed along with the target in a single
    /// transaction.
    pub async fn route_target_delete(&self, id: Uuid) -> DeleteResult {
        use db::schema::route_target::dsl;
        use db::schema::vrf_export_targets::dsl as export_dsl;
        use db::schema::vrf_import_targets::dsl as import_dsl;

        type TxnError = TransactionError<Error>;
        let conn = self.pool_connection().await?;
        conn.transaction_async(|conn| async move {
            diesel::delete(import_dsl::vrf_import_targets)
                .filter(import_dsl::route_target_id.eq(id))
                .execute_async(&conn)
                .await?;
            diesel::delete(export_dsl::vrf_export_targets)
                .filter(export_dsl::route_target_id.eq(id))
                .execute_async(&conn)
                .await?;
            let rows = diesel::delete(dsl::route_target)
                .filter(dsl::id.eq(id))
                .execute_async(&conn)
                .await?;
            if rows == 0 {
                return Err(TxnError::CustomError(Error::not_found_by_id(
                    ResourceType::RouteTarget,
                    &id,
                )));
            }
            Ok(())
        })
        .await
        .map_err(|e| match e {
            TxnError::CustomError(e) => e,
            TxnError::Database(e) => {
                public_error_from_diesel(e, ErrorHandler::Server)
            }
        })?;
        info!(self.log, "deleted route target"; "route_target_id" => %id);
        Ok(())
    }

    /// List the VRFs importing this route target.
    pub async fn route_target_importing_vrfs(
        &self,
        id: Uuid,
    ) -> ListResultVec<Vrf> {
        use db::schema::vrf::dsl;
        use db::schema::vrf_import_targets::dsl as import_dsl;
        import_dsl::vrf_import_targets
            .inner_join(dsl::vrf)
            .filter(import_dsl::route_target_id.eq(id))
            .order(dsl::name_key.asc())
            .then_order_by(dsl::rd.asc())
            .then_order_by(dsl::id.asc())
            .select(Vrf::as_select())
            .load_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| public_error_from_diesel(e, ErrorHandler::Server))
    }

    /// List the VRFs exporting this route target.
    pub async fn route_target_exporting_vrfs(
        &self,
        id: Uuid,
    ) -> ListResultVec<Vrf> {
        use db::schema::vrf::dsl;
        use db::schema::vrf_export_targets::dsl as export_dsl;
        export_dsl::vrf_export_targets
            .inner_join(dsl::vrf)
            .filter(export_dsl::route_target_id.eq(id))
            .order(dsl::name_key.asc())
            .then_order_by(dsl::rd.asc())
            .then_order_by(dsl::id.asc())
            .select(Vrf::as_select())
            .load_async(&*self.pool_connection().await?)
            .await
            .map_err(|e| public_error_from_diesel(e, ErrorHandler::Server))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::model::{RouteTarget, RouteTargetUpdate, Vrf};
    use crate::db::pub_test_utils::{test_setup_log, TestDatabase};
    use ipam_common::api::external::{
        self, DataPageParams, Error, PaginationOrder,
    };
    use std::num::NonZeroU32;

    fn rt_params(name: &str) -> external::RouteTargetCreateParams {
        external::RouteTargetCreateParams {
            identity: Default::default(),
            name: name.parse().unwrap(),
            tenant_id: None,
        }
    }

    fn vrf_params(name: &str) -> external::VrfCreateParams {
        external::VrfCreateParams {
            identity: Default::default(),
            name: name.parse().unwrap(),
            rd: None,
            tenant_id: None,
            enforce_unique: true,
        }
    }

    fn all(direction: PaginationOrder) -> DataPageParams<'static, String> {
        DataPageParams {
            marker: None,
            direction,
            limit: NonZeroU32::new(100).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_values_rejected() {
        let log = test_setup_log("test_duplicate_values_rejected");
        let Some(db) = TestDatabase::new(&log).await else { return };
        let datastore = db.datastore().clone();

        datastore
            .route_target_create(RouteTarget::new(rt_params("65000:100")))
            .await
            .expect("first insert of a value should succeed");
        let err = datastore
            .route_target_create(RouteTarget::new(rt_params("65000:100")))
            .await
            .expect_err("second insert of the same value should fail");
        assert!(
            matches!(err, Error::ObjectAlreadyExists { .. }),
            "error was: {:?}",
            err
        );

        // Values compare case-sensitively; a different case is a
        // different value.
        datastore
            .route_target_create(RouteTarget::new(rt_params("target-a")))
            .await
            .unwrap();
        datastore
            .route_target_create(RouteTarget::new(rt_params("Target-A")))
            .await
            .unwrap();

        db.terminate().await;
    }

    #[tokio::test]
    async fn test_list_in_natural_order() {
        let log = test_setup_log("test_list_in_natural_order");
        let Some(db) = TestDatabase::new(&log).await else { return };
        let datastore = db.datastore().clone();

        for name in ["RT-10", "RT-9", "RT-1", "65000:100"] {
            datastore
                .route_target_create(RouteTarget::new(rt_params(name)))
                .await
                .unwrap();
        }

        let listed: Vec<String> = datastore
            .route_targets_list(&all(PaginationOrder::Ascending))
            .await
            .unwrap()
            .into_iter()
            .map(|rt| rt.name.to_string())
            .collect();
        assert_eq!(listed, vec!["65000:100", "RT-1", "RT-9", "RT-10"]);

        // Walk the same listing one element at a time using the marker.
        let mut seen = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let pagparams = DataPageParams {
                marker: marker.as_ref(),
                direction: PaginationOrder::Ascending,
                limit: NonZeroU32::new(1).unwrap(),
            };
            let page =
                datastore.route_targets_list(&pagparams).await.unwrap();
            let Some(rt) = page.into_iter().next() else { break };
            marker = Some(rt.name.to_string());
            seen.push(rt.name.to_string());
        }
        assert_eq!(seen, listed);

        db.terminate().await;
    }

    #[tokio::test]
    async fn test_delete_removes_memberships() {
        let log = test_setup_log("test_delete_removes_memberships");
        let Some(db) = TestDatabase::new(&log).await else { return };
        let datastore = db.datastore().clone();

        let rt = datastore
            .route_target_create(RouteTarget::new(rt_params("65000:1")))
            .await
            .unwrap();
        let kept = datastore
            .route_target_create(RouteTarget::new(rt_params("65000:2")))
            .await
            .unwrap();
        let vrf = datastore
            .vrf_create(Vrf::new(vrf_params("Customer-A")))
            .await
            .unwrap();
        datastore
            .vrf_import_targets_add(vrf.id, &[rt.id, kept.id])
            .await
            .unwrap();
        datastore
            .vrf_export_targets_add(vrf.id, &[rt.id])
            .await
            .unwrap();

        // Membership does not block deletion; the membership rows go with
        // the target.
        datastore.route_target_delete(rt.id).await.unwrap();
        let imports =
            datastore.vrf_import_targets_list(vrf.id).await.unwrap();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].id, kept.id);
        let exports =
            datastore.vrf_export_targets_list(vrf.id).await.unwrap();
        assert!(exports.is_empty());

        db.terminate().await;
    }

    #[tokio::test]
    async fn test_rename_keeps_ordering_and_uniqueness() {
        let log = test_setup_log("test_rename_keeps_ordering");
        let Some(db) = TestDatabase::new(&log).await else { return };
        let datastore = db.datastore().clone();

        let rt = datastore
            .route_target_create(RouteTarget::new(rt_params("RT-5")))
            .await
            .unwrap();
        datastore
            .route_target_create(RouteTarget::new(rt_params("RT-10")))
            .await
            .unwrap();

        // Renaming to an existing value trips the unique index.
        let err = datastore
            .route_target_update(
                rt.id,
                RouteTargetUpdate::from(external::RouteTargetUpdateParams {
                    identity: Default::default(),
                    name: Some("RT-10".parse().unwrap()),
                }),
            )
            .await
            .expect_err("rename onto an existing value should fail");
        assert!(matches!(err, Error::ObjectAlreadyExists { .. }));

        // A rename re-derives the sort key, so the listing follows the
        // new value.
        datastore
            .route_target_update(
                rt.id,
                RouteTargetUpdate::from(external::RouteTargetUpdateParams {
                    identity: Default::default(),
                    name: Some("RT-20".parse().unwrap()),
                }),
            )
            .await
            .unwrap();
        let listed: Vec<String> = datastore
            .route_targets_list(&all(PaginationOrder::Ascending))
            .await
            .unwrap()
            .into_iter()
            .map(|rt| rt.name.to_string())
            .collect();
        assert_eq!(listed, vec!["RT-10", "RT-20"]);

        db.terminate().await;
    }

    #[tokio::test]
    async fn test_reverse_lookups() {
        let log = test_setup_log("test_reverse_lookups");
        let Some(db) = TestDatabase::new(&log).await else { return };
        let datastore = db.datastore().clone();

        let rt = datastore
            .route_target_create(RouteTarget::new(rt_params("65000:1")))
            .await
            .unwrap();
        let importer = datastore
            .vrf_create(Vrf::new(vrf_params("importer")))
            .await
            .unwrap();
        let exporter = datastore
            .vrf_create(Vrf::new(vrf_params("exporter")))
            .await
            .unwrap();
        datastore
            .vrf_import_targets_add(importer.id, &[rt.id])
            .await
            .unwrap();
        datastore
            .vrf_export_targets_add(exporter.id, &[rt.id])
            .await
            .unwrap();

        let importing =
            datastore.route_target_importing_vrfs(rt.id).await.unwrap();
        assert_eq!(importing.len(), 1);
        assert_eq!(importing[0].id, importer.id);

        let exporting =
            datastore.route_target_exporting_vrfs(rt.id).await.unwrap();
        assert_eq!(exporting.len(), 1);
        assert_eq!(exporting[0].id, exporter.id);

        db.terminate().await;
    }
}
