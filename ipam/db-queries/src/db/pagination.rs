// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interface for paginating database queries.

use diesel::dsl::{Asc, Desc, Gt, Lt};
use diesel::expression::AsExpression;
use diesel::pg::Pg;
use diesel::query_builder::AsQuery;
use diesel::query_dsl::methods as query_methods;
use diesel::sql_types::SqlType;
use diesel::AppearsOnTable;
use diesel::Column;
use diesel::{ExpressionMethods, QueryDsl};
use ipam_common::api::external::DataPageParams;
use ipam_common::api::external::PaginationOrder;

// Shorthand alias for "the SQL type of the whole table".
type TableSqlType<T> = <T as AsQuery>::SqlType;

// Shorthand alias for the type made by "table.into_boxed()".
type BoxedQuery<T> = diesel::internal::table_macro::BoxedSelectStatement<
    'static,
    TableSqlType<T>,
    diesel::internal::table_macro::FromClause<T>,
    Pg,
>;

/// Uses `pagparams` to list a subset of rows in `table`, ordered by
/// `column`.
pub fn paginated<T, C, M>(
    table: T,
    column: C,
    pagparams: &DataPageParams<'_, M>,
) -> BoxedQuery<T>
where
    // T is a table which can create a BoxedQuery.
    T: diesel::Table,
    T: query_methods::BoxedDsl<'static, Pg, Output = BoxedQuery<T>>,
    // C is a column which appears in T.
    C: 'static
        + Column<Table = T>
        + Copy
        + ExpressionMethods
        + AppearsOnTable<T>,
    // Required to compare the column with the marker type.
    C::SqlType: SqlType,
    M: Clone + AsExpression<C::SqlType>,
    // Defines the methods which can be called on "query", and tells
    // the compiler we're gonna output a BoxedQuery each time.
    BoxedQuery<T>: query_methods::OrderDsl<Desc<C>, Output = BoxedQuery<T>>,
    BoxedQuery<T>: query_methods::OrderDsl<Asc<C>, Output = BoxedQuery<T>>,
    BoxedQuery<T>: query_methods::FilterDsl<Gt<C, M>, Output = BoxedQuery<T>>,
    BoxedQuery<T>: query_methods::FilterDsl<Lt<C, M>, Output = BoxedQuery<T>>,
{
    let mut query = table.into_boxed().limit(pagparams.limit.get().into());
    let marker = pagparams.marker.map(|m| m.clone());
    match pagparams.direction {
        PaginationOrder::Ascending => {
            if let Some(marker) = marker {
                query = query.filter(column.gt(marker));
            }
            query.order(column.asc())
        }
        PaginationOrder::Descending => {
            if let Some(marker) = marker {
                query = query.filter(column.lt(marker));
            }
            query.order(column.desc())
        }
    }
}

#[cfg(test)]
mod test {
    use super::paginated;
    use crate::db::schema::tenant;
    use diesel::pg::Pg;
    use ipam_common::api::external::DataPageParams;
    use ipam_common::api::external::PaginationOrder;
    use std::num::NonZeroU32;

    #[test]
    fn test_paginated_first_page() {
        let pagparams: DataPageParams<'_, String> = DataPageParams {
            marker: None,
            direction: PaginationOrder::Ascending,
            limit: NonZeroU32::new(8).unwrap(),
        };
        let query = paginated(tenant::table, tenant::name, &pagparams);
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains("ORDER BY"), "query was: {}", sql);
        assert!(sql.contains("LIMIT"), "query was: {}", sql);
        assert!(!sql.contains(">"), "query was: {}", sql);
    }

    #[test]
    fn test_paginated_with_marker() {
        let marker = String::from("acme");
        let pagparams = DataPageParams {
            marker: Some(&marker),
            direction: PaginationOrder::Ascending,
            limit: NonZeroU32::new(8).unwrap(),
        };
        let query = paginated(tenant::table, tenant::name, &pagparams);
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains(r#""tenant"."name" > $1"#), "query was: {}", sql);
        assert!(
            sql.contains(r#"ORDER BY "tenant"."name" ASC"#),
            "query was: {}",
            sql
        );
    }

    #[test]
    fn test_paginated_descending() {
        let marker = String::from("acme");
        let pagparams = DataPageParams {
            marker: Some(&marker),
            direction: PaginationOrder::Descending,
            limit: NonZeroU32::new(8).unwrap(),
        };
        let query = paginated(tenant::table, tenant::name, &pagparams);
        let sql = diesel::debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains(r#""tenant"."name" < $1"#), "query was: {}", sql);
        assert!(
            sql.contains(r#"ORDER BY "tenant"."name" DESC"#),
            "query was: {}",
            sql
        );
    }
}
