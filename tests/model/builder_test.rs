//! Integration tests for building the schema model from a catalog.

use schemata::catalog::{CatalogOperation, InspectError, MemoryCatalog, MemoryTable};
use schemata::model::{build_schema, BuildError};
use schemata::types::{TypeKind, TypeRegistry};

fn shop() -> MemoryCatalog {
    MemoryCatalog::new()
        .with_enum("public", "order_status", &["pending", "paid", "shipped"])
        .with_table(
            MemoryTable::new("public", "customers")
                .column("id", "int8", false)
                .column("email", "text", false)
                .column("avatar_url", "text", true)
                .primary_key(["id"])
                .index("customers_email_key", ["email"]),
        )
        .with_table(
            MemoryTable::new("public", "order_items")
                .column("order_id", "int8", false)
                .column("line_no", "int4", false)
                .column("sku", "varchar", false)
                .primary_key(["order_id", "line_no"]),
        )
        .with_table(
            MemoryTable::new("public", "orders")
                .column("id", "int8", false)
                .column("customer_id", "int8", false)
                .column("status", "order_status", false)
                .column("created_at", "timestamptz", false)
                .primary_key(["id"])
                .index("orders_lower_idx", ["lower(status::text)"]),
        )
        .with_table(MemoryTable::new("public", "audit_log").column("message", "text", false))
}

#[tokio::test]
async fn test_builds_every_table() {
    let mut registry = TypeRegistry::new();
    let schema = build_schema(&shop(), "public", &mut registry).await.unwrap();

    let names: Vec<&str> = schema.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["customers", "order_items", "orders", "audit_log"]);
    assert_eq!(schema.name, "public");
}

#[tokio::test]
async fn test_primary_keys_match_flags() {
    let mut registry = TypeRegistry::new();
    let schema = build_schema(&shop(), "public", &mut registry).await.unwrap();

    for table in &schema.tables {
        let flagged: Vec<&str> = table
            .columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect();
        let keys: Vec<&str> = table.primary_keys.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(flagged, keys, "primary key of {}", table.name);
    }

    let items = schema.table("order_items").unwrap();
    assert_eq!(items.primary_keys.len(), 2);
    assert!(!schema.table("audit_log").unwrap().has_primary_key());
}

#[tokio::test]
async fn test_column_positions_unique_and_ordered() {
    let mut registry = TypeRegistry::new();
    let schema = build_schema(&shop(), "public", &mut registry).await.unwrap();

    for table in &schema.tables {
        let positions: Vec<i32> = table.columns.iter().map(|c| c.position).collect();
        let expected: Vec<i32> = (1..=table.columns.len() as i32).collect();
        assert_eq!(positions, expected, "positions of {}", table.name);
    }
}

#[tokio::test]
async fn test_enum_column_resolves_to_enum_type() {
    let mut registry = TypeRegistry::new();
    let schema = build_schema(&shop(), "public", &mut registry).await.unwrap();

    let status = schema.table("orders").unwrap().column("status").unwrap();
    assert_eq!(
        status.type_kind(&registry).unwrap(),
        &TypeKind::Enum {
            name: "order_status".to_string(),
            exported: "OrderStatus".to_string(),
        }
    );

    let en = schema.enum_type("order_status").unwrap();
    assert_eq!(en.values, vec!["pending", "paid", "shipped"]);
}

#[tokio::test]
async fn test_indexes_resolved_and_expressions_skipped() {
    let mut registry = TypeRegistry::new();
    let schema = build_schema(&shop(), "public", &mut registry).await.unwrap();

    let customers = schema.table("customers").unwrap();
    let email_key = customers.index("customers_email_key").unwrap();
    assert_eq!(email_key.columns[0].name, "email");

    assert!(schema.table("orders").unwrap().indexes.is_empty());
}

#[tokio::test]
async fn test_index_on_quoted_column_names() {
    let catalog = MemoryCatalog::new().with_table(
        MemoryTable::new("public", "shipments")
            .column("id", "int8", false)
            .column("order", "int4", false)
            .column("ShippedAt", "timestamptz", false)
            .primary_key(["id"])
            .index("shipments_order_idx", ["\"order\"", "\"ShippedAt\""]),
    );

    let mut registry = TypeRegistry::new();
    let schema = build_schema(&catalog, "public", &mut registry).await.unwrap();

    let index = schema
        .table("shipments")
        .unwrap()
        .index("shipments_order_idx")
        .unwrap();
    let names: Vec<&str> = index.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["order", "ShippedAt"]);
}

#[tokio::test]
async fn test_enum_name_in_two_schemas_is_merged() {
    let catalog = MemoryCatalog::new()
        .with_enum("public", "mood", &["happy"])
        .with_enum("audit", "mood", &["sad"]);

    let mut registry = TypeRegistry::new();
    let schema = build_schema(&catalog, "public", &mut registry).await.unwrap();

    assert_eq!(schema.enums.len(), 1);
    assert_eq!(schema.enums[0].schema, "public");
    assert_eq!(schema.enums[0].values, vec!["happy", "sad"]);
}

#[tokio::test]
async fn test_unmapped_column_type() {
    let catalog = MemoryCatalog::new().with_table(
        MemoryTable::new("public", "ledger")
            .column("id", "int8", false)
            .column("amount", "numeric", false),
    );

    let mut registry = TypeRegistry::new();
    let err = build_schema(&catalog, "public", &mut registry)
        .await
        .unwrap_err();

    match err {
        BuildError::UnmappedType {
            table,
            column,
            udt_name,
        } => {
            assert_eq!(table, "ledger");
            assert_eq!(column, "amount");
            assert_eq!(udt_name, "numeric");
        }
        other => panic!("expected UnmappedType, got {:?}", other),
    }
}

#[tokio::test]
async fn test_enum_from_another_schema_still_types_columns() {
    let catalog = MemoryCatalog::new()
        .with_enum("shared", "currency", &["eur", "usd"])
        .with_table(MemoryTable::new("public", "prices").column("currency", "currency", false));

    let mut registry = TypeRegistry::new();
    let schema = build_schema(&catalog, "public", &mut registry).await.unwrap();

    assert_eq!(schema.enums.len(), 1);
    assert_eq!(schema.enums[0].schema, "shared");
}

#[tokio::test]
async fn test_catalog_failure_aborts() {
    for operation in [
        CatalogOperation::Enums,
        CatalogOperation::Tables,
        CatalogOperation::Columns,
        CatalogOperation::PrimaryKey,
        CatalogOperation::Indexes,
    ] {
        let catalog = shop().failing_on(operation);
        let mut registry = TypeRegistry::new();

        let err = build_schema(&catalog, "public", &mut registry)
            .await
            .unwrap_err();
        match err {
            BuildError::Inspect(inner @ InspectError::Query { .. }) => {
                assert_eq!(inner.operation(), operation);
            }
            other => panic!("expected inspect error for {}, got {:?}", operation, other),
        }
    }
}

#[tokio::test]
async fn test_enum_clashing_with_builtin_fails() {
    let catalog = MemoryCatalog::new().with_enum("public", "text", &["a"]);

    let mut registry = TypeRegistry::new();
    let err = build_schema(&catalog, "public", &mut registry)
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Registry(_)));
}

#[tokio::test]
async fn test_other_schemas_excluded() {
    let catalog =
        shop().with_table(MemoryTable::new("audit", "events").column("id", "int8", false));

    let mut registry = TypeRegistry::new();
    let schema = build_schema(&catalog, "public", &mut registry).await.unwrap();
    assert!(schema.table("events").is_none());
}
