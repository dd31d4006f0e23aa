//! Integration tests for query definition resolution.

use schemata::model::{Column, Schema, Table};
use schemata::query::{
    resolve_queries, Cardinality, FilterOp, QueryDefinition, QueryDefinitions, ResolveError,
    SpecKind,
};

fn column(position: i32, name: &str, udt_name: &str, is_primary_key: bool) -> Column {
    Column {
        position,
        name: name.to_string(),
        udt_name: udt_name.to_string(),
        nullable: false,
        is_primary_key,
    }
}

fn schema() -> Schema {
    Schema {
        name: "public".to_string(),
        enums: vec![],
        tables: vec![
            Table::new(
                "",
                "public",
                "users",
                vec![
                    column(1, "id", "int8", true),
                    column(2, "email", "text", false),
                    column(3, "x_created_at", "timestamptz", false),
                    column(4, "created_at", "timestamptz", false),
                ],
            ),
            Table::new(
                "",
                "public",
                "products",
                vec![
                    column(1, "id", "int8", true),
                    column(2, "price", "float8", false),
                ],
            ),
            Table::new("", "public", "audit_log", vec![column(1, "message", "text", false)]),
        ],
    }
}

fn definitions(defs: Vec<QueryDefinition>) -> QueryDefinitions {
    QueryDefinitions { query: defs }
}

#[test]
fn test_range_filter_forces_many() {
    let defs = definitions(vec![
        QueryDefinition::new("ListExpensive", "products").field("price:gt")
    ]);

    let queries = resolve_queries(&defs, &schema()).unwrap();
    let query = &queries[0];

    assert_eq!(query.filters[0].op, FilterOp::Gt);
    assert_eq!(query.filters[0].sql_op(), ">");
    assert!(query.return_many);
    assert!(!query.return_one);
    assert_eq!(query.cardinality(), Cardinality::Many);
}

#[test]
fn test_equality_without_return_sets_no_flags() {
    let defs = definitions(vec![QueryDefinition::new("FindUser", "users").field("id:eq")]);

    let queries = resolve_queries(&defs, &schema()).unwrap();
    let query = &queries[0];

    assert!(!query.return_one);
    assert!(!query.return_many);
    assert!(!query.paged);
    assert_eq!(query.cardinality(), Cardinality::Unspecified);
}

#[test]
fn test_return_one_with_range_filter_keeps_one() {
    let defs = definitions(vec![QueryDefinition::new("Latest", "users")
        .field("created_at:gteq")
        .returns("one")]);

    let queries = resolve_queries(&defs, &schema()).unwrap();
    assert!(queries[0].return_one);
    assert!(queries[0].return_many);
    assert_eq!(queries[0].cardinality(), Cardinality::One);
}

#[test]
fn test_paged_implies_many() {
    let defs = definitions(vec![QueryDefinition::new("ListUsers", "users").returns("paged")]);

    let queries = resolve_queries(&defs, &schema()).unwrap();
    assert!(queries[0].paged);
    assert!(queries[0].return_many);
    assert!(queries[0].matches_all_rows());
    assert_eq!(queries[0].cardinality(), Cardinality::Paged);
}

#[test]
fn test_sort_prefers_exact_column() {
    let defs = definitions(vec![QueryDefinition::new("Recent", "users").sort("-created_at")]);

    let queries = resolve_queries(&defs, &schema()).unwrap();
    let sort = &queries[0].sorts[0];

    assert_eq!(sort.column.name, "created_at");
    assert!(sort.descending);
    assert_eq!(sort.keyword(), "DESC");
}

#[test]
fn test_sort_falls_back_to_suffix_match() {
    let defs = definitions(vec![QueryDefinition::new("ByAt", "users").sort("_at")]);

    let queries = resolve_queries(&defs, &schema()).unwrap();
    assert_eq!(queries[0].sorts[0].column.name, "x_created_at");
    assert!(!queries[0].sorts[0].descending);
}

#[test]
fn test_synthetic_lookup_per_table() {
    let queries = resolve_queries(&QueryDefinitions::default(), &schema()).unwrap();

    let names: Vec<&str> = queries.iter().map(|q| q.name.as_str()).collect();
    assert_eq!(names, vec!["GetUsers", "GetProducts", "GetAuditLog"]);

    let get_users = &queries[0];
    assert!(get_users.synthetic);
    assert!(get_users.return_one);
    assert!(!get_users.return_many);
    assert!(!get_users.paged);
    assert_eq!(get_users.filters.len(), 1);
    assert_eq!(get_users.filters[0].column.name, "id");
    assert_eq!(get_users.filters[0].op, FilterOp::Eq);
}

#[test]
fn test_table_without_primary_key_still_gets_lookup() {
    let queries = resolve_queries(&QueryDefinitions::default(), &schema()).unwrap();

    let get_audit = queries.iter().find(|q| q.name == "GetAuditLog").unwrap();
    assert!(get_audit.filters.is_empty());
    assert!(get_audit.matches_all_rows());
    assert!(get_audit.return_one);
}

#[test]
fn test_declared_queries_come_first() {
    let defs = definitions(vec![
        QueryDefinition::new("ListUsers", "users"),
        QueryDefinition::new("ListProducts", "products"),
    ]);

    let queries = resolve_queries(&defs, &schema()).unwrap();
    assert_eq!(queries.len(), 5);
    assert_eq!(queries[0].name, "ListUsers");
    assert_eq!(queries[1].name, "ListProducts");
    assert!(queries[2..].iter().all(|q| q.synthetic));
}

#[test]
fn test_resolution_is_deterministic() {
    let defs = definitions(vec![QueryDefinition::new("Recent", "users")
        .field("email")
        .field("created_at:lt")
        .sort("-created_at")
        .returns("many")]);

    let first = resolve_queries(&defs, &schema()).unwrap();
    let second = resolve_queries(&defs, &schema()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_errors_are_collected() {
    let defs = definitions(vec![
        QueryDefinition::new("Ghost", "nope"),
        QueryDefinition::new("BadFilter", "users")
            .field("missing")
            .field("email:like"),
        QueryDefinition::new("BadSort", "users").sort("-zzz"),
        QueryDefinition::new("BadReturn", "users").returns("all"),
        QueryDefinition::new("Fine", "users"),
    ]);

    let errors = resolve_queries(&defs, &schema()).unwrap_err();
    assert_eq!(
        errors.0,
        vec![
            ResolveError::UnknownTable {
                query: "Ghost".to_string(),
                table: "nope".to_string(),
            },
            ResolveError::UnknownColumn {
                query: "BadFilter".to_string(),
                table: "users".to_string(),
                kind: SpecKind::Filter,
                spec: "missing".to_string(),
            },
            ResolveError::UnknownOperator {
                query: "BadFilter".to_string(),
                spec: "email:like".to_string(),
                op: "like".to_string(),
            },
            ResolveError::UnknownColumn {
                query: "BadSort".to_string(),
                table: "users".to_string(),
                kind: SpecKind::Sort,
                spec: "-zzz".to_string(),
            },
            ResolveError::UnknownReturnMode {
                query: "BadReturn".to_string(),
                mode: "all".to_string(),
            },
        ]
    );
}

#[test]
fn test_duplicate_names_rejected() {
    let defs = definitions(vec![
        QueryDefinition::new("ListUsers", "users"),
        QueryDefinition::new("ListUsers", "users").returns("many"),
    ]);

    let errors = resolve_queries(&defs, &schema()).unwrap_err();
    assert_eq!(
        errors.0,
        vec![ResolveError::DuplicateQuery("ListUsers".to_string())]
    );
}

#[test]
fn test_empty_sort_spec_is_an_error() {
    let defs = definitions(vec![QueryDefinition::new("Blank", "users").sort("-")]);

    let errors = resolve_queries(&defs, &schema()).unwrap_err();
    assert_eq!(errors.0.len(), 1);
    assert_eq!(errors.0[0].query(), "Blank");
}

#[test]
fn test_name_taken_by_lookup_rejected() {
    let defs = definitions(vec![QueryDefinition::new("GetUsers", "users").field("id:eq")]);

    let errors = resolve_queries(&defs, &schema()).unwrap_err();
    assert_eq!(
        errors.0,
        vec![ResolveError::DuplicateQuery("GetUsers".to_string())]
    );
}

#[test]
fn test_names_equal_after_export_rejected() {
    let defs = definitions(vec![
        QueryDefinition::new("list_users", "users"),
        QueryDefinition::new("ListUsers", "users"),
    ]);

    let errors = resolve_queries(&defs, &schema()).unwrap_err();
    assert_eq!(
        errors.0,
        vec![ResolveError::DuplicateQuery("ListUsers".to_string())]
    );
}

#[test]
fn test_empty_return_is_unset() {
    let defs = definitions(vec![QueryDefinition::new("FindUser", "users")
        .field("id:eq")
        .returns("")]);

    let queries = resolve_queries(&defs, &schema()).unwrap();
    assert!(!queries[0].return_one);
    assert!(!queries[0].return_many);
    assert_eq!(queries[0].cardinality(), Cardinality::Unspecified);
}
