//! Resolution of query definitions against the schema model.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, warn};

use super::definition::{FieldSpec, QueryDefinition, QueryDefinitions, ReturnMode, SortSpec};
use super::error::{ResolveError, ResolveErrors, SpecKind};
use super::{Filter, FilterOp, Query, Sort};
use crate::model::{Column, Schema, Table};
use crate::naming;

/// Resolve every definition, then append one primary-key lookup per table.
///
/// Pure: the same definitions and schema always give the same queries. All
/// problems are collected and returned together; nothing is silently dropped.
///
/// Query names must stay unique after export, so `list_users` and `ListUsers`
/// clash, as does a definition named like a generated `Get<Table>` lookup.
pub fn resolve_queries(
    definitions: &QueryDefinitions,
    schema: &Schema,
) -> Result<Vec<Query>, ResolveErrors> {
    let mut queries = Vec::with_capacity(definitions.len() + schema.tables.len());
    let mut errors = Vec::new();
    // exported name -> declared name
    let mut names: HashMap<String, &str> = HashMap::new();

    for def in &definitions.query {
        match names.entry(naming::exported_name(&def.name)) {
            Entry::Occupied(_) => {
                errors.push(ResolveError::DuplicateQuery(def.name.clone()));
                continue;
            }
            Entry::Vacant(slot) => {
                slot.insert(def.name.as_str());
            }
        }
        match resolve_definition(def, schema) {
            Ok(query) => queries.push(query),
            Err(mut errs) => errors.append(&mut errs),
        }
    }

    for table in &schema.tables {
        let lookup = naming::exported_name(&primary_key_query_name(table));
        if let Some(declared) = names.get(&lookup) {
            errors.push(ResolveError::DuplicateQuery(declared.to_string()));
        }
    }

    if !errors.is_empty() {
        return Err(ResolveErrors(errors));
    }

    queries.extend(schema.tables.iter().map(primary_key_query));
    debug!(
        declared = definitions.len(),
        total = queries.len(),
        "resolved queries"
    );
    Ok(queries)
}

/// `Get<Table>`: one `eq` filter per primary key column, returning one row.
///
/// A table without a primary key still gets the query; with no filters it
/// matches every row.
pub fn primary_key_query(table: &Table) -> Query {
    if !table.has_primary_key() {
        warn!(table = %table.name, "table has no primary key; lookup query has no filters");
    }

    Query {
        name: primary_key_query_name(table),
        table: table.clone(),
        filters: table
            .primary_keys
            .iter()
            .map(|column| Filter {
                column: column.clone(),
                op: FilterOp::Eq,
            })
            .collect(),
        sorts: Vec::new(),
        return_one: true,
        return_many: false,
        paged: false,
        synthetic: true,
    }
}

fn primary_key_query_name(table: &Table) -> String {
    format!("Get{}", table.exported_name())
}

fn resolve_definition(def: &QueryDefinition, schema: &Schema) -> Result<Query, Vec<ResolveError>> {
    let table = schema.table(&def.table).ok_or_else(|| {
        vec![ResolveError::UnknownTable {
            query: def.name.clone(),
            table: def.table.clone(),
        }]
    })?;

    let mut errors = Vec::new();

    let mut filters = Vec::with_capacity(def.fields.len());
    let mut could_return_many = false;
    for spec in &def.fields {
        match resolve_filter(def, table, spec) {
            Ok(filter) => {
                could_return_many |= filter.op.could_match_many();
                filters.push(filter);
            }
            Err(err) => errors.push(err),
        }
    }

    let mut sorts = Vec::with_capacity(def.sort.len());
    for spec in &def.sort {
        match resolve_sort(def, table, spec) {
            Ok(sort) => sorts.push(sort),
            Err(err) => errors.push(err),
        }
    }

    // An empty `return` means unset.
    let declared_mode = def.return_mode.as_deref().filter(|mode| !mode.is_empty());
    let mode = match declared_mode.map(str::parse::<ReturnMode>) {
        None => None,
        Some(Ok(mode)) => Some(mode),
        Some(Err(mode)) => {
            errors.push(ResolveError::UnknownReturnMode {
                query: def.name.clone(),
                mode,
            });
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    let return_one = mode == Some(ReturnMode::One);
    if return_one && could_return_many {
        warn!(
            query = %def.name,
            "declared return = \"one\" but a range filter may match many rows; one takes precedence"
        );
    }

    Ok(Query {
        name: def.name.clone(),
        table: table.clone(),
        filters,
        sorts,
        return_one,
        return_many: could_return_many
            || matches!(mode, Some(ReturnMode::Many | ReturnMode::Paged)),
        paged: mode == Some(ReturnMode::Paged),
        synthetic: false,
    })
}

fn resolve_filter(
    def: &QueryDefinition,
    table: &Table,
    spec: &str,
) -> Result<Filter, ResolveError> {
    let parsed = FieldSpec::parse(spec);
    let op = parsed.op.map_err(|op| ResolveError::UnknownOperator {
        query: def.name.clone(),
        spec: spec.to_string(),
        op: op.to_string(),
    })?;

    let column = table
        .column(parsed.column)
        .ok_or_else(|| unknown_column(def, table, SpecKind::Filter, spec))?;

    Ok(Filter {
        column: column.clone(),
        op,
    })
}

fn resolve_sort(def: &QueryDefinition, table: &Table, spec: &str) -> Result<Sort, ResolveError> {
    let parsed = SortSpec::parse(spec);
    let column = match_sort_column(table, parsed.column)
        .ok_or_else(|| unknown_column(def, table, SpecKind::Sort, spec))?;

    if column.name != parsed.column {
        warn!(
            query = %def.name,
            spec,
            column = %column.name,
            "sort matched by suffix"
        );
    }

    Ok(Sort {
        column: column.clone(),
        descending: parsed.descending,
    })
}

/// Exact name first, otherwise the first column (declaration order) whose
/// name ends with `name`.
fn match_sort_column<'t>(table: &'t Table, name: &str) -> Option<&'t Column> {
    if name.is_empty() {
        return None;
    }
    table
        .column(name)
        .or_else(|| table.columns.iter().find(|c| c.name.ends_with(name)))
}

fn unknown_column(
    def: &QueryDefinition,
    table: &Table,
    kind: SpecKind,
    spec: &str,
) -> ResolveError {
    ResolveError::UnknownColumn {
        query: def.name.clone(),
        table: table.name.clone(),
        kind,
        spec: spec.to_string(),
    }
}
