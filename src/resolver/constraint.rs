use crate::errors::CopyError;
use crate::resolver::{RelationKey, Resolver};
use crate::schema::{ForeignKey, Schema};

/// Follows declared foreign-key constraints in both directions.
///
/// Only single-column keys can be followed. Composite keys are skipped and
/// logged at debug level as `UnsupportedRelationKey`, which keeps them
/// distinguishable from "no relationship" in the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstraintResolver;

impl ConstraintResolver {
    /// Referenced `(table, column)` for a column that alone forms a foreign key.
    #[must_use]
    pub fn dependencies(schema: &Schema, table: &str, column: &str) -> Vec<RelationKey> {
        let Some(t) = schema.table(table) else {
            return Vec::new();
        };
        t.foreign_keys
            .iter()
            .filter(|fk| fk.columns.iter().any(|c| c == column))
            .filter_map(|fk| match single_column(table, fk) {
                Ok((_, to)) => Some(to),
                Err(e) => {
                    log::debug!("skipping {table}.{column}: {e}");
                    None
                }
            })
            .collect()
    }

    /// Every single-column foreign key that references `column` when it is
    /// the table's sole primary-key column.
    #[must_use]
    pub fn dependents(schema: &Schema, table: &str, column: &str) -> Vec<RelationKey> {
        let Some(t) = schema.table(table) else {
            return Vec::new();
        };
        if t.primary_key.len() > 1 && t.primary_key.iter().any(|c| c == column) {
            let e = CopyError::UnsupportedRelationKey {
                table: table.to_string(),
                columns: t.primary_key.clone(),
            };
            log::debug!("skipping dependents of {table}.{column}: {e}");
            return Vec::new();
        }
        if t.single_primary_key() != Some(column) {
            return Vec::new();
        }
        schema
            .foreign_keys()
            .filter(|(_, fk)| fk.referenced_table == table)
            .filter_map(|(owner, fk)| match single_column(&owner.name, fk) {
                Ok((from, to)) if to.column == column => Some(from),
                Ok(_) => None,
                Err(e) => {
                    if fk.referenced_columns.iter().any(|c| c == column) {
                        log::debug!("skipping dependent of {table}.{column}: {e}");
                    }
                    None
                }
            })
            .collect()
    }
}

/// Split a single-column foreign key into its `(from, to)` slots.
fn single_column(owner: &str, fk: &ForeignKey) -> Result<(RelationKey, RelationKey), CopyError> {
    match (fk.columns.as_slice(), fk.referenced_columns.as_slice()) {
        ([from], [to]) => Ok((RelationKey::new(owner, from), RelationKey::new(&fk.referenced_table, to))),
        _ => Err(CopyError::UnsupportedRelationKey {
            table: owner.to_string(),
            columns: fk.columns.clone(),
        }),
    }
}

/// Log every composite foreign key once, at reflection time.
pub fn warn_unsupported_keys(schema: &Schema) {
    for (owner, fk) in schema.foreign_keys() {
        if let Err(e) = single_column(&owner.name, fk) {
            log::warn!("{e} -> {}; this relationship will not be followed", fk.referenced_table);
        }
    }
}

impl Resolver for ConstraintResolver {
    fn resolve(&self, schema: &Schema, table: &str, column: &str) -> Vec<RelationKey> {
        let mut keys = Self::dependencies(schema, table, column);
        keys.extend(Self::dependents(schema, table, column));
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Table;

    fn shop() -> Schema {
        Schema::new()
            .with_table(Table::new("customers").column("id", "INTEGER").primary_key(&["id"]))
            .with_table(
                Table::new("orders")
                    .column("id", "INTEGER")
                    .column("customer_id", "INTEGER")
                    .primary_key(&["id"])
                    .foreign_key(ForeignKey::single("customer_id", "customers", "id")),
            )
            .with_table(
                Table::new("order_items")
                    .column("id", "INTEGER")
                    .column("order_id", "INTEGER")
                    .primary_key(&["id"])
                    .foreign_key(ForeignKey::single("order_id", "orders", "id")),
            )
    }

    #[test]
    fn dependency_direction_follows_fk() {
        let s = shop();
        assert_eq!(
            ConstraintResolver.resolve(&s, "orders", "customer_id"),
            vec![RelationKey::new("customers", "id")]
        );
    }

    #[test]
    fn dependent_direction_finds_referencing_columns() {
        let s = shop();
        assert_eq!(
            ConstraintResolver.resolve(&s, "orders", "id"),
            vec![RelationKey::new("order_items", "order_id")]
        );
        assert_eq!(
            ConstraintResolver.resolve(&s, "customers", "id"),
            vec![RelationKey::new("orders", "customer_id")]
        );
    }

    #[test]
    fn plain_columns_and_unknown_tables_resolve_nothing() {
        let s = shop();
        assert!(ConstraintResolver.resolve(&s, "order_items", "id").is_empty());
        assert!(ConstraintResolver.resolve(&s, "nope", "id").is_empty());
    }

    #[test]
    fn self_reference_resolves_both_ways() {
        let s = Schema::new().with_table(
            Table::new("employees")
                .column("id", "INTEGER")
                .column("manager_id", "INTEGER")
                .primary_key(&["id"])
                .foreign_key(ForeignKey::single("manager_id", "employees", "id")),
        );
        assert_eq!(
            ConstraintResolver.resolve(&s, "employees", "manager_id"),
            vec![RelationKey::new("employees", "id")]
        );
        assert_eq!(
            ConstraintResolver.resolve(&s, "employees", "id"),
            vec![RelationKey::new("employees", "manager_id")]
        );
    }

    #[test]
    fn composite_keys_are_skipped() {
        let s = Schema::new()
            .with_table(
                Table::new("shipments")
                    .column("order_id", "INTEGER")
                    .column("line_no", "INTEGER")
                    .primary_key(&["order_id", "line_no"]),
            )
            .with_table(
                Table::new("tracking")
                    .column("id", "INTEGER")
                    .column("order_id", "INTEGER")
                    .column("line_no", "INTEGER")
                    .primary_key(&["id"])
                    .foreign_key(ForeignKey {
                        columns: vec!["order_id".into(), "line_no".into()],
                        referenced_table: "shipments".into(),
                        referenced_columns: vec!["order_id".into(), "line_no".into()],
                    }),
            );
        assert!(ConstraintResolver.resolve(&s, "tracking", "order_id").is_empty());
        assert!(ConstraintResolver.resolve(&s, "shipments", "order_id").is_empty());
        let fk = &s.table("tracking").unwrap().foreign_keys[0];
        assert!(matches!(
            single_column("tracking", fk),
            Err(CopyError::UnsupportedRelationKey { ref columns, .. }) if columns.len() == 2
        ));
    }
}
