use regex::Regex;

use crate::resolver::inflector::{EnglishInflector, Inflector};
use crate::resolver::{RelationKey, Resolver};
use crate::schema::{Schema, Table};

/// Infers relationships from identifier shape, without constraints.
///
/// - `<singular>_id` points to the primary key of table `<plural>`
/// - a table's primary key is pointed to by `<singular table>_id` columns in
///   any table
pub struct NamingResolver<I = EnglishInflector> {
    inflector: I,
    fk_column: Regex,
}

impl NamingResolver<EnglishInflector> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_inflector(EnglishInflector)
    }
}

impl Default for NamingResolver<EnglishInflector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Inflector> NamingResolver<I> {
    pub fn with_inflector(inflector: I) -> Self {
        let fk_column = Regex::new(r"^(.+)_id$").unwrap();
        Self { inflector, fk_column }
    }

    /// Primary key of the table named after the plural of `<noun>_id`.
    #[must_use]
    pub fn dependencies(&self, schema: &Schema, column: &str) -> Vec<RelationKey> {
        let Some(noun) = self.fk_column.captures(column).and_then(|c| c.get(1)) else {
            return Vec::new();
        };
        let plural = self.inflector.pluralize(noun.as_str());
        match schema.table(&plural).and_then(key_column) {
            Some(pk) => vec![RelationKey::new(&plural, pk)],
            None => Vec::new(),
        }
    }

    /// `<singular table>_id` in every table that has such a column, when
    /// `column` is the table's key.
    #[must_use]
    pub fn dependents(&self, schema: &Schema, table: &str, column: &str) -> Vec<RelationKey> {
        let Some(t) = schema.table(table) else {
            return Vec::new();
        };
        if key_column(t) != Some(column) {
            return Vec::new();
        }
        let fk = format!("{}_id", self.inflector.singularize(table));
        schema
            .tables
            .values()
            .filter(|other| other.has_column(&fk))
            .map(|other| RelationKey::new(&other.name, &fk))
            .collect()
    }
}

// Single-column primary key, falling back to a conventional `id` column.
fn key_column(table: &Table) -> Option<&str> {
    table.single_primary_key().or_else(|| {
        (table.primary_key.is_empty() && table.has_column("id")).then_some("id")
    })
}

impl<I: Inflector> Resolver for NamingResolver<I> {
    fn resolve(&self, schema: &Schema, table: &str, column: &str) -> Vec<RelationKey> {
        let mut keys = self.dependencies(schema, column);
        keys.extend(self.dependents(schema, table, column));
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blog() -> Schema {
        Schema::new()
            .with_table(Table::new("users").column("id", "INTEGER").primary_key(&["id"]))
            .with_table(
                Table::new("posts")
                    .column("id", "INTEGER")
                    .column("user_id", "INTEGER")
                    .column("category_id", "INTEGER")
                    .primary_key(&["id"]),
            )
            .with_table(
                Table::new("comments")
                    .column("id", "INTEGER")
                    .column("post_id", "INTEGER")
                    .column("user_id", "INTEGER"),
            )
            .with_table(Table::new("categories").column("id", "INTEGER").primary_key(&["id"]))
    }

    #[test]
    fn id_suffix_points_to_plural_table() {
        let r = NamingResolver::new();
        let s = blog();
        assert_eq!(r.resolve(&s, "posts", "user_id"), vec![RelationKey::new("users", "id")]);
        assert_eq!(
            r.resolve(&s, "posts", "category_id"),
            vec![RelationKey::new("categories", "id")]
        );
    }

    #[test]
    fn conventional_id_without_declared_key() {
        let r = NamingResolver::new();
        let s = blog().with_table(Table::new("tags").column("id", "INTEGER"));
        assert_eq!(r.resolve(&s, "x", "tag_id"), vec![RelationKey::new("tags", "id")]);
    }

    #[test]
    fn primary_key_is_pointed_to_by_singular_id_columns() {
        let r = NamingResolver::new();
        let s = blog();
        assert_eq!(
            r.resolve(&s, "users", "id"),
            vec![RelationKey::new("comments", "user_id"), RelationKey::new("posts", "user_id")]
        );
        // no table carries comment_id
        assert!(r.resolve(&s, "comments", "id").is_empty());
        assert_eq!(r.resolve(&s, "posts", "id"), vec![RelationKey::new("comments", "post_id")]);
    }

    #[test]
    fn unmatched_names_resolve_nothing() {
        let r = NamingResolver::new();
        let s = blog();
        assert!(r.resolve(&s, "posts", "author_id").is_empty());
        assert!(r.resolve(&s, "posts", "title").is_empty());
        assert!(r.resolve(&s, "posts", "_id").is_empty());
    }

    struct Latin;
    impl Inflector for Latin {
        fn singularize(&self, word: &str) -> String {
            word.strip_suffix('a').map_or_else(|| word.to_string(), |s| format!("{s}um"))
        }
        fn pluralize(&self, word: &str) -> String {
            word.strip_suffix("um").map_or_else(|| word.to_string(), |s| format!("{s}a"))
        }
    }

    #[test]
    fn custom_inflector_is_used() {
        let r = NamingResolver::with_inflector(Latin);
        let s = Schema::new()
            .with_table(Table::new("data").column("id", "INTEGER").primary_key(&["id"]))
            .with_table(Table::new("points").column("id", "").column("datum_id", ""));
        assert_eq!(r.resolve(&s, "points", "datum_id"), vec![RelationKey::new("data", "id")]);
        assert_eq!(r.resolve(&s, "data", "id"), vec![RelationKey::new("points", "datum_id")]);
    }
}
