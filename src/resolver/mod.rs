//! Relationship resolution strategies.
//!
//! A [`Resolver`] maps a `(table, column)` pair to the column slots related to
//! it, in both directions: the key a column points to (dependency direction)
//! and the columns pointing at it (dependent direction). Strategies only read
//! schema metadata or fixed configuration, never row data.
//!
//! - [`ConstraintResolver`]: declared foreign-key constraints
//! - [`NamingResolver`]: `<singular>_id` naming conventions
//! - [`StaticMapResolver`]: an explicit user-supplied map
//! - [`ResolverChain`]: concatenates the output of several strategies
use serde::Deserialize;
use std::fmt;

use crate::errors::CopyError;
use crate::schema::Schema;

pub mod constraint;
pub mod inflector;
pub mod naming;
pub mod static_map;

pub use constraint::ConstraintResolver;
pub use inflector::{EnglishInflector, Inflector};
pub use naming::NamingResolver;
pub use static_map::StaticMapResolver;

/// A column slot reachable from another column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct RelationKey {
    pub table: String,
    pub column: String,
}

impl RelationKey {
    #[must_use]
    pub fn new(table: &str, column: &str) -> Self {
        Self { table: table.to_string(), column: column.to_string() }
    }
}

impl TryFrom<String> for RelationKey {
    type Error = CopyError;

    /// Parse `table.column`.
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.split_once('.') {
            Some((t, c)) if !t.is_empty() && !c.is_empty() && !c.contains('.') => {
                Ok(Self::new(t, c))
            }
            _ => Err(CopyError::Config(format!("invalid relation key '{s}': expected TABLE.COLUMN"))),
        }
    }
}

impl fmt::Display for RelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Strategy mapping a column to the column slots related to it.
pub trait Resolver {
    fn resolve(&self, schema: &Schema, table: &str, column: &str) -> Vec<RelationKey>;
}

impl<R: Resolver + ?Sized> Resolver for Box<R> {
    fn resolve(&self, schema: &Schema, table: &str, column: &str) -> Vec<RelationKey> {
        (**self).resolve(schema, table, column)
    }
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve(&self, schema: &Schema, table: &str, column: &str) -> Vec<RelationKey> {
        (**self).resolve(schema, table, column)
    }
}

/// Any `Fn(&Schema, &str, &str) -> Vec<RelationKey>` is a resolver.
pub struct FnResolver<F>(pub F);

impl<F> Resolver for FnResolver<F>
where
    F: Fn(&Schema, &str, &str) -> Vec<RelationKey>,
{
    fn resolve(&self, schema: &Schema, table: &str, column: &str) -> Vec<RelationKey> {
        (self.0)(schema, table, column)
    }
}

/// Concatenates the keys reported by each member, in order.
#[derive(Default)]
pub struct ResolverChain {
    members: Vec<Box<dyn Resolver>>,
}

impl ResolverChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<R: Resolver + 'static>(mut self, resolver: R) -> Self {
        self.push(Box::new(resolver));
        self
    }

    pub fn push(&mut self, resolver: Box<dyn Resolver>) {
        self.members.push(resolver);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Resolver for ResolverChain {
    fn resolve(&self, schema: &Schema, table: &str, column: &str) -> Vec<RelationKey> {
        self.members.iter().flat_map(|r| r.resolve(schema, table, column)).collect()
    }
}
