//! Worklist traversal from seed queries to a closed set of rows.
//!
//! Each step pops a [`Query`], fetches the matching rows, stores the ones not
//! seen before and asks the [`Resolver`] where every non-null value of those
//! rows leads. Two dedup points keep this finite on cyclic schemas: a query is
//! processed at most once (by [`crate::query::QueryFingerprint`]) and a row is
//! stored at most once per table (by [`crate::rows::RowFingerprint`]). Only
//! newly stored rows generate derived queries, and those carry the fetched
//! value as is.
use std::collections::{HashSet, VecDeque};

use crate::db::Database;
use crate::errors::{CopyError, Result};
use crate::query::Query;
use crate::resolver::Resolver;
use crate::rows::ResultSet;
use crate::schema::Schema;

/// Worklist discipline. The final row set is the same for both; only the
/// order rows are first seen in differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    BreadthFirst,
    DepthFirst,
}

/// Counters collected during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    pub queries_processed: usize,
    /// Queries popped from the worklist after an identical one was processed.
    pub queries_skipped: usize,
    pub rows_fetched: usize,
    pub rows_inserted: usize,
}

pub struct Traversal<'a> {
    schema: &'a Schema,
    db: &'a dyn Database,
    resolver: &'a dyn Resolver,
    order: Order,
}

impl<'a> Traversal<'a> {
    #[must_use]
    pub fn new(schema: &'a Schema, db: &'a dyn Database, resolver: &'a dyn Resolver) -> Self {
        Self { schema, db, resolver, order: Order::default() }
    }

    #[must_use]
    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    /// Run from `seeds` until no new rows are found.
    ///
    /// # Errors
    /// `UnknownTable` / `UnknownColumn` when a query names something absent
    /// from the schema, or the adapter's error when a fetch fails. Nothing is
    /// returned on failure.
    pub fn run(&self, seeds: &[Query]) -> Result<ResultSet> {
        self.run_with_stats(seeds).map(|(rows, _)| rows)
    }

    /// Same as [`Traversal::run`], also returning the run counters.
    ///
    /// # Errors
    /// See [`Traversal::run`].
    pub fn run_with_stats(&self, seeds: &[Query]) -> Result<(ResultSet, TraversalStats)> {
        let mut queue: VecDeque<Query> = seeds.iter().cloned().collect();
        let mut history = HashSet::new();
        let mut rows = ResultSet::new();
        let mut stats = TraversalStats::default();

        while let Some(query) = self.pop(&mut queue) {
            if !history.insert(query.fingerprint()) {
                stats.queries_skipped += 1;
                continue;
            }
            stats.queries_processed += 1;

            let table = self
                .schema
                .table(&query.table)
                .ok_or_else(|| CopyError::UnknownTable(query.table.clone()))?;
            if !table.has_column(&query.column) {
                return Err(CopyError::UnknownColumn {
                    table: query.table.clone(),
                    column: query.column.clone(),
                });
            }

            let fetched = self.db.fetch(table, &query.column, &query.value)?;
            log::debug!("{query}: fetched {} rows", fetched.len());
            stats.rows_fetched += fetched.len();

            for row in fetched {
                let Some(row) = rows.insert(row) else {
                    continue;
                };
                stats.rows_inserted += 1;
                for (column, value) in row.iter() {
                    if value.is_null() {
                        continue;
                    }
                    for key in self.resolver.resolve(self.schema, &row.table, column) {
                        let derived = Query::new(key.table, key.column, value.clone());
                        log::trace!("{query} -> {derived}");
                        queue.push_back(derived);
                    }
                }
            }
        }

        log::info!(
            "traversal done: {} rows in {} tables ({} queries, {} duplicates skipped)",
            rows.len(),
            rows.table_names().count(),
            stats.queries_processed,
            stats.queries_skipped
        );
        Ok((rows, stats))
    }

    fn pop(&self, queue: &mut VecDeque<Query>) -> Option<Query> {
        match self.order {
            Order::BreadthFirst => queue.pop_front(),
            Order::DepthFirst => queue.pop_back(),
        }
    }
}
