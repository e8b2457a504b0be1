//! Lookup requests driving a traversal.
//!
//! A [`Query`] asks for the rows of `table` where `column` equals `value`.
//! Seed queries are parsed from `TABLE.COLUMN:VALUE` strings and carry text;
//! derived queries are built by the traversal engine from resolved relation
//! keys and carry the fetched value unchanged, so blobs and dates are matched
//! exactly as stored.
use std::fmt;
use std::str::FromStr;

use crate::errors::CopyError;
use crate::rows::Value;
use crate::utils::fingerprint::Canonical;

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub column: String,
    pub value: Value,
}

/// Identity of a query used to suppress reprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryFingerprint([u8; 32]);

impl Query {
    #[must_use]
    pub fn new(table: impl Into<String>, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { table: table.into(), column: column.into(), value: value.into() }
    }

    /// Parse a `TABLE.COLUMN:VALUE` string.
    ///
    /// The table ends at the first `.` and the column at the first `:` after
    /// it. Everything past that `:` is the value, separators included. A `:`
    /// before the first `.` (as in `a:b.c`) would land in the table name, so
    /// such input is malformed.
    ///
    /// # Errors
    /// Returns `CopyError::MalformedQuery` when a separator is missing or any
    /// of the three components is empty.
    pub fn parse(input: &str) -> Result<Self, CopyError> {
        let malformed = || CopyError::MalformedQuery { input: input.to_string() };
        let (table, rest) = input.split_once('.').ok_or_else(malformed)?;
        let (column, value) = rest.split_once(':').ok_or_else(malformed)?;
        if table.is_empty() || column.is_empty() || value.is_empty() || table.contains(':') {
            return Err(malformed());
        }
        Ok(Self::new(table, column, value))
    }

    #[must_use]
    pub fn fingerprint(&self) -> QueryFingerprint {
        let mut c = Canonical::new();
        c.field(b't', self.table.as_bytes())
            .field(b'c', self.column.as_bytes())
            .field(self.value.tag(), &self.value.canonical_bytes());
        QueryFingerprint(c.finish())
    }
}

impl FromStr for Query {
    type Err = CopyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.table, self.column, self.value)
    }
}

/// Parse every seed string, failing on the first malformed one.
///
/// # Errors
/// Returns `CopyError::MalformedQuery` for the first string that does not parse.
pub fn parse_all<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<Query>, CopyError> {
    inputs.iter().map(|s| Query::parse(s.as_ref())).collect()
}
