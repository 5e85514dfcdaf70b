//! Options for `find_all`.
//!
//! A [`QueryOpts`] carries the optional `where` clause, `order_by` field,
//! and `limit` appended to an entity's SELECT template. The `where` clause
//! is passed through verbatim; it may carry `?` placeholders bound from the
//! caller's argument list. `order_by` names a declared field and is mapped
//! to its column through the schema before any SQL is issued.

use crate::error::{Result, WeftError};
use crate::schema::Schema;
use crate::value::Value;

/// Row limit: a plain count, or an offset/count pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    Offset(u64, u64),
}

/// Optional clauses appended to a SELECT template.
#[derive(Debug, Clone, Default)]
pub struct QueryOpts {
    where_clause: Option<String>,
    order_by: Option<String>,
    limit: Option<Limit>,
}

impl QueryOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw `where` clause, appended verbatim after `where`. Prefer `?`
    /// placeholders plus arguments over interpolating values into the
    /// clause text.
    pub fn filter(mut self, clause: impl Into<String>) -> Self {
        self.where_clause = Some(clause.into());
        self
    }

    /// Order by a declared field (not a raw column).
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// At most `count` rows.
    pub fn limit(mut self, count: u64) -> Self {
        self.limit = Some(Limit::Count(count));
        self
    }

    /// At most `count` rows, starting at `offset`.
    pub fn limit_offset(mut self, offset: u64, count: u64) -> Self {
        self.limit = Some(Limit::Offset(offset, count));
        self
    }

    /// Render `select_sql` plus the configured clauses, pushing limit
    /// values onto `args`. Fails before any SQL leaves the process if
    /// `order_by` names an undeclared field.
    pub(crate) fn render(&self, schema: &Schema, args: &mut Vec<Value>) -> Result<String> {
        let mut sql = vec![schema.select_sql().to_owned()];
        if let Some(clause) = &self.where_clause {
            sql.push("where".to_owned());
            sql.push(clause.clone());
        }
        if let Some(field) = &self.order_by {
            let column = schema.column_name(field).ok_or_else(|| {
                WeftError::invalid_argument(format!(
                    "unknown order_by field `{field}` for table `{}`",
                    schema.table()
                ))
            })?;
            sql.push("order by".to_owned());
            sql.push(format!("`{column}`"));
        }
        match self.limit {
            Some(Limit::Count(count)) => {
                sql.push("limit ?".to_owned());
                args.push(Value::Int(count as i64));
            }
            Some(Limit::Offset(offset, count)) => {
                sql.push("limit ?, ?".to_owned());
                args.push(Value::Int(offset as i64));
                args.push(Value::Int(count as i64));
            }
            None => {}
        }
        Ok(sql.join(" "))
    }
}
