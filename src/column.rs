//! Column descriptors.
//!
//! A [`Column`] is the typed metadata for one mapped attribute: the column
//! name (defaulting to the declared field name), the SQL type, the
//! primary-key flag, and an optional default. Descriptors are pure values;
//! the schema compiler consumes them once and they are immutable afterwards.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Default for a column: a stored value, or a zero-argument factory invoked
/// at resolution time (e.g. an id generator).
#[derive(Clone)]
pub enum ColumnDefault {
    Value(Value),
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl ColumnDefault {
    /// Resolve the default to a concrete value.
    pub fn resolve(&self) -> Value {
        match self {
            ColumnDefault::Value(v) => v.clone(),
            ColumnDefault::Factory(f) => f(),
        }
    }
}

impl fmt::Debug for ColumnDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnDefault::Value(v) => f.debug_tuple("Value").field(v).finish(),
            ColumnDefault::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// Metadata for one mapped column.
#[derive(Debug, Clone)]
pub struct Column {
    pub(crate) column_name: Option<String>,
    pub(crate) sql_type: String,
    pub(crate) primary_key: bool,
    pub(crate) default: Option<ColumnDefault>,
}

impl Column {
    fn new(sql_type: &str, default: Option<ColumnDefault>) -> Self {
        Self {
            column_name: None,
            sql_type: sql_type.to_owned(),
            primary_key: false,
            default,
        }
    }

    /// `varchar(100)` column, no default.
    pub fn string() -> Self {
        Self::new("varchar(100)", None)
    }

    /// `text` column, no default.
    pub fn text() -> Self {
        Self::new("text", None)
    }

    /// `bigint` column, default 0.
    pub fn integer() -> Self {
        Self::new("bigint", Some(ColumnDefault::Value(Value::Int(0))))
    }

    /// `real` column, default 0.0.
    pub fn float() -> Self {
        Self::new("real", Some(ColumnDefault::Value(Value::Float(0.0))))
    }

    /// `boolean` column, default false.
    pub fn boolean() -> Self {
        Self::new("boolean", Some(ColumnDefault::Value(Value::Bool(false))))
    }

    /// Override the column name (otherwise the declared field name is used).
    pub fn named(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    /// Override the SQL type, e.g. `varchar(50)`.
    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = sql_type.into();
        self
    }

    /// Mark this column as the primary key.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Set a stored default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(ColumnDefault::Value(value.into()));
        self
    }

    /// Set a factory default, invoked each time a default is resolved.
    pub fn default_fn(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(ColumnDefault::Factory(Arc::new(f)));
        self
    }

    /// Clear any default (integer/float/boolean constructors carry one).
    pub fn no_default(mut self) -> Self {
        self.default = None;
        self
    }

    /// Resolve this column's default, if it has one.
    pub fn resolve_default(&self) -> Option<Value> {
        self.default.as_ref().map(ColumnDefault::resolve)
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn sql_type_name(&self) -> &str {
        &self.sql_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn test_constructors_carry_original_defaults() {
        assert_eq!(Column::integer().resolve_default(), Some(Value::Int(0)));
        assert_eq!(Column::float().resolve_default(), Some(Value::Float(0.0)));
        assert_eq!(
            Column::boolean().resolve_default(),
            Some(Value::Bool(false))
        );
        assert_eq!(Column::string().resolve_default(), None);
        assert_eq!(Column::text().resolve_default(), None);
    }

    #[test]
    fn test_factory_default_invoked_per_resolution() {
        static COUNTER: AtomicI64 = AtomicI64::new(0);
        let col = Column::integer()
            .no_default()
            .default_fn(|| Value::Int(COUNTER.fetch_add(1, Ordering::SeqCst)));

        assert_eq!(col.resolve_default(), Some(Value::Int(0)));
        assert_eq!(col.resolve_default(), Some(Value::Int(1)));
    }

    #[test]
    fn test_builder_overrides() {
        let col = Column::string()
            .named("user_email")
            .sql_type("varchar(50)")
            .primary_key();
        assert_eq!(col.column_name.as_deref(), Some("user_email"));
        assert_eq!(col.sql_type_name(), "varchar(50)");
        assert!(col.is_primary_key());
    }
}
