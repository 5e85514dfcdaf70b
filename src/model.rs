//! Entity runtime.
//!
//! An [`Entity`] is a plain struct mapped to one table: it hands out its
//! compiled [`Schema`], reports field values (`None` meaning unset, as
//! distinct from an explicit SQL `NULL`), and rebuilds itself from an
//! ordered row. The [`Model`] extension trait supplies the generic CRUD
//! operations on top; it is blanket-implemented, so declaring an entity is
//! enough to get `save`/`update`/`remove`/`find`/`find_all`/`count`.
//!
//! Value resolution differs between writes: `save` falls back to descriptor
//! defaults for unset fields, `update` binds explicit values only and
//! writes `NULL` for anything unset.

use async_trait::async_trait;

use tracing::{debug, warn};

use crate::error::Result;
use crate::executor;
use crate::pool::Db;
use crate::query::QueryOpts;
use crate::schema::Schema;
use crate::value::Value;

/// A struct mapped to one database table.
pub trait Entity: Send + Sized {
    /// The compiled schema for this type. Callers typically hold it in a
    /// `once_cell::sync::Lazy` so compilation runs once, at first use, and
    /// a bad declaration fails before any instance exists.
    fn schema() -> &'static Schema;

    /// The current value of a field; `None` when unset.
    fn get(&self, field: &str) -> Option<Value>;

    /// Rebuild an instance from row values ordered as
    /// [`Schema::row_fields`]: non-key fields first, primary key last.
    fn from_row(values: Vec<Value>) -> Result<Self>;
}

fn value_or_default<E: Entity>(entity: &E, schema: &Schema, field: &str) -> Value {
    match entity.get(field) {
        Some(value) => value,
        None => match schema.column(field).and_then(|c| c.resolve_default()) {
            Some(value) => {
                debug!(field, "using default value");
                value
            }
            None => Value::Null,
        },
    }
}

/// INSERT arguments: explicit value if set, else descriptor default.
pub(crate) fn insert_args<E: Entity>(entity: &E) -> Vec<Value> {
    let schema = E::schema();
    schema
        .row_fields()
        .map(|field| value_or_default(entity, schema, field))
        .collect()
}

/// UPDATE arguments: explicit values only, no default fallback.
pub(crate) fn update_args<E: Entity>(entity: &E) -> Vec<Value> {
    let schema = E::schema();
    schema
        .row_fields()
        .map(|field| entity.get(field).unwrap_or(Value::Null))
        .collect()
}

/// Generic CRUD operations, available on every [`Entity`].
#[async_trait]
pub trait Model: Entity + Sync {
    /// INSERT this instance. Unset fields take their descriptor defaults.
    ///
    /// Returns the affected-row count. A count other than one is logged as
    /// a warning, not raised; strict callers should check the return value.
    async fn save(&self, db: &Db) -> Result<u64> {
        let schema = Self::schema();
        let args = insert_args(self);
        let rows = executor::execute(db, schema.insert_sql(), &args, true).await?;
        if rows != 1 {
            warn!(table = schema.table(), rows, "failed to insert record");
        }
        Ok(rows)
    }

    /// UPDATE this instance, matched on its primary key. Unset fields are
    /// written as `NULL`; defaults are not applied here.
    async fn update(&self, db: &Db) -> Result<u64> {
        let schema = Self::schema();
        let args = update_args(self);
        let rows = executor::execute(db, schema.update_sql(), &args, true).await?;
        if rows != 1 {
            warn!(table = schema.table(), rows, "failed to update by primary key");
        }
        Ok(rows)
    }

    /// DELETE this instance, matched on its primary key.
    async fn remove(&self, db: &Db) -> Result<u64> {
        let schema = Self::schema();
        let pk = self
            .get(schema.primary_key())
            .unwrap_or(Value::Null);
        let rows = executor::execute(db, schema.delete_sql(), &[pk], true).await?;
        if rows != 1 {
            warn!(table = schema.table(), rows, "failed to remove by primary key");
        }
        Ok(rows)
    }

    /// Fetch the instance with the given primary key, or `None`.
    async fn find(db: &Db, pk: impl Into<Value> + Send) -> Result<Option<Self>> {
        let schema = Self::schema();
        let pk_column = schema
            .column_name(schema.primary_key())
            .expect("schema always declares its primary key");
        let sql = format!("{} where `{pk_column}` = ?", schema.select_sql());
        let rows = executor::query(db, &sql, &[pk.into()], Some(1)).await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(Self::from_row(row)?)),
            None => Ok(None),
        }
    }

    /// Fetch every instance matching `opts`, or `None` when nothing
    /// matches (absent, not an empty list).
    ///
    /// `args` binds `?` placeholders in the `where` clause; limit values
    /// are appended automatically.
    async fn find_all(db: &Db, args: Vec<Value>, opts: QueryOpts) -> Result<Option<Vec<Self>>> {
        let schema = Self::schema();
        let mut args = args;
        let sql = opts.render(schema, &mut args)?;
        let rows = executor::query(db, &sql, &args, None).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        rows.into_iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// `SELECT COUNT(1)` over the whole table; 0 if the aggregate row is
    /// somehow missing.
    async fn count(db: &Db) -> Result<i64> {
        let schema = Self::schema();
        let sql = format!("select count(1) c from `{}`", schema.table());
        let rows = executor::query(db, &sql, &[], None).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .and_then(|value| value.as_int())
            .unwrap_or(0))
    }
}

impl<E: Entity + Sync> Model for E {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::error::WeftError;
    use once_cell::sync::Lazy;

    static USER_SCHEMA: Lazy<Schema> = Lazy::new(|| {
        Schema::builder("users")
            .column("id", Column::string().sql_type("varchar(50)").primary_key())
            .column("email", Column::string().sql_type("varchar(50)"))
            .column("name", Column::string())
            .column("admin", Column::boolean())
            .column("created_at", Column::float().default_fn(|| Value::Float(100.5)))
            .build()
            .expect("valid user schema")
    });

    #[derive(Debug, Default)]
    struct User {
        id: Option<String>,
        email: Option<String>,
        name: Option<String>,
        admin: Option<bool>,
        created_at: Option<f64>,
    }

    impl Entity for User {
        fn schema() -> &'static Schema {
            &USER_SCHEMA
        }

        fn get(&self, field: &str) -> Option<Value> {
            match field {
                "id" => self.id.clone().map(Value::Text),
                "email" => self.email.clone().map(Value::Text),
                "name" => self.name.clone().map(Value::Text),
                "admin" => self.admin.map(Value::Bool),
                "created_at" => self.created_at.map(Value::Float),
                _ => None,
            }
        }

        fn from_row(values: Vec<Value>) -> Result<Self> {
            let mut user = User::default();
            for (field, value) in User::schema().row_fields().zip(values) {
                match field {
                    "id" => user.id = value.as_text().map(str::to_owned),
                    "email" => user.email = value.as_text().map(str::to_owned),
                    "name" => user.name = value.as_text().map(str::to_owned),
                    "admin" => user.admin = value.as_bool(),
                    "created_at" => user.created_at = value.as_float(),
                    other => return Err(WeftError::row(format!("unexpected field `{other}`"))),
                }
            }
            Ok(user)
        }
    }

    #[test]
    fn test_insert_args_resolve_defaults_in_row_order() {
        let user = User {
            id: Some("u1".into()),
            email: Some("a@b.com".into()),
            ..User::default()
        };
        // email, name, admin, created_at, then the primary key
        assert_eq!(
            insert_args(&user),
            vec![
                Value::Text("a@b.com".into()),
                Value::Null,
                Value::Bool(false),
                Value::Float(100.5),
                Value::Text("u1".into()),
            ]
        );
    }

    #[test]
    fn test_update_args_never_apply_defaults() {
        let user = User {
            id: Some("u1".into()),
            email: Some("a@b.com".into()),
            ..User::default()
        };
        assert_eq!(
            update_args(&user),
            vec![
                Value::Text("a@b.com".into()),
                Value::Null,
                Value::Null,
                Value::Null,
                Value::Text("u1".into()),
            ]
        );
    }

    #[test]
    fn test_from_row_zips_fields_against_row_order() {
        let user = User::from_row(vec![
            Value::Text("a@b.com".into()),
            Value::Text("Alice".into()),
            Value::Bool(true),
            Value::Float(7.0),
            Value::Text("u1".into()),
        ])
        .unwrap();
        assert_eq!(user.id.as_deref(), Some("u1"));
        assert_eq!(user.email.as_deref(), Some("a@b.com"));
        assert_eq!(user.admin, Some(true));
    }
}
