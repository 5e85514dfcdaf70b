//! Schema compilation.
//!
//! A [`Schema`] is built exactly once per entity type, at registration time.
//! It validates the declared columns (exactly one primary key), fixes the
//! column ordering, and synthesizes the four statement templates every
//! runtime operation reads. Nothing downstream ever recomputes table or
//! column metadata.
//!
//! Templates use the generic `?` placeholder; the executor translates it to
//! the driver's native marker. Column lists always put the non-key fields
//! first, in declaration order, with the primary key last. SELECT columns
//! are aliased to their field names so rows zip positionally back into
//! entities.

use tracing::debug;

use crate::column::Column;
use crate::error::{Result, WeftError};

/// Compiled, immutable metadata for one entity type.
#[derive(Debug, Clone)]
pub struct Schema {
    table: String,
    columns: Vec<(String, Column)>,
    fields: Vec<String>,
    primary_key: String,
    insert_sql: String,
    update_sql: String,
    delete_sql: String,
    select_sql: String,
}

impl Schema {
    pub fn builder(table: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Non-primary-key field names, in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Field names in row order: non-key fields followed by the primary key.
    /// Result rows zip positionally against this list.
    pub fn row_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.primary_key.as_str()))
    }

    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, col)| col)
    }

    /// Translate a field name to its column name.
    pub fn column_name(&self, field: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == field)
            .map(|(name, col)| col.column_name.as_deref().unwrap_or(name))
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert_sql
    }

    pub fn update_sql(&self) -> &str {
        &self.update_sql
    }

    pub fn delete_sql(&self) -> &str {
        &self.delete_sql
    }

    pub fn select_sql(&self) -> &str {
        &self.select_sql
    }
}

/// Collects column declarations and compiles them into a [`Schema`].
pub struct SchemaBuilder {
    table: String,
    columns: Vec<(String, Column)>,
}

impl SchemaBuilder {
    /// Declare a column. The field name doubles as the column name unless
    /// the descriptor carries an override.
    pub fn column(mut self, field: impl Into<String>, column: Column) -> Self {
        self.columns.push((field.into(), column));
        self
    }

    /// Validate the declarations and synthesize the statement templates.
    ///
    /// Fails if no columns were declared, a field name repeats, or the
    /// primary-key count is anything other than one. These are configuration
    /// errors: they fire here, before any entity instance can exist.
    pub fn build(self) -> Result<Schema> {
        let table = self.table;
        if self.columns.is_empty() {
            return Err(WeftError::schema(&table, "no columns declared"));
        }

        let mut fields = Vec::new();
        let mut primary_key: Option<String> = None;
        for (field, column) in &self.columns {
            debug!(
                table = %table,
                field = %field,
                sql_type = column.sql_type_name(),
                "found mapping"
            );
            if self.columns.iter().filter(|(f, _)| f == field).count() > 1 {
                return Err(WeftError::schema(
                    &table,
                    format!("duplicate field `{field}`"),
                ));
            }
            if column.primary_key {
                if primary_key.is_some() {
                    return Err(WeftError::schema(
                        &table,
                        format!("duplicated primary key for field `{field}`"),
                    ));
                }
                primary_key = Some(field.clone());
            } else {
                fields.push(field.clone());
            }
        }
        let primary_key =
            primary_key.ok_or_else(|| WeftError::schema(&table, "primary key not found"))?;

        let col_of = |field: &String| -> String {
            let (_, column) = self
                .columns
                .iter()
                .find(|(f, _)| f == field)
                .expect("field came from the same column list");
            column.column_name.clone().unwrap_or_else(|| field.clone())
        };

        let non_key_cols: Vec<String> = fields.iter().map(&col_of).collect();
        let primary_col = col_of(&primary_key);

        let mut insert_cols: Vec<String> =
            non_key_cols.iter().map(|c| format!("`{c}`")).collect();
        insert_cols.push(format!("`{primary_col}`"));
        let placeholders = vec!["?"; insert_cols.len()].join(", ");
        let insert_sql = format!(
            "insert into `{}` ({}) values ({})",
            table,
            insert_cols.join(", "),
            placeholders
        );

        let set_list = non_key_cols
            .iter()
            .map(|c| format!("`{c}` = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let update_sql = format!(
            "update `{table}` set {set_list} where `{primary_col}` = ?"
        );

        let delete_sql = format!("delete from `{table}` where `{primary_col}` = ?");

        let mut select_list: Vec<String> = non_key_cols
            .iter()
            .zip(fields.iter())
            .map(|(c, f)| format!("`{c}` {f}"))
            .collect();
        select_list.push(format!("`{primary_col}` {primary_key}"));
        let select_sql = format!("select {} from `{}`", select_list.join(", "), table);

        debug!(table = %table, primary_key = %primary_key, "compiled schema");

        Ok(Schema {
            table,
            columns: self.columns,
            fields,
            primary_key,
            insert_sql,
            update_sql,
            delete_sql,
            select_sql,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_schema() -> Schema {
        Schema::builder("users")
            .column("id", Column::string().sql_type("varchar(50)").primary_key())
            .column("email", Column::string().sql_type("varchar(50)"))
            .column("name", Column::string())
            .column("admin", Column::boolean())
            .build()
            .unwrap()
    }

    #[test]
    fn test_primary_key_last_in_insert() {
        let schema = user_schema();
        assert_eq!(
            schema.insert_sql(),
            "insert into `users` (`email`, `name`, `admin`, `id`) values (?, ?, ?, ?)"
        );
    }

    #[test]
    fn test_update_matches_on_primary_key_only() {
        let schema = user_schema();
        assert_eq!(
            schema.update_sql(),
            "update `users` set `email` = ?, `name` = ?, `admin` = ? where `id` = ?"
        );
        assert_eq!(
            schema.delete_sql(),
            "delete from `users` where `id` = ?"
        );
    }

    #[test]
    fn test_select_aliases_columns_to_fields() {
        let schema = Schema::builder("users")
            .column("id", Column::string().primary_key())
            .column("email", Column::string().named("email_addr"))
            .build()
            .unwrap();
        assert_eq!(
            schema.select_sql(),
            "select `email_addr` email, `id` id from `users`"
        );
        assert_eq!(schema.column_name("email"), Some("email_addr"));
    }

    #[test]
    fn test_row_fields_order() {
        let schema = user_schema();
        let order: Vec<&str> = schema.row_fields().collect();
        assert_eq!(order, ["email", "name", "admin", "id"]);
    }

    #[test]
    fn test_missing_primary_key_is_fatal() {
        let err = Schema::builder("users")
            .column("email", Column::string())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("primary key not found"));
    }

    #[test]
    fn test_duplicate_primary_key_is_fatal() {
        let err = Schema::builder("users")
            .column("id", Column::string().primary_key())
            .column("email", Column::string().primary_key())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicated primary key"));
    }

    #[test]
    fn test_empty_schema_is_fatal() {
        let err = Schema::builder("users").build().unwrap_err();
        assert!(err.to_string().contains("no columns declared"));
    }

    #[test]
    fn test_duplicate_field_is_fatal() {
        let err = Schema::builder("users")
            .column("id", Column::string().primary_key())
            .column("email", Column::string())
            .column("email", Column::text())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("duplicate field `email`"));
    }
}
