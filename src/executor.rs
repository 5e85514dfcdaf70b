//! Statement execution.
//!
//! Two entry points: [`query`] for row-returning statements and [`execute`]
//! for writes. Both check a connection out of the pool for the duration of
//! the call, translate the generic `?` placeholder to the driver marker,
//! and log the SQL text and row counts. Statement arguments are bound, and
//! deliberately never logged.

use futures::TryStreamExt;
use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::{info, warn};

use crate::error::{Result, WeftError};
use crate::pool::Db;
use crate::value::Value;

/// Placeholder syntax of the target driver.
///
/// Templates are synthesized with the generic `?` marker; translation is a
/// literal character rewrite, not parsed SQL. A `?` inside a string literal
/// would corrupt it, which is why templates only ever come from the schema
/// compiler, never from user input directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `?` markers (MySQL). Identity rewrite.
    Question,
    /// `$1`, `$2`, ... markers (PostgreSQL-style drivers).
    Numbered,
}

impl Placeholder {
    /// The marker style of the driver this crate is built against.
    pub fn native() -> Self {
        Placeholder::Question
    }

    /// Rewrite a generic `?` template into this style.
    pub fn translate(&self, sql: &str) -> String {
        match self {
            Placeholder::Question => sql.to_owned(),
            Placeholder::Numbered => {
                let mut out = String::with_capacity(sql.len());
                let mut n = 0u32;
                for ch in sql.chars() {
                    if ch == '?' {
                        n += 1;
                        out.push('$');
                        out.push_str(&n.to_string());
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
        }
    }
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(n) => query.bind(*n),
        Value::Float(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.clone()),
        Value::Bytes(b) => query.bind(b.clone()),
    }
}

fn decode_cell(row: &MySqlRow, idx: usize) -> Result<Value> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_owned();
    drop(raw);

    let column = row.columns()[idx].name().to_owned();
    let decode_err = |err: sqlx::Error| {
        WeftError::row(format!("column `{column}` ({type_name}): {err}"))
    };

    match type_name.as_str() {
        "BOOLEAN" => row.try_get::<bool, _>(idx).map(Value::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            row.try_get::<i64, _>(idx).map(Value::Int)
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => row.try_get::<u64, _>(idx).map(|v| Value::Int(v as i64)),
        "FLOAT" => row.try_get::<f32, _>(idx).map(|v| Value::Float(v as f64)),
        "DOUBLE" => row.try_get::<f64, _>(idx).map(Value::Float),
        "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            row.try_get::<Vec<u8>, _>(idx).map(Value::Bytes)
        }
        // VARCHAR, CHAR, TEXT, ENUM, DECIMAL and anything else textual
        _ => row.try_get::<String, _>(idx).map(Value::Text),
    }
    .map_err(decode_err)
}

fn decode_row(row: &MySqlRow) -> Result<Vec<Value>> {
    (0..row.len()).map(|idx| decode_cell(row, idx)).collect()
}

/// Execute a row-returning statement.
///
/// Fetches all rows, or at most `limit` when given. Rows come back as
/// ordered values positionally aligned to the statement's column list.
pub async fn query(
    db: &Db,
    sql: &str,
    args: &[Value],
    limit: Option<usize>,
) -> Result<Vec<Vec<Value>>> {
    let sql = Placeholder::native().translate(sql);
    info!(sql = %sql, "query");

    if limit == Some(0) {
        return Ok(Vec::new());
    }

    let mut conn = db.acquire().await?;
    let mut statement = sqlx::query(&sql);
    for arg in args {
        statement = bind_value(statement, arg);
    }

    let mut stream = statement.fetch(&mut *conn);
    let mut rows = Vec::new();
    while let Some(row) = stream.try_next().await? {
        rows.push(decode_row(&row)?);
        if let Some(n) = limit {
            if rows.len() >= n {
                break;
            }
        }
    }
    info!(rows = rows.len() as u64, "rows returned");
    Ok(rows)
}

/// Execute a write statement, returning the affected-row count.
///
/// With `autocommit` false an explicit transaction wraps the statement:
/// commit on success, roll back on failure. The triggering driver error is
/// re-raised after rollback; it is never swallowed.
pub async fn execute(db: &Db, sql: &str, args: &[Value], autocommit: bool) -> Result<u64> {
    let sql = Placeholder::native().translate(sql);
    info!(sql = %sql, "execute");

    if autocommit {
        let mut conn = db.acquire().await?;
        let mut statement = sqlx::query(&sql);
        for arg in args {
            statement = bind_value(statement, arg);
        }
        let done = statement.execute(&mut *conn).await?;
        Ok(done.rows_affected())
    } else {
        let mut tx = db.begin().await?;
        let mut statement = sqlx::query(&sql);
        for arg in args {
            statement = bind_value(statement, arg);
        }
        match statement.execute(&mut *tx).await {
            Ok(done) => {
                tx.commit().await?;
                Ok(done.rows_affected())
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(err.into())
            }
        }
    }
}
