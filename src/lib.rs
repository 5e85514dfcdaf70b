//! weft-orm: a minimal async ORM for MySQL.
//!
//! Entities are plain structs registered once against a declarative
//! [`Schema`]; the compiler synthesizes parameterized INSERT/UPDATE/DELETE/
//! SELECT templates, and the blanket [`Model`] trait runs them through a
//! bounded connection pool.
//!
//! ```no_run
//! use once_cell::sync::Lazy;
//! use weft_orm::{Column, Db, DbConfig, Entity, Model, QueryOpts, Schema, Value};
//!
//! static USER_SCHEMA: Lazy<Schema> = Lazy::new(|| {
//!     Schema::builder("users")
//!         .column("id", Column::string().sql_type("varchar(50)").primary_key())
//!         .column("email", Column::string().sql_type("varchar(50)"))
//!         .column("name", Column::string())
//!         .build()
//!         .expect("valid users schema")
//! });
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: Option<String>,
//!     email: Option<String>,
//!     name: Option<String>,
//! }
//!
//! impl Entity for User {
//!     fn schema() -> &'static Schema {
//!         &USER_SCHEMA
//!     }
//!
//!     fn get(&self, field: &str) -> Option<Value> {
//!         match field {
//!             "id" => self.id.clone().map(Value::Text),
//!             "email" => self.email.clone().map(Value::Text),
//!             "name" => self.name.clone().map(Value::Text),
//!             _ => None,
//!         }
//!     }
//!
//!     fn from_row(values: Vec<Value>) -> weft_orm::Result<Self> {
//!         let mut user = User::default();
//!         for (field, value) in User::schema().row_fields().zip(values) {
//!             let text = value.as_text().map(str::to_owned);
//!             match field {
//!                 "id" => user.id = text,
//!                 "email" => user.email = text,
//!                 "name" => user.name = text,
//!                 _ => {}
//!             }
//!         }
//!         Ok(user)
//!     }
//! }
//!
//! # async fn demo() -> weft_orm::Result<()> {
//! let db = Db::connect(&DbConfig::new("www", "secret", "blog")).await?;
//! let user = User {
//!     id: Some("u1".into()),
//!     email: Some("a@b.com".into()),
//!     name: Some("Alice".into()),
//! };
//! user.save(&db).await?;
//! let found = User::find(&db, "u1").await?;
//! let admins = User::find_all(
//!     &db,
//!     vec![Value::Text("a@b.com".into())],
//!     QueryOpts::new().filter("email = ?").order_by("name").limit(10),
//! )
//! .await?;
//! # let _ = (found, admins);
//! db.close().await;
//! # Ok(())
//! # }
//! ```

pub mod column;
pub mod config;
pub mod error;
pub mod executor;
pub mod model;
pub mod pool;
pub mod query;
pub mod schema;
pub mod value;

pub use column::{Column, ColumnDefault};
pub use config::DbConfig;
pub use error::{Result, WeftError};
pub use executor::Placeholder;
pub use model::{Entity, Model};
pub use pool::Db;
pub use query::{Limit, QueryOpts};
pub use schema::{Schema, SchemaBuilder};
pub use value::Value;
