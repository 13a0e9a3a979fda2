#![allow(dead_code)]

use sql_entity_access::prelude::*;
use tempfile::tempdir;

entity! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Customer {
        pub id: i64,
        pub name: String,
        pub contact: Option<String>,
        pub email: String,
    }
}

entity! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Purchase {
        pub id: i64,
        pub customer_id: i64,
        pub amount: f64,
    }
}

pub fn unique_db_path(prefix: &str) -> String {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    // Leak the tempdir so the file persists for the duration of the test binary.
    std::mem::forget(dir);
    path.to_string_lossy().into_owned()
}

pub fn sqlite_config(prefix: &str, pool: PoolOptions) -> DataSourceConfig {
    DataSourceConfig::new(Driver::Sqlite, format!("jdbc:sqlite:{}", unique_db_path(prefix)))
        .with_pool(pool)
}

pub async fn customer_access(prefix: &str) -> Result<EntityAccess, EntityAccessError> {
    let access = EntityAccess::from_config(&sqlite_config(prefix, PoolOptions::default())).await?;
    create_schema(&access).await?;
    Ok(access)
}

pub async fn create_schema(access: &EntityAccess) -> Result<(), EntityAccessError> {
    access
        .execute_update(
            "CREATE TABLE customer (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                contact TEXT,
                email TEXT NOT NULL UNIQUE
            )",
            &[],
        )
        .await?;
    access
        .execute_update(
            "CREATE TABLE purchase (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id INTEGER NOT NULL,
                amount REAL NOT NULL
            )",
            &[],
        )
        .await?;
    Ok(())
}

pub async fn id_for_email(access: &EntityAccess, email: &str) -> Result<i64, EntityAccessError> {
    let rows = access
        .execute_query(
            "SELECT id FROM customer WHERE email = ?",
            &[RowValues::Text(email.into())],
        )
        .await?;
    Ok(*rows[0].get("id").unwrap().as_int().unwrap())
}
