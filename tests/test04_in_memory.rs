mod common;

use common::{Customer, create_schema};
use sql_entity_access::prelude::*;

fn memory_config(max_size: u32) -> DataSourceConfig {
    DataSourceConfig::new(Driver::Sqlite, "jdbc:sqlite::memory:").with_pool(PoolOptions {
        max_size,
        acquire_timeout_ms: 2_000,
        ..PoolOptions::default()
    })
}

#[tokio::test]
async fn pooled_connections_share_one_memory_database() -> Result<(), Box<dyn std::error::Error>> {
    let access = EntityAccess::from_config(&memory_config(2)).await?;
    create_schema(&access).await?;
    assert!(
        access
            .insert_entity::<Customer>(&FieldMap::new().with("name", "Kim").with("email", "kim@x.com"))
            .await?
    );

    // Pin one connection so the next call has to open or reuse a different one.
    let held = access.connection_manager().acquire().await?;
    let customers: Vec<Customer> = access
        .query_entity_list("SELECT * FROM customer", &[])
        .await?;
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].name, "Kim");
    assert_eq!(access.connection_manager().status().connections, 2);
    drop(held);
    Ok(())
}

#[tokio::test]
async fn separate_pools_get_separate_memory_databases() -> Result<(), Box<dyn std::error::Error>> {
    let first = EntityAccess::from_config(&memory_config(1)).await?;
    create_schema(&first).await?;

    let second = EntityAccess::from_config(&memory_config(1)).await?;
    let err = second
        .execute_query("SELECT * FROM customer", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, EntityAccessError::DataAccess { .. }));
    Ok(())
}
