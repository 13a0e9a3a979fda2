//! Customer CRUD service on top of `EntityAccess`.
//!
//! Run with `RUST_LOG=sql_entity_access=debug cargo run --example customer_service`
//! to see the statements and lease traffic.

use sql_entity_access::prelude::*;
use tracing_subscriber::EnvFilter;

entity! {
    #[derive(Debug, Clone)]
    pub struct Customer {
        pub id: i64,
        pub name: String,
        pub contact: Option<String>,
        pub telephone: Option<String>,
        pub email: Option<String>,
        pub remark: Option<String>,
    }
}

struct CustomerService {
    access: EntityAccess,
}

impl CustomerService {
    async fn get_customer_list(&self) -> Result<Vec<Customer>, EntityAccessError> {
        self.access
            .query_entity_list("SELECT * FROM customer", &[])
            .await
    }

    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, EntityAccessError> {
        self.access
            .query_entity("SELECT * FROM customer WHERE id=?", &[RowValues::Int(id)])
            .await
    }

    async fn create_customer(&self, fields: &FieldMap) -> Result<bool, EntityAccessError> {
        self.access.insert_entity::<Customer>(fields).await
    }

    async fn update_customer(&self, id: i64, fields: &FieldMap) -> Result<bool, EntityAccessError> {
        self.access.update_entity::<Customer>(id, fields).await
    }

    async fn delete_customer(&self, id: i64) -> Result<bool, EntityAccessError> {
        self.access.delete_entity::<Customer>(id).await
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dir = tempfile::tempdir()?;
    let properties = dir.path().join("config.properties");
    std::fs::write(
        &properties,
        format!(
            "jdbc.driver=org.sqlite.JDBC\njdbc.url=jdbc:sqlite:{}\npool.max_size=4\n",
            dir.path().join("demo.db").display()
        ),
    )?;

    let access = EntityAccess::from_config_file(&properties).await?;
    access
        .execute_update(
            "CREATE TABLE customer (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                contact TEXT,
                telephone TEXT,
                email TEXT,
                remark TEXT
            )",
            &[],
        )
        .await?;
    let service = CustomerService { access };

    for (name, contact, email) in [
        ("customer1", "Jack", "jack@gmail.com"),
        ("customer2", "Rose", "rose@gmail.com"),
    ] {
        let fields = FieldMap::new()
            .with("name", name)
            .with("contact", contact)
            .with("email", email);
        println!("create {name}: {}", service.create_customer(&fields).await?);
    }

    let customers = service.get_customer_list().await?;
    for customer in &customers {
        println!("{customer:?}");
    }

    let Some(first) = customers.first() else {
        return Ok(());
    };
    let changes = FieldMap::new().with("telephone", "13512345678");
    println!("update {}: {}", first.id, service.update_customer(first.id, &changes).await?);
    println!("reloaded: {:?}", service.get_customer(first.id).await?);

    println!("delete {}: {}", first.id, service.delete_customer(first.id).await?);
    println!("delete again: {}", service.delete_customer(first.id).await?);

    let summary = service
        .access
        .execute_query("SELECT COUNT(*) AS remaining FROM customer", &[])
        .await?;
    if let Some(row) = summary.first() {
        println!("remaining customers: {:?}", row.get("remaining"));
    }
    println!("pool: {:?}", service.access.connection_manager().status());
    Ok(())
}
