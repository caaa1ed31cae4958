//! Database connection and table creation using SeaORM.
//!
//! The entity definitions are the schema source of truth: tables are created
//! with `Schema::create_table_from_entity`, so the database always matches
//! the Rust structs without hand-written SQL. Tests (and anything else that
//! needs a throwaway store) connect to `sqlite::memory:`.

use crate::entities::{Product, Purchase, Recharge, Transaction, User, Withdrawal};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database behind the given URL.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions.
///
/// Idempotence is left to the caller; this is invoked once at startup on a
/// fresh database and by every test against an in-memory one.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(Purchase),
        schema.create_table_from_entity(Transaction),
        schema.create_table_from_entity(Recharge),
        schema.create_table_from_entity(Withdrawal),
    ];

    for mut table in tables {
        // Startup re-runs this against an existing database
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    Ok(())
}
