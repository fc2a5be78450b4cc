//! PostgreSQL connection pool initialization.
//!
//! The database URL is read from the `DATABASE_URL` environment variable.
//! The pool is created lazily, so startup does not block on the database
//! being reachable; the first query establishes the connection.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

pub fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(&database_url)
        .expect("Invalid DATABASE_URL")
}
