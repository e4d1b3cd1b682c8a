//! Shared fixtures for the unit and HTTP tests.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::{
    structs::{NovoProduto, ProdutoInput},
    AppState,
};

/// Fresh in-memory database with the real migrations applied.
///
/// A single connection that never expires, since every new SQLite memory
/// connection would otherwise see an empty database.
pub async fn test_state() -> AppState {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:").expect("memory url");
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await
        .expect("in-memory pool");
    sqlx::migrate!().run(&db_pool).await.expect("migrations");
    AppState { db_pool }
}

pub fn novo(nome: &str, preco: &str, quantidade: i64) -> NovoProduto {
    NovoProduto {
        nome: nome.to_owned(),
        preco: Decimal::from_str(preco).expect("decimal"),
        quantidade,
    }
}

pub fn input(nome: &str, preco: &str, quantidade: i64) -> ProdutoInput {
    ProdutoInput {
        nome: Some(nome.to_owned()),
        preco: Decimal::from_str(preco).expect("decimal"),
        quantidade,
    }
}
