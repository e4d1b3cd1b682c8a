use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Produto {
    pub id: i64,
    pub nome: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub preco: Decimal,
    pub quantidade: i64,
    pub updated_at: DateTime<Utc>,
}

// `preco` is kept as text in SQLite so the decimal survives unchanged.
impl<'r> FromRow<'r, SqliteRow> for Produto {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let preco: String = row.try_get("preco")?;
        let preco = Decimal::from_str(&preco).map_err(|e| sqlx::Error::ColumnDecode {
            index: "preco".to_owned(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            nome: row.try_get("nome")?,
            preco,
            quantidade: row.try_get("quantidade")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Candidate product as sent by a client, before validation.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProdutoInput {
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub preco: Decimal,
    pub quantidade: i64,
}

/// Product fields that passed validation and may be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NovoProduto {
    pub nome: String,
    pub preco: Decimal,
    pub quantidade: i64,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ProdutoFilter {
    pub nome: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DeleteConfirmation {
    pub message: String,
}

impl DeleteConfirmation {
    pub fn for_produto(id: i64) -> Self {
        Self {
            message: format!("Produto com id {} excluído com sucesso.", id),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, FromRow)]
pub struct Usuario {
    pub id: i64,
    pub nome: String,
    pub email: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NovoUsuario {
    pub nome: String,
    pub email: String,
}
