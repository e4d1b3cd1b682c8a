use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    config::Config,
    errors::AppError,
    structs::{NovoProduto, NovoUsuario, Produto, ProdutoFilter, Usuario},
    utils::timestamp,
    AppState,
};

pub async fn connect(config: &Config) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| AppError::Config(format!("DATABASE_URL: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .read_only(false)
        .busy_timeout(config.request_timeout);

    let db_pool = SqlitePoolOptions::new()
        .acquire_timeout(config.request_timeout)
        .connect_with(opts)
        .await
        .map_err(AppError::persistence("Erro ao conectar ao banco de dados."))?;

    sqlx::migrate!().run(&db_pool).await?;
    log::info!("Database migrated successfully");
    Ok(db_pool)
}

pub async fn insert_produto(state: &AppState, novo: &NovoProduto) -> Result<Produto, sqlx::Error> {
    let updated_at = timestamp(chrono::Utc::now());
    let produto = sqlx::query_as::<_, Produto>(
        "INSERT INTO produtos (nome, preco, quantidade, updated_at) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&novo.nome)
    .bind(novo.preco.to_string())
    .bind(novo.quantidade)
    .bind(&updated_at)
    .fetch_one(&state.db_pool)
    .await?;
    log::info!("Produto created: {:?}", produto);
    Ok(produto)
}

/// Most recently touched first; ties fall back to the newest id.
pub async fn list_produtos(
    state: &AppState,
    filter: &ProdutoFilter,
) -> Result<Vec<Produto>, sqlx::Error> {
    let nome = filter
        .nome
        .as_deref()
        .map(str::trim)
        .filter(|nome| !nome.is_empty());

    let produtos = match nome {
        Some(nome) => {
            sqlx::query_as::<_, Produto>(
                "SELECT * FROM produtos WHERE instr(lower(nome), lower($1)) > 0 \
                 ORDER BY updated_at DESC, id DESC",
            )
            .bind(nome)
            .fetch_all(&state.db_pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Produto>("SELECT * FROM produtos ORDER BY updated_at DESC, id DESC")
                .fetch_all(&state.db_pool)
                .await?
        }
    };
    Ok(produtos)
}

pub async fn find_produto(state: &AppState, id: i64) -> Result<Option<Produto>, sqlx::Error> {
    sqlx::query_as::<_, Produto>("SELECT * FROM produtos WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await
}

/// Replaces every mutable field; `None` when no row has this id.
pub async fn update_produto(
    state: &AppState,
    id: i64,
    novo: &NovoProduto,
) -> Result<Option<Produto>, sqlx::Error> {
    let updated_at = timestamp(chrono::Utc::now());
    let produto = sqlx::query_as::<_, Produto>(
        "UPDATE produtos SET nome = $1, preco = $2, quantidade = $3, updated_at = $4 \
         WHERE id = $5 RETURNING *",
    )
    .bind(&novo.nome)
    .bind(novo.preco.to_string())
    .bind(novo.quantidade)
    .bind(&updated_at)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await?;
    if let Some(produto) = &produto {
        log::info!("Produto updated: {:?}", produto);
    }
    Ok(produto)
}

/// Returns whether a row was removed.
pub async fn delete_produto(state: &AppState, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM produtos WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await?;
    let removed = result.rows_affected() > 0;
    if removed {
        log::info!("Produto with id {} deleted", id);
    }
    Ok(removed)
}

pub async fn list_usuarios(state: &AppState) -> Result<Vec<Usuario>, sqlx::Error> {
    sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios ORDER BY id")
        .fetch_all(&state.db_pool)
        .await
}

pub async fn insert_usuario(state: &AppState, novo: &NovoUsuario) -> Result<Usuario, sqlx::Error> {
    let usuario = sqlx::query_as::<_, Usuario>(
        "INSERT INTO usuarios (nome, email) VALUES ($1, $2) RETURNING *",
    )
    .bind(&novo.nome)
    .bind(&novo.email)
    .fetch_one(&state.db_pool)
    .await?;
    log::info!("Usuario created: {:?}", usuario);
    Ok(usuario)
}
