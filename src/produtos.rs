//! Product service: validation first, then the store, with every outcome
//! mapped onto the error taxonomy in [`crate::errors`].

use crate::{
    db,
    errors::AppError,
    structs::{DeleteConfirmation, Produto, ProdutoFilter, ProdutoInput},
    validation::validate_produto,
    AppState,
};

const ERRO_CRIAR: &str = "Erro ao criar o produto.";
const ERRO_LISTAR: &str = "Erro ao buscar produtos.";
const ERRO_BUSCAR: &str = "Erro ao buscar produto.";
const ERRO_ATUALIZAR: &str = "Erro ao atualizar o produto.";
const ERRO_EXCLUIR: &str = "Erro ao excluir o produto.";

pub async fn create(state: &AppState, input: &ProdutoInput) -> Result<Produto, AppError> {
    let novo = validate_produto(input)?;
    db::insert_produto(state, &novo)
        .await
        .map_err(AppError::persistence(ERRO_CRIAR))
}

pub async fn find_all(state: &AppState, filter: &ProdutoFilter) -> Result<Vec<Produto>, AppError> {
    db::list_produtos(state, filter)
        .await
        .map_err(AppError::persistence(ERRO_LISTAR))
}

pub async fn find_one(state: &AppState, id: i64) -> Result<Produto, AppError> {
    db::find_produto(state, id)
        .await
        .map_err(AppError::persistence(ERRO_BUSCAR))?
        .ok_or_else(|| not_found(ERRO_BUSCAR, id))
}

pub async fn update(state: &AppState, id: i64, input: &ProdutoInput) -> Result<Produto, AppError> {
    let novo = validate_produto(input)?;
    db::update_produto(state, id, &novo)
        .await
        .map_err(AppError::persistence(ERRO_ATUALIZAR))?
        .ok_or_else(|| not_found(ERRO_ATUALIZAR, id))
}

pub async fn delete(state: &AppState, id: i64) -> Result<DeleteConfirmation, AppError> {
    db::find_produto(state, id)
        .await
        .map_err(AppError::persistence(ERRO_EXCLUIR))?
        .ok_or_else(|| not_found(ERRO_EXCLUIR, id))?;

    // Someone else may have removed it between the lookup and the delete.
    let removed = db::delete_produto(state, id)
        .await
        .map_err(AppError::persistence(ERRO_EXCLUIR))?;
    if !removed {
        return Err(not_found(ERRO_EXCLUIR, id));
    }

    Ok(DeleteConfirmation::for_produto(id))
}

fn not_found(context: &'static str, id: i64) -> AppError {
    log::warn!("Produto with id {} not found", id);
    AppError::NotFound { context, id }
}
