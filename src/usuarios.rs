use crate::{
    db,
    errors::AppError,
    structs::{NovoUsuario, Usuario},
    AppState,
};

pub async fn find_all(state: &AppState) -> Result<Vec<Usuario>, AppError> {
    db::list_usuarios(state)
        .await
        .map_err(AppError::persistence("Erro ao buscar usuários."))
}

/// No field rules here; the row is inserted as given.
pub async fn create(state: &AppState, novo: &NovoUsuario) -> Result<Usuario, AppError> {
    db::insert_usuario(state, novo)
        .await
        .map_err(AppError::persistence("Erro ao criar o usuário."))
}
