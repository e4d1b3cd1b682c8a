//! Field rules for products. Both the JSON API and the HTML forms go through
//! these, so a product is judged the same way no matter where it came from.

use rust_decimal::Decimal;

use crate::{
    errors::{AppError, Violation},
    structs::{NovoProduto, ProdutoInput},
};

pub const NOME_OBRIGATORIO: &str = "O campo nome é obrigatório.";
pub const PRECO_NEGATIVO: &str = "O preço não pode ser menor que zero.";
pub const QUANTIDADE_NEGATIVA: &str = "A quantidade não pode ser menor que zero.";

pub fn check_nome(nome: Option<&str>) -> Option<Violation> {
    match nome.map(str::trim) {
        Some(nome) if !nome.is_empty() => None,
        _ => Some(Violation::new("nome", NOME_OBRIGATORIO)),
    }
}

pub fn check_preco(preco: Decimal) -> Option<Violation> {
    (preco < Decimal::ZERO).then(|| Violation::new("preco", PRECO_NEGATIVO))
}

pub fn check_quantidade(quantidade: i64) -> Option<Violation> {
    (quantidade < 0).then(|| Violation::new("quantidade", QUANTIDADE_NEGATIVA))
}

/// Checks every rule and reports all the broken ones together.
pub fn validate_produto(input: &ProdutoInput) -> Result<NovoProduto, AppError> {
    let violations: Vec<Violation> = [
        check_nome(input.nome.as_deref()),
        check_preco(input.preco),
        check_quantidade(input.quantidade),
    ]
    .into_iter()
    .flatten()
    .collect();

    if !violations.is_empty() {
        log::warn!("Produto rejected: {:?}", violations);
        return Err(AppError::Validation(violations));
    }

    Ok(NovoProduto {
        nome: input.nome.as_deref().unwrap_or_default().trim().to_owned(),
        preco: input.preco,
        quantidade: input.quantidade,
    })
}
