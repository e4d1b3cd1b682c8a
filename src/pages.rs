//! Server-rendered product pages: list, create, edit and show.
//!
//! Forms post back to the server, which checks them with the same rules as the
//! JSON API and re-renders them with the offending fields marked.

use std::collections::BTreeMap;

use actix_web::{
    get,
    http::{header, StatusCode},
    post,
    web::{self, Data},
    HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::{
    errors::{AppError, Violation},
    produtos,
    structs::{Produto, ProdutoFilter, ProdutoInput},
    utils::{parse_preco, preco_2dp},
    validation::{check_nome, check_preco, check_quantidade},
    AppState, TEMPLATES,
};

const LIST_URL: &str = "/app/produtos";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .error_handler(|err, _req| AppError::Payload(err.to_string()).into()),
    )
    .service(index_handler)
        .service(list_page)
        .service(create_page)
        .service(create_form_handler)
        .service(edit_page)
        .service(edit_form_handler)
        .service(show_page)
        .service(delete_form_handler);
}

/// Product form as typed in the browser; every field arrives as text.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ProdutoForm {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub preco: String,
    #[serde(default)]
    pub quantidade: String,
}

impl ProdutoForm {
    fn from_produto(produto: &Produto) -> Self {
        Self {
            nome: produto.nome.clone(),
            preco: preco_2dp(produto.preco),
            quantidade: produto.quantidade.to_string(),
        }
    }

    fn to_input(&self) -> Result<ProdutoInput, Vec<Violation>> {
        let preco = parse_preco(&self.preco)
            .ok_or_else(|| Violation::new("preco", "Informe um preço válido."));
        let quantidade = self.quantidade.trim().parse::<i64>().map_err(|_| {
            Violation::new("quantidade", "A quantidade deve ser um número inteiro.")
        });

        let violations: Vec<Violation> = [
            check_nome(Some(self.nome.as_str())),
            match &preco {
                Ok(preco) => check_preco(*preco),
                Err(violation) => Some(violation.clone()),
            },
            match &quantidade {
                Ok(quantidade) => check_quantidade(*quantidade),
                Err(violation) => Some(violation.clone()),
            },
        ]
        .into_iter()
        .flatten()
        .collect();

        match (preco, quantidade) {
            (Ok(preco), Ok(quantidade)) if violations.is_empty() => Ok(ProdutoInput {
                nome: Some(self.nome.clone()),
                preco,
                quantidade,
            }),
            _ => Err(violations),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    msg: Option<String>,
    nome: Option<String>,
}

fn flash_message(code: &str) -> Option<&'static str> {
    match code {
        "criado" => Some("Produto criado com sucesso!"),
        "atualizado" => Some("Produto atualizado com sucesso!"),
        "excluido" => Some("Produto excluído com sucesso!"),
        _ => None,
    }
}

fn field_errors(violations: &[Violation]) -> BTreeMap<&'static str, Vec<String>> {
    let mut errors: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    for violation in violations {
        errors
            .entry(violation.field)
            .or_default()
            .push(violation.message.clone());
    }
    errors
}

fn render(template: &str, context: &Context) -> Result<String, AppError> {
    TEMPLATES.render(template, context).map_err(|e| {
        log::error!("Failed to render template: {}", e);
        AppError::Template(e)
    })
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body)
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, location))
        .finish()
}

fn error_page(err: &AppError) -> Result<HttpResponse, AppError> {
    let mut context = Context::new();
    context.insert("title", &err.to_string());
    context.insert("details", &err.details());
    Ok(html(err.status_code(), render("error.html", &context)?))
}

struct FormPage<'a> {
    title: &'a str,
    action: String,
    submit: &'a str,
    form: &'a ProdutoForm,
}

fn form_page(
    page: FormPage<'_>,
    status: StatusCode,
    err: Option<&AppError>,
) -> Result<HttpResponse, AppError> {
    let violations = err.map(AppError::violations).unwrap_or_default();
    let mut context = Context::new();
    context.insert("title", page.title);
    context.insert("action", &page.action);
    context.insert("submit", page.submit);
    context.insert("form", page.form);
    context.insert("errors", &field_errors(violations));
    // Rule violations are shown beside their fields; anything else goes on top.
    if let Some(err) = err.filter(|e| e.violations().is_empty()) {
        context.insert("error", &format!("Erro: {}", err.details()));
    }
    Ok(html(status, render("produtos/form.html", &context)?))
}

async fn list_response(
    state: &AppState,
    query: &ListQuery,
    err: Option<&AppError>,
) -> Result<HttpResponse, AppError> {
    let filter = ProdutoFilter {
        nome: query.nome.clone(),
    };
    let mut context = Context::new();
    context.insert("title", "Lista de Produtos");
    context.insert("filtro", &query.nome.clone().unwrap_or_default());
    if let Some(flash) = query.msg.as_deref().and_then(flash_message) {
        context.insert("flash", flash);
    }

    let mut status = err.map_or(StatusCode::OK, AppError::status_code);
    let produtos = match produtos::find_all(state, &filter).await {
        Ok(produtos) => produtos,
        Err(list_err) => {
            status = list_err.status_code();
            context.insert("load_error", "Erro ao carregar os produtos.");
            Vec::new()
        }
    };
    context.insert("produtos", &produtos);
    if let Some(err) = err {
        context.insert("error", &format!("Erro: {}", err.details()));
    }

    Ok(html(status, render("produtos/list.html", &context)?))
}

#[get("/")]
pub async fn index_handler() -> HttpResponse {
    see_other(LIST_URL)
}

#[get("/app/produtos")]
pub async fn list_page(
    state: Data<AppState>,
    web::Query(query): web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    list_response(&state, &query, None).await
}

#[get("/app/produtos/create")]
pub async fn create_page() -> Result<HttpResponse, AppError> {
    form_page(create_form(&ProdutoForm::default()), StatusCode::OK, None)
}

fn create_form(form: &ProdutoForm) -> FormPage<'_> {
    FormPage {
        title: "Cadastrar Produto",
        action: format!("{}/create", LIST_URL),
        submit: "Cadastrar",
        form,
    }
}

#[post("/app/produtos/create")]
pub async fn create_form_handler(
    state: Data<AppState>,
    web::Form(form): web::Form<ProdutoForm>,
) -> Result<HttpResponse, AppError> {
    let outcome = match form.to_input() {
        Ok(input) => produtos::create(&state, &input).await.map(|_| ()),
        Err(violations) => Err(AppError::Validation(violations)),
    };
    match outcome {
        Ok(()) => Ok(see_other(&format!("{}?msg=criado", LIST_URL))),
        Err(err) => form_page(create_form(&form), err.status_code(), Some(&err)),
    }
}

fn edit_form(id: i64, form: &ProdutoForm) -> FormPage<'_> {
    FormPage {
        title: "Editar Produto",
        action: format!("{}/edit/{}", LIST_URL, id),
        submit: "Salvar",
        form,
    }
}

#[get("/app/produtos/edit/{id}")]
pub async fn edit_page(
    state: Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    match produtos::find_one(&state, id).await {
        Ok(produto) => form_page(
            edit_form(id, &ProdutoForm::from_produto(&produto)),
            StatusCode::OK,
            None,
        ),
        Err(err) => error_page(&err),
    }
}

#[post("/app/produtos/edit/{id}")]
pub async fn edit_form_handler(
    state: Data<AppState>,
    path: web::Path<i64>,
    web::Form(form): web::Form<ProdutoForm>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let outcome = match form.to_input() {
        Ok(input) => produtos::update(&state, id, &input).await.map(|_| ()),
        Err(violations) => Err(AppError::Validation(violations)),
    };
    match outcome {
        Ok(()) => Ok(see_other(&format!("{}?msg=atualizado", LIST_URL))),
        Err(err) => form_page(edit_form(id, &form), err.status_code(), Some(&err)),
    }
}

#[get("/app/produtos/show/{id}")]
pub async fn show_page(
    state: Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let produto = match produtos::find_one(&state, path.into_inner()).await {
        Ok(produto) => produto,
        Err(err) => return error_page(&err),
    };

    let mut context = Context::new();
    context.insert("title", "Detalhes do Produto");
    context.insert("produto", &produto);
    Ok(html(StatusCode::OK, render("produtos/show.html", &context)?))
}

#[post("/app/produtos/{id}/delete")]
pub async fn delete_form_handler(
    state: Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    match produtos::delete(&state, path.into_inner()).await {
        Ok(_) => Ok(see_other(&format!("{}?msg=excluido", LIST_URL))),
        Err(err) => list_response(&state, &ListQuery::default(), Some(&err)).await,
    }
}
