use actix_cors::Cors;
use actix_web::{
    delete, get, http::header, post, put,
    web::{self, Data},
    HttpResponse, Responder,
};
use serde_json::json;

use crate::{
    config::Config,
    errors::AppError,
    produtos,
    structs::{NovoUsuario, ProdutoFilter, ProdutoInput},
    usuarios, AppState,
};

/// Registers the JSON API. Malformed bodies, ids and queries come back in the
/// same error envelope as every other failure.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Payload(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::Payload(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::Payload(err.to_string()).into()),
    )
    .service(health_handler)
    .service(create_produto)
    .service(list_produtos)
    .service(get_produto)
    .service(update_produto)
    .service(delete_produto)
    .service(list_usuarios)
    .service(create_usuario);
}

pub fn cors(config: &Config) -> Cors {
    config
        .cors_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600)
}

#[get("/health")]
pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[post("/produtos")]
pub async fn create_produto(
    state: Data<AppState>,
    web::Json(input): web::Json<ProdutoInput>,
) -> Result<impl Responder, AppError> {
    let produto = produtos::create(&state, &input).await?;
    Ok(HttpResponse::Created().json(produto))
}

#[get("/produtos")]
pub async fn list_produtos(
    state: Data<AppState>,
    web::Query(filter): web::Query<ProdutoFilter>,
) -> Result<impl Responder, AppError> {
    let produtos = produtos::find_all(&state, &filter).await?;
    Ok(HttpResponse::Ok().json(produtos))
}

#[get("/produtos/{id}")]
pub async fn get_produto(
    state: Data<AppState>,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let produto = produtos::find_one(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(produto))
}

#[put("/produtos/{id}")]
pub async fn update_produto(
    state: Data<AppState>,
    path: web::Path<i64>,
    web::Json(input): web::Json<ProdutoInput>,
) -> Result<impl Responder, AppError> {
    let produto = produtos::update(&state, path.into_inner(), &input).await?;
    Ok(HttpResponse::Ok().json(produto))
}

#[delete("/produtos/{id}")]
pub async fn delete_produto(
    state: Data<AppState>,
    path: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let confirmation = produtos::delete(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(confirmation))
}

#[get("/usuarios")]
pub async fn list_usuarios(state: Data<AppState>) -> Result<impl Responder, AppError> {
    let usuarios = usuarios::find_all(&state).await?;
    Ok(HttpResponse::Ok().json(usuarios))
}

#[post("/usuarios")]
pub async fn create_usuario(
    state: Data<AppState>,
    web::Json(novo): web::Json<NovoUsuario>,
) -> Result<impl Responder, AppError> {
    let usuario = usuarios::create(&state, &novo).await?;
    Ok(HttpResponse::Created().json(usuario))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use actix_web::{
        http::{Method, StatusCode},
        test, App,
    };
    use serde_json::Value;
    use std::time::Duration;

    async fn app(
        state: AppState,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        test::init_service(App::new().app_data(Data::new(state)).configure(configure)).await
    }

    #[actix_web::test]
    async fn produto_lifecycle_over_http() {
        let app = app(test_state().await).await;

        let req = test::TestRequest::post()
            .uri("/produtos")
            .set_json(json!({ "nome": "Mouse", "preco": 29.90, "quantidade": 10 }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(res).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["preco"], 29.9);
        assert_eq!(created["quantidade"], 10);

        let req = test::TestRequest::get().uri("/produtos/1").to_request();
        let fetched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched, created);

        tokio::time::sleep(Duration::from_millis(2)).await;
        let req = test::TestRequest::put()
            .uri("/produtos/1")
            .set_json(json!({ "nome": "Mouse", "preco": 25.00, "quantidade": 5 }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated: Value = test::read_body_json(res).await;
        assert_eq!(updated["id"], 1);
        assert_eq!(updated["preco"], 25.0);
        assert_eq!(updated["quantidade"], 5);
        assert_ne!(updated["updatedAt"], created["updatedAt"]);

        let req = test::TestRequest::delete().uri("/produtos/1").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({ "message": "Produto com id 1 excluído com sucesso." }));

        let req = test::TestRequest::get().uri("/produtos/1").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["details"], "Produto com id 1 não encontrado.");
    }

    #[actix_web::test]
    async fn blank_nome_is_unprocessable() {
        let app = app(test_state().await).await;

        let req = test::TestRequest::post()
            .uri("/produtos")
            .set_json(json!({ "nome": "", "preco": 10, "quantidade": 1 }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["statusCode"], 422);
        assert_eq!(body["message"], "Erro de validação");
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("nome é obrigatório"));
    }

    #[actix_web::test]
    async fn every_violation_is_reported() {
        let app = app(test_state().await).await;

        let req = test::TestRequest::put()
            .uri("/produtos/1")
            .set_json(json!({ "preco": -1, "quantidade": -1 }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(res).await;
        let details = body["details"].as_str().unwrap();
        assert!(details.contains("nome é obrigatório"));
        assert!(details.contains("preço não pode ser menor que zero"));
        assert!(details.contains("quantidade não pode ser menor que zero"));
        assert_eq!(body["violations"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn missing_ids_are_not_found_for_update_and_delete() {
        let app = app(test_state().await).await;

        let req = test::TestRequest::put()
            .uri("/produtos/9")
            .set_json(json!({ "nome": "Mouse", "preco": 1, "quantidade": 1 }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete().uri("/produtos/9").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Erro ao excluir o produto.");
    }

    #[actix_web::test]
    async fn malformed_requests_use_the_error_envelope() {
        let app = app(test_state().await).await;

        let req = test::TestRequest::post()
            .uri("/produtos")
            .insert_header(header::ContentType::json())
            .set_payload("{\"nome\": \"Mouse\", \"preco\": \"caro\"}")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Requisição inválida.");

        let req = test::TestRequest::get().uri("/produtos/abc").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn list_is_newest_first_and_filterable() {
        let app = app(test_state().await).await;
        for nome in ["Mouse", "Teclado", "Mousepad"] {
            let req = test::TestRequest::post()
                .uri("/produtos")
                .set_json(json!({ "nome": nome, "preco": 1, "quantidade": 1 }))
                .to_request();
            test::call_service(&app, req).await;
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        let req = test::TestRequest::get().uri("/produtos").to_request();
        let all: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        let nomes: Vec<&str> = all.iter().map(|p| p["nome"].as_str().unwrap()).collect();
        assert_eq!(nomes, ["Mousepad", "Teclado", "Mouse"]);

        let req = test::TestRequest::get().uri("/produtos?nome=mouse").to_request();
        let some: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(some.len(), 2);
    }

    #[actix_web::test]
    async fn usuarios_are_created_and_listed() {
        let app = app(test_state().await).await;

        let req = test::TestRequest::post()
            .uri("/usuarios")
            .set_json(json!({ "nome": "Ana", "email": "ana@example.com" }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let ana: Value = test::read_body_json(res).await;
        assert_eq!(ana["id"], 1);

        let req = test::TestRequest::get().uri("/usuarios").to_request();
        let all: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all, json!([{ "id": 1, "nome": "Ana", "email": "ana@example.com" }]));
    }

    #[actix_web::test]
    async fn cors_admits_only_configured_origins() {
        let config = Config::from_lookup(|_| None).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(cors(&config))
                .app_data(Data::new(test_state().await))
                .configure(configure),
        )
        .await;

        let preflight = |origin: &str| {
            test::TestRequest::default()
                .method(Method::OPTIONS)
                .uri("/produtos")
                .insert_header((header::ORIGIN, origin.to_owned()))
                .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "PUT"))
                .to_request()
        };

        let res = test::call_service(&app, preflight("http://localhost:3000")).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );

        let res = test::try_call_service(&app, preflight("http://evil.example")).await;
        let allowed = res
            .ok()
            .and_then(|res| res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).cloned());
        assert!(allowed.is_none());
    }

    #[actix_web::test]
    async fn store_failure_is_unprocessable_with_the_store_message() {
        let state = test_state().await;
        let app = app(state.clone()).await;
        state.db_pool.close().await;

        let req = test::TestRequest::get().uri("/produtos").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["statusCode"], 422);
        assert_eq!(body["message"], "Erro ao buscar produtos.");
        assert_eq!(body["details"], sqlx::Error::PoolClosed.to_string());
    }

    #[actix_web::test]
    async fn health_reports_ok() {
        let app = app(test_state().await).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "status": "ok" }));
    }
}
