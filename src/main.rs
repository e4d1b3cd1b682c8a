#[macro_use]
extern crate lazy_static;

use actix_files::{Files, NamedFile};
use actix_web::{
    http::{Method, StatusCode},
    middleware,
    web::{self, Data},
    App, Either, HttpResponse, HttpServer, Responder,
};
use log::info;
use sqlx::SqlitePool;
use tera::Tera;

mod config;
mod db;
mod errors;
mod pages;
mod produtos;
mod routes;
mod structs;
#[cfg(test)]
mod test_support;
mod usuarios;
mod utils;
mod validation;

use config::Config;

#[derive(Debug, Clone)]
pub struct AppState {
    db_pool: SqlitePool,
}

lazy_static! {
    pub static ref TEMPLATES: Tera = {
        let mut tera = match Tera::new("templates/**/*") {
            Ok(t) => t,
            Err(e) => {
                log::error!("Parsing error(s): {}", e);
                ::std::process::exit(1);
            }
        };
        tera.autoescape_on(vec![".html"]);
        tera.register_filter("brl", utils::brl_filter);
        tera
    };
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;
    let db_pool = db::connect(&config).await?;

    // Fail on broken templates at startup rather than on the first page view.
    lazy_static::initialize(&TEMPLATES);

    info!(
        "Starting HTTP server on http://{}:{}/ (CORS origins: {:?})",
        config.host, config.port, config.cors_origins
    );

    let bind = (config.host.clone(), config.port);
    let timeout = config.request_timeout;
    HttpServer::new(move || {
        App::new()
            // enable automatic response compression - usually register this first
            .wrap(middleware::Compress::default())
            .wrap(routes::cors(&config))
            // enable logger - always register Actix Web Logger middleware last
            .wrap(middleware::Logger::default())
            .service(Files::new("/static", "static"))
            .app_data(Data::new(AppState {
                db_pool: db_pool.clone(),
            }))
            .configure(routes::configure)
            .configure(pages::configure)
            .default_service(web::to(default_handler))
    })
    .client_request_timeout(timeout)
    .bind(bind)?
    .run()
    .await
}

async fn default_handler(req_method: Method) -> Result<impl Responder, std::io::Error> {
    match req_method {
        Method::GET => {
            let file = NamedFile::open("static/404.html")?
                .customize()
                .with_status(StatusCode::NOT_FOUND);
            Ok(Either::Left(file))
        }
        _ => Ok(Either::Right(HttpResponse::MethodNotAllowed().finish())),
    }
}
