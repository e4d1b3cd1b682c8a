use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use sqlx::{migrate::MigrateError, Error as SqlxError};
use thiserror::Error;

/// A single broken field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    Validation(Vec<Violation>),

    #[error("{context}")]
    NotFound { context: &'static str, id: i64 },

    #[error("{context}")]
    Persistence {
        context: &'static str,
        #[source]
        source: SqlxError,
    },

    #[error("Requisição inválida.")]
    Payload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] MigrateError),
}

impl AppError {
    /// Wraps a store failure with the operation that triggered it.
    pub fn persistence(context: &'static str) -> impl FnOnce(SqlxError) -> Self {
        move |source| {
            log::error!("{} {}", context, source);
            AppError::Persistence { context, source }
        }
    }

    /// Human-readable description of what went wrong, shown to API clients
    /// and rendered next to forms.
    pub fn details(&self) -> String {
        match self {
            AppError::Validation(violations) => violations
                .iter()
                .map(|v| v.message.as_str())
                .collect::<Vec<_>>()
                .join(" "),
            AppError::NotFound { id, .. } => format!("Produto com id {} não encontrado.", id),
            AppError::Persistence { source, .. } => source.to_string(),
            AppError::Payload(details) => details.clone(),
            AppError::Config(details) => details.clone(),
            AppError::Template(_) | AppError::Io(_) | AppError::Migrate(_) => {
                "Erro interno do servidor.".to_owned()
            }
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            AppError::Validation(violations) => violations,
            _ => &[],
        }
    }
}

/// JSON error envelope returned by every failing API call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
    pub details: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Persistence { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Payload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Migrate(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            status_code: status.as_u16(),
            message: self.to_string(),
            details: self.details(),
            violations: self.violations().to_vec(),
        })
    }
}

impl From<AppError> for std::io::Error {
    fn from(err: AppError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
    }
}
