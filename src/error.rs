use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::schemas::{MemberName, ValidationError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Couldn't find the group '{0}'")]
    GroupNotFound(String),
    #[error("A group with id '{0}' already exists")]
    GroupExists(String),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("'{0}' doesn't owe anything in this group")]
    NothingOwed(MemberName),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::GroupExists(_) | ApiError::NothingOwed(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
