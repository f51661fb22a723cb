use rocket::{
    Request,
    http::Status,
    response::{self, Responder},
    serde::json::Json,
};
use sweep_common::protocol::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("No game found")]
    NotFound,
    #[error("Cannot auto reveal")]
    CannotAutoReveal,
    #[error("Cell ({row}, {col}) is out of bounds")]
    OutOfBounds { row: usize, col: usize },
    #[error("Invalid game parameters: {0}")]
    InvalidParams(String),
    #[error("Too many games created, try again later")]
    RateLimited,
}

pub type Result<T> = std::result::Result<T, GameError>;

impl GameError {
    pub fn status(&self) -> Status {
        match self {
            Self::NotFound => Status::NotFound,
            Self::RateLimited => Status::TooManyRequests,
            Self::CannotAutoReveal | Self::OutOfBounds { .. } | Self::InvalidParams(_) => {
                Status::BadRequest
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for GameError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).respond_to(request)
    }
}
