// Server related imports
use axum::{extract::Json, http::StatusCode, response::IntoResponse};

// General imports
use serde::Serialize;

use crate::error::ServerError;

// from https://github.com/EricLBuehler/candle-vllm/blob/master/src/openai/responses.rs#L117
pub trait ErrorToResponse: Serialize {
    fn to_response(&self, code: StatusCode) -> axum::response::Response {
        let mut r = Json(self).into_response();
        *r.status_mut() = code;
        r
    }
}

#[derive(Serialize)]
pub struct JsonError {
    message: String,
}

impl JsonError {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl ErrorToResponse for JsonError {}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let code = self.status_code();
        tracing::error!("Request failed with {code}: {self}");
        JsonError::new(self.to_string()).to_response(code)
    }
}
