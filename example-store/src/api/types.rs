use serde::{Deserialize, Serialize};

use crate::models::Example;

pub const MESSAGE_SUCCESS: &str = "success";
pub const MESSAGE_BAD_REQUEST: &str = "bad request";
pub const MESSAGE_NOT_FOUND: &str = "not found";
pub const MESSAGE_INTERNAL_ERROR: &str = "internal server error";

/// Every response body, success or failure, has this shape. `code` repeats the HTTP status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn new(code: u16, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateExampleRequest {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExampleResponse {
    pub example: Example,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExamplesResponse {
    pub examples: Vec<Example>,
}
