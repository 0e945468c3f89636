use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::types::{
    ApiResponse, CreateExampleRequest, ExampleResponse, ExamplesResponse, MESSAGE_SUCCESS,
};
use crate::{ids::DataPrefix, router::AppState, service::ExampleError};

fn success<T>(status: StatusCode, data: T) -> impl IntoResponse
where
    T: serde::Serialize,
{
    (
        status,
        Json(ApiResponse::new(status.as_u16(), MESSAGE_SUCCESS, Some(data))),
    )
}

// Decoded by hand so every malformed body is a 400, whatever the content type.
fn parse_create_request(body: &Bytes) -> Result<CreateExampleRequest, ExampleError> {
    if body.is_empty() {
        return Err(ExampleError::InvalidInput(
            "request body is empty".to_string(),
        ));
    }

    let request: CreateExampleRequest = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Failed to decode create request");
        ExampleError::InvalidInput(format!("failed to decode request: {e}"))
    })?;

    if request.description.is_empty() {
        return Err(ExampleError::InvalidInput(
            "description must not be empty".to_string(),
        ));
    }

    Ok(request)
}

pub async fn create_example(
    state: State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ExampleError> {
    let request = parse_create_request(&body)?;

    let example = state.service.create_example(&request.description).await?;
    tracing::info!(id = %example.id, "Created example");

    Ok(success(StatusCode::CREATED, ExampleResponse { example }))
}

pub async fn get_examples(state: State<AppState>) -> Result<impl IntoResponse, ExampleError> {
    let examples = state.service.fetch_examples().await?;

    Ok(success(StatusCode::OK, ExamplesResponse { examples }))
}

pub async fn get_example_by_id(
    state: State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ExampleError> {
    if !DataPrefix::Example.is_valid(&id) {
        return Err(ExampleError::InvalidInput(format!(
            "malformed example id: {id}"
        )));
    }

    let example = state.service.get_example_by_id(&id).await?;

    Ok(success(StatusCode::OK, ExampleResponse { example }))
}
