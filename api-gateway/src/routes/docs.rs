//! API documentation: a Swagger UI page and the OpenAPI document it renders.

use axum::http::header;
use axum::response::{Html, IntoResponse};

const SWAGGER_HTML: &str = include_str!("../../static/swagger-ui.html");
const OPENAPI_YAML: &str = include_str!("../../static/openapi.yaml");

/// `GET /docs`
pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_HTML)
}

/// `GET /docs/openapi.yaml`
pub async fn openapi_spec() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/yaml")], OPENAPI_YAML)
}
