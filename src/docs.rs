use std::sync::Arc;

use aide::{
    axum::{
        routing::{get, get_with},
        ApiRouter, IntoApiResponse,
    },
    openapi::{OpenApi, Tag},
    redoc::Redoc,
    transform::TransformOpenApi,
};
use axum::{response::IntoResponse, Extension, Json};

pub fn api_docs(api: TransformOpenApi) -> TransformOpenApi {
    api.title("Café Management System API")
        .summary("Create and list the business data of a café")
        .tag(Tag {
            name: "data".into(),
            description: Some("Generic read access to every table".into()),
            ..Default::default()
        })
        .tag(Tag {
            name: "entities".into(),
            description: Some("Creation of categories, customers, orders and friends".into()),
            ..Default::default()
        })
}

pub fn docs_routes() -> ApiRouter {
    // Redoc serves html, so the response type has to be inferred here.
    aide::gen::infer_responses(true);

    let router = ApiRouter::new()
        .api_route(
            "/",
            get_with(
                Redoc::new("/docs/api.json")
                    .with_title("cafe-api")
                    .axum_handler(),
                |op| op.description("This documentation page."),
            ),
        )
        .route("/api.json", get(serve_docs));

    // Inference might be incorrect for the other routes.
    aide::gen::infer_responses(false);

    router
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
    Json(api.as_ref()).into_response()
}
