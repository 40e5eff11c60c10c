use std::sync::Arc;

use aide::axum::ApiRouter;
use aide::openapi::OpenApi;
use axum::{Extension, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::database::AppState;
use crate::docs;
use crate::error::ServiceError;

pub mod data;
pub mod entities;
pub mod index;


/// All api routes, documented and with cors enabled for every origin.
pub fn app(app_state: AppState) -> Router {
    let mut api = OpenApi::default();

    ApiRouter::new()
        .merge(index::router())
        .merge(data::router(app_state.clone()))
        .merge(entities::router(app_state))
        .nest_api_service("/docs", docs::docs_routes())
        .finish_api_with(&mut api, docs::api_docs)
        .fallback(|| async { ServiceError::NotFound })
        .layer(Extension(Arc::new(api)))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
