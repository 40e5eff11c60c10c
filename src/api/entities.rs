use aide::axum::routing::{post_with, ApiMethodRouter};
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use aide::OperationOutput;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Map, Value};

use crate::database::AppState;
use crate::error::ServiceResult;
use crate::models::Entity;

/// One `POST /add<Entity>` route per entity kind.
pub fn router(app_state: AppState) -> ApiRouter {
    Entity::ALL
        .into_iter()
        .fold(ApiRouter::new(), |router, entity| {
            router.api_route(entity.spec().create_path, create_route(entity))
        })
        .with_state(app_state)
}

/// Response with status `201 Created`.
pub struct Created<T>(pub T);

impl<T: IntoResponse> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, self.0).into_response()
    }
}

impl<T: OperationOutput> OperationOutput for Created<T> {
    type Inner = T::Inner;
}

type JsonBody = Result<Json<Map<String, Value>>, JsonRejection>;

fn create_route(entity: Entity) -> ApiMethodRouter<AppState> {
    post_with(
        move |State(app_state): State<AppState>, body: JsonBody| async move {
            create_entity(entity, app_state, body).await
        },
        move |op| create_entity_docs(op, entity),
    )
}

/// Validate the body, insert exactly one row and return it.
pub async fn create_entity(
    entity: Entity,
    app_state: AppState,
    body: JsonBody,
) -> ServiceResult<Created<Json<Value>>> {
    let Json(body) = body?;
    let spec = entity.spec();
    let statement = spec.insert_statement(&body)?;

    let mut db = app_state.connection().await?;
    let row = db.insert_row(spec, statement).await?;

    Ok(Created(Json(row)))
}

fn create_entity_docs(op: TransformOperation, entity: Entity) -> TransformOperation {
    let spec = entity.spec();
    op.description(&format!("Create a row in `{}`.", spec.table))
        .tag("entities")
        .response_with::<201, Json<Value>, _>(|res| res.description("The inserted row."))
        .response_with::<400, Json<Value>, _>(|res| res.description(spec.missing_message))
        .response_with::<500, Json<Value>, _>(|res| {
            res.description("The database rejected the row!")
        })
}
