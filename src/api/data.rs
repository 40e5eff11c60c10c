use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use crate::database::AppState;
use crate::error::{ServiceError, ServiceResult};
use crate::models::Entity;

pub fn router(app_state: AppState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/getData/:table", get_with(get_data, get_data_docs))
        .with_state(app_state)
}

pub async fn get_data(
    State(app_state): State<AppState>,
    Path(table): Path<String>,
) -> ServiceResult<Json<Vec<Value>>> {
    let entity = Entity::from_table_name(&table)
        .ok_or_else(|| ServiceError::BadRequest(format!("Unknown table '{table}'")))?;

    let mut db = app_state.connection().await?;
    let rows = db.get_all_rows(entity).await?;

    Ok(Json(rows))
}

fn get_data_docs(op: TransformOperation) -> TransformOperation {
    op.description("List all rows of a table.")
        .tag("data")
        .response::<200, Json<Vec<Value>>>()
        .response_with::<400, Json<Value>, _>(|res| {
            res.description("The requested table does not exist!")
        })
}
