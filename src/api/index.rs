use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;

pub const GREETING: &str = "Welcome to Café Management System API";

pub fn router() -> ApiRouter {
    ApiRouter::new().api_route("/", get_with(index, index_docs))
}

async fn index() -> String {
    GREETING.to_owned()
}

fn index_docs(op: TransformOperation) -> TransformOperation {
    op.description("Greeting of the api.")
        .tag("index")
        .response::<200, String>()
}
