use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use utoipa::OpenApi;

use crate::api::rest::{handlers, openapi::ChatApiDoc};
use crate::domain::service::Service;

pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    // Rendered once; the document does not change at runtime
    let doc = serde_json::to_value(ChatApiDoc::openapi())?;

    let router = router
        // POST /users - Create a superuser
        .route("/users", post(handlers::create_superuser))
        // GET /conversations - List conversations
        .route("/conversations", get(handlers::list_conversations))
        // GET /conversations/{id} - Get a specific conversation
        .route("/conversations/{id}", get(handlers::get_conversation))
        // GET /conversations/{id}/messages - List messages of a conversation
        .route(
            "/conversations/{id}/messages",
            get(handlers::list_messages),
        )
        // GET /openapi.json - API document
        .route(
            "/openapi.json",
            get(move || {
                let doc = doc.clone();
                async move { Json(doc) }
            }),
        )
        .layer(Extension(service));

    Ok(router)
}
