use crate::state::NestedRouter;
use axum::routing::{get, post};

mod post;

pub fn route() -> NestedRouter {
    axum::Router::new()
        .route("/posts/:id", get(post::get))
        .route("/posts/:id/comment", post(post::post_comment))
}
