use crate::blog::PostID;
use crate::error::Error;
use crate::state::{NestedRouter, SharedState};
use crate::store::StoreError;
use crate::thumbnail::Geometry;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;
use tokio_util::io::ReaderStream;

#[derive(Debug, Deserialize)]
pub(super) struct ImageQueryOptions {
    #[serde(default)]
    pub thumb: Option<String>,
}

pub fn route() -> NestedRouter {
    let image_compression_layer = tower_http::compression::CompressionLayer::new()
        .br(true)
        .quality(tower_http::CompressionLevel::Best);

    axum::Router::new().route(
        "/post/:id/:img",
        get(get_image).layer(image_compression_layer),
    )
}

pub(super) async fn get_image(
    State(state): SharedState,
    Path((post_id, image)): Path<(PostID, String)>,
    Query(options): Query<ImageQueryOptions>,
) -> Result<Response, Error> {
    if !crate::blog::is_valid_post_id(&post_id) || !crate::thumbnail::is_valid_image_name(&image)
    {
        return Err(Error::NotFound);
    }

    let image_file_path = match options.thumb {
        Some(geometry) => {
            let geometry = Geometry::parse(&geometry).map_err(|_| Error::NotFound)?;
            state
                .store
                .thumb_path(&post_id, &geometry.to_string(), &image)
        }
        None => state.store.image_path(&post_id, &image),
    };

    let file = match tokio::fs::File::open(&image_file_path).await {
        Ok(it) => it,
        Err(err) => {
            if err.kind() == std::io::ErrorKind::NotFound {
                return Err(Error::NotFound);
            }
            return Err(StoreError::Io {
                path: image_file_path,
                source: err,
            }
            .into());
        }
    };
    let body = Body::from_stream(ReaderStream::new(file));

    if let Some(mime_guess) = new_mime_guess::from_path(&image_file_path).first() {
        Ok(([("Content-Type", mime_guess.to_string())], body).into_response())
    } else {
        Ok(body.into_response())
    }
}
