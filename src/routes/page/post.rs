use crate::blog::{Comment, Group, Post, PostID, User};
use crate::error::Error;
use crate::page::post::{CommentForm, PostDetailContext};
use crate::page::urls;
use crate::state::session::CurrentUser;
use crate::state::{SharedState, State};
use crate::thumbnail::{Thumbnail, ThumbnailOptions};
use axum::extract::Path;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

/// Everything loaded from the store for one post page
struct PostPage {
    post: Post,
    author: User,
    group: Option<Group>,
    thumbnail: Option<Thumbnail>,
    comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommentSubmission {
    #[serde(default)]
    csrfmiddlewaretoken: String,
    #[serde(default)]
    text: String,
}

pub(super) async fn get(
    axum::extract::State(state): SharedState,
    Path(post_id): Path<PostID>,
    jar: CookieJar,
) -> Result<Html<String>, Error> {
    let Some(post) = state.store.post(&post_id).await? else {
        return Err(Error::NotFound);
    };
    let user = state.current_user(&jar).await;

    let page = PostPage::load(&state, post).await?;
    page.render(&user, &CommentForm::default())
}

pub(super) async fn post_comment(
    axum::extract::State(state): SharedState,
    Path(post_id): Path<PostID>,
    jar: CookieJar,
    Form(submission): Form<CommentSubmission>,
) -> Result<Response, Error> {
    let Some(post) = state.store.post(&post_id).await? else {
        return Err(Error::NotFound);
    };

    let user = state.current_user(&jar).await;
    let CurrentUser::Authenticated {
        username,
        csrf_token,
    } = &user
    else {
        return Err(Error::Unauthorized);
    };
    if submission.csrfmiddlewaretoken != *csrf_token {
        tracing::warn!(%post_id, %username, "comment rejected: CSRF token mismatch");
        return Err(Error::Forbidden);
    }

    match CommentForm::bound(submission.text).validate() {
        Ok(text) => {
            let comment = Comment {
                id: crate::blog::get_random_hex_string::<{ crate::blog::COMMENT_ID_BYTES }>(),
                author_username: username.clone(),
                text,
                created: chrono::Utc::now(),
            };
            state.store.add_comment(&post.id, comment).await?;
            tracing::info!(%post_id, %username, "comment added");

            Ok(Redirect::to(&urls::post_detail(&post.id)).into_response())
        }
        Err(form) => {
            let page = PostPage::load(&state, post).await?;
            Ok(page.render(&user, &form)?.into_response())
        }
    }
}

impl PostPage {
    async fn load(state: &Arc<State>, post: Post) -> Result<Self, Error> {
        let Some(author) = state.store.user(&post.author_username).await? else {
            return Err(Error::MissingAuthor {
                post_id: post.id,
                username: post.author_username,
            });
        };

        let group = match post.group.as_deref() {
            Some(slug) => {
                let group = state.store.group(slug).await?;
                if group.is_none() {
                    tracing::warn!(post_id = %post.id, slug, "post refers to a missing group");
                }
                group
            }
            None => None,
        };

        let thumbnail = match post.image.clone() {
            Some(image_name) => load_thumbnail(state.clone(), post.id.clone(), image_name).await?,
            None => None,
        };

        let comments = state.store.comments(&post.id).await?;

        Ok(PostPage {
            post,
            author,
            group,
            thumbnail,
            comments,
        })
    }

    fn render(&self, user: &CurrentUser, form: &CommentForm) -> Result<Html<String>, Error> {
        let html = crate::page::post::render(&PostDetailContext {
            post: &self.post,
            author: &self.author,
            group: self.group.as_ref(),
            thumbnail: self.thumbnail.as_ref(),
            comments: &self.comments,
            form,
            user,
        })?;

        Ok(Html(html))
    }
}

/// A broken image leaves the page without a thumbnail rather than failing it
async fn load_thumbnail(
    state: Arc<State>,
    post_id: PostID,
    image_name: String,
) -> Result<Option<Thumbnail>, Error> {
    let thumbnail = tokio::task::spawn_blocking(move || {
        let result = crate::thumbnail::get_or_create(
            &state.store,
            &post_id,
            &image_name,
            &ThumbnailOptions::post_detail(),
        );
        if let Err(err) = &result {
            tracing::warn!(%post_id, %image_name, "error creating thumbnail: {err}");
        }
        result.ok()
    })
    .await?;

    Ok(thumbnail)
}
