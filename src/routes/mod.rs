use crate::state::State;
use std::sync::Arc;

mod media;
mod page;
mod session;

pub fn app(state: Arc<State>) -> axum::Router {
    axum::Router::new()
        .merge(page::route())
        .nest("/media", media::route())
        .nest("/auth", session::route())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::blog::{Group, Post, User};
    use crate::config::Config;
    use crate::state::State;
    use axum::response::Response;
    use http_body_util::BodyExt;
    use std::sync::Arc;

    pub(crate) const POST_ID: &str = "0abc";

    /// A throwaway store holding one post by `auth` in group `test-slug`,
    /// plus a second user `auth2`
    pub(crate) struct TestApp {
        _dir: tempfile::TempDir,
        pub state: Arc<State>,
    }

    impl TestApp {
        pub async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let config = Config {
                store_path: dir.path().to_owned(),
                bind_addr: ([127, 0, 0, 1], 0).into(),
                log_filter: String::from("error"),
                secure_cookies: false,
            };
            let state = Arc::new(State::new(&config));
            let store = &state.store;

            store
                .write_user(&User {
                    username: String::from("auth"),
                    name: String::from("Test Author"),
                    posts: vec![String::from(POST_ID)],
                })
                .await
                .unwrap();
            store
                .write_user(&User {
                    username: String::from("auth2"),
                    name: String::new(),
                    posts: Vec::new(),
                })
                .await
                .unwrap();
            store
                .write_group(&Group {
                    slug: String::from("test-slug"),
                    title: String::from("Test Group"),
                    description: String::from("Test group description"),
                })
                .await
                .unwrap();

            let mut post = crate::store::tests::post(POST_ID, "auth");
            post.group = Some(String::from("test-slug"));
            store.write_post(&post).await.unwrap();

            TestApp { _dir: dir, state }
        }

        pub fn router(&self) -> axum::Router {
            super::app(self.state.clone())
        }

        /// Returns the session id and its CSRF token
        pub async fn login(&self, username: &str) -> (String, String) {
            let session_id = self
                .state
                .create_session(username.to_owned(), crate::auth::Auth::for_tests())
                .await;
            let csrf_token = self
                .state
                .get_session(&session_id)
                .await
                .unwrap()
                .csrf_token;

            (session_id, csrf_token)
        }

        pub async fn update_post(&self, update: impl FnOnce(&mut Post)) {
            let post_id = String::from(POST_ID);
            let mut post = self.state.store.post(&post_id).await.unwrap().unwrap();
            update(&mut post);
            self.state.store.write_post(&post).await.unwrap();
        }

        pub async fn set_post_image(&self, image_name: &str) {
            self.update_post(|post| post.image = Some(image_name.to_owned()))
                .await;
        }

        pub async fn add_post_image(&self, image_name: &str) {
            let image_path = self.state.store.image_path(&String::from(POST_ID), image_name);
            std::fs::create_dir_all(image_path.parent().unwrap()).unwrap();
            image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 2))
                .save(&image_path)
                .unwrap();

            self.set_post_image(image_name).await;
        }

        pub fn write_logins(&self, username: &str, password: &str) {
            let hash = crate::auth::tests::hash_password(password);
            std::fs::write(
                self.state.store.logins_path(),
                format!("{username}\t{hash}\n"),
            )
            .unwrap();
        }
    }

    pub(crate) async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
