use crate::blog::{Comment, Group, Post, PostID, User};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("error accessing {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("error (de)serializing {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// JSON files on disk, one folder per kind of record
#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    // serializes read-modify-write of comments.json
    comment_lock: Mutex<()>,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Store {
        Store {
            root: root.into(),
            comment_lock: Mutex::new(()),
        }
    }

    pub fn logins_path(&self) -> PathBuf {
        self.root.join("logins.txt")
    }

    pub fn post_path(&self, post_id: &PostID) -> PathBuf {
        self.root.join("post").join(post_id)
    }

    pub fn image_path(&self, post_id: &PostID, image_name: &str) -> PathBuf {
        self.post_path(post_id).join("image").join(image_name)
    }

    pub fn thumb_path(&self, post_id: &PostID, geometry: &str, image_name: &str) -> PathBuf {
        self.post_path(post_id)
            .join("image")
            .join("thumb")
            .join(geometry)
            .join(image_name)
    }

    pub async fn post(&self, post_id: &PostID) -> Result<Option<Post>, StoreError> {
        if !crate::blog::is_valid_post_id(post_id) {
            return Ok(None);
        }
        read_json(&self.post_path(post_id).join("meta.json")).await
    }

    pub async fn user(&self, username: &str) -> Result<Option<User>, StoreError> {
        if !crate::blog::is_valid_name(username) {
            return Ok(None);
        }
        read_json(&self.root.join("user").join(format!("{username}.json"))).await
    }

    pub async fn group(&self, slug: &str) -> Result<Option<Group>, StoreError> {
        if !crate::blog::is_valid_name(slug) {
            return Ok(None);
        }
        read_json(&self.root.join("group").join(format!("{slug}.json"))).await
    }

    /// Comments in the order they were added
    pub async fn comments(&self, post_id: &PostID) -> Result<Vec<Comment>, StoreError> {
        if !crate::blog::is_valid_post_id(post_id) {
            return Ok(Vec::new());
        }
        Ok(read_json(&self.post_path(post_id).join("comments.json"))
            .await?
            .unwrap_or_default())
    }

    pub async fn add_comment(&self, post_id: &PostID, comment: Comment) -> Result<(), StoreError> {
        let path = self.post_path(post_id).join("comments.json");

        let _guard = self.comment_lock.lock().await;
        let mut comments: Vec<Comment> = read_json(&path).await?.unwrap_or_default();
        comments.push(comment);

        write_json(&path, &comments).await
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let file = match tokio::fs::read(path).await {
        Ok(it) => it,
        Err(err) => {
            if err.kind() == std::io::ErrorKind::NotFound {
                return Ok(None);
            }
            return Err(StoreError::Io {
                path: path.to_owned(),
                source: err,
            });
        }
    };

    serde_json::from_slice(&file)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_owned(),
            source,
        })
}

/// Writes beside the target and renames over it, so readers never see a
/// half-written file
async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(value).map_err(|source| StoreError::Json {
        path: path.to_owned(),
        source,
    })?;

    let mut temp_name = path.file_name().unwrap_or_default().to_owned();
    temp_name.push(format!(
        ".{}.tmp",
        crate::blog::get_random_hex_string::<8>()
    ));
    let temp_path = path.with_file_name(temp_name);

    tokio::fs::write(&temp_path, bytes)
        .await
        .map_err(|source| StoreError::Io {
            path: temp_path.clone(),
            source,
        })?;
    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_owned(),
            source,
        })
}

#[cfg(test)]
impl Store {
    pub async fn write_post(&self, post: &Post) -> Result<(), StoreError> {
        let post_path = self.post_path(&post.id);
        create_dir_all(&post_path).await?;
        write_json(&post_path.join("meta.json"), post).await
    }

    pub async fn write_user(&self, user: &User) -> Result<(), StoreError> {
        let user_path = self.root.join("user");
        create_dir_all(&user_path).await?;
        write_json(&user_path.join(format!("{}.json", user.username)), user).await
    }

    pub async fn write_group(&self, group: &Group) -> Result<(), StoreError> {
        let group_path = self.root.join("group");
        create_dir_all(&group_path).await?;
        write_json(&group_path.join(format!("{}.json", group.slug)), group).await
    }
}

#[cfg(test)]
async fn create_dir_all(path: &Path) -> Result<(), StoreError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| StoreError::Io {
            path: path.to_owned(),
            source,
        })
}
