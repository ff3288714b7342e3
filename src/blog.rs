use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub type PostID = String;
pub type CommentID = String;
pub type SessionID = String;
pub type GroupSlug = String;

pub const POST_ID_BYTES: usize = 16;
pub const COMMENT_ID_BYTES: usize = 16;
pub const SESSION_ID_BYTES: usize = 32;
pub const CSRF_TOKEN_BYTES: usize = 32;

pub const SESSION_TTL: std::time::Duration = std::time::Duration::from_secs(60 * 60 * 24);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// Full name, empty when the user never set one
    #[serde(default)]
    pub name: String,
    // in chronological order
    #[serde(default)]
    pub posts: Vec<PostID>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub slug: GroupSlug,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: PostID,
    pub text: String,
    pub pub_date: chrono::DateTime<chrono::Utc>,
    pub author_username: String,
    #[serde(default)]
    pub group: Option<GroupSlug>,
    /// File name inside the post's `image` folder
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentID,
    pub author_username: String,
    pub text: String,
    pub created: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn full_name(&self) -> Option<&str> {
        let name = self.name.trim();
        (!name.is_empty()).then_some(name)
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }
}

pub fn get_random_hex_string<const LEN: usize>() -> String {
    let mut bytes = [0u8; LEN];
    rand_chacha::ChaCha20Rng::from_entropy().fill_bytes(&mut bytes);

    bytes.iter().fold(String::new(), |mut output, b| {
        let _ = write!(output, "{b:02x}");
        output
    })
}

pub fn is_valid_post_id(post_id: &str) -> bool {
    !post_id.is_empty()
        && post_id.len() <= POST_ID_BYTES * 2
        && post_id
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Usernames and group slugs share the same alphabet
pub fn is_valid_name(name: &str) -> bool {
    static NAME_PATTERN: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();

    let name_pattern = NAME_PATTERN.get_or_init(|| {
        regex::Regex::new(r"^[a-zA-Z0-9-_]+$").expect("constant pattern should parse")
    });

    name_pattern.is_match(name)
}
