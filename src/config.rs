use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_STORE_PATH: &str = "./store";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8010";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct Config {
    pub store_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub log_filter: String,
    pub secure_cookies: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BLOG_BIND_ADDR {value:?} is not a socket address: {source}")]
    BindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("BLOG_SECURE_COOKIES {0:?} is not `true` or `false`")]
    SecureCookies(String),
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store_path = lookup("BLOG_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));

        let bind_addr = lookup("BLOG_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr: SocketAddr = bind_addr
            .parse()
            .map_err(|source| ConfigError::BindAddr {
                value: bind_addr.clone(),
                source,
            })?;

        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned());

        let secure_cookies = match lookup("BLOG_SECURE_COOKIES").as_deref() {
            None | Some("false") => false,
            Some("true") => true,
            Some(other) => return Err(ConfigError::SecureCookies(other.to_owned())),
        };

        Ok(Config {
            store_path,
            bind_addr,
            log_filter,
            secure_cookies,
        })
    }
}
