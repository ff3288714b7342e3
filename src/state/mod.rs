use crate::blog::SessionID;
use crate::store::Store;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub mod session;

pub type SharedState = axum::extract::State<Arc<State>>;
pub type NestedRouter = axum::Router<Arc<State>>;

#[derive(Debug)]
pub struct State {
    pub store: Store,
    pub sessions: RwLock<HashMap<SessionID, session::Session>>,
    pub secure_cookies: bool,
}

impl State {
    pub fn new(config: &crate::config::Config) -> State {
        State {
            store: Store::new(&config.store_path),
            sessions: RwLock::new(HashMap::new()),
            secure_cookies: config.secure_cookies,
        }
    }
}
