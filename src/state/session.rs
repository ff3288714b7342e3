use crate::blog::{SessionID, User};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone)]
pub struct Session {
    pub for_username: String,
    pub csrf_token: String,
    pub expires_at: std::time::Instant,
}

/// Who is making the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentUser {
    Anonymous,
    Authenticated {
        username: String,
        csrf_token: String,
    },
}

impl Session {
    pub fn is_valid(&self) -> bool {
        std::time::Instant::now() < self.expires_at
    }
}

impl CurrentUser {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, CurrentUser::Authenticated { .. })
    }

    /// Whether this is the given user; never true for anonymous requests
    pub fn is(&self, user: &User) -> bool {
        self.username() == Some(user.username.as_str())
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            CurrentUser::Anonymous => None,
            CurrentUser::Authenticated { username, .. } => Some(username),
        }
    }

    pub fn csrf_token(&self) -> Option<&str> {
        match self {
            CurrentUser::Anonymous => None,
            CurrentUser::Authenticated { csrf_token, .. } => Some(csrf_token),
        }
    }
}

impl super::State {
    pub async fn get_session(&self, session_id: &SessionID) -> Option<Session> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(session_id)?;

        session.is_valid().then(|| session.clone())
    }

    pub async fn create_session(
        &self,
        for_username: String,
        _auth: crate::auth::Auth,
    ) -> SessionID {
        let session_id: SessionID =
            crate::blog::get_random_hex_string::<{ crate::blog::SESSION_ID_BYTES }>();
        let new_session = Session {
            for_username,
            csrf_token: crate::blog::get_random_hex_string::<{ crate::blog::CSRF_TOKEN_BYTES }>(),
            expires_at: std::time::Instant::now() + crate::blog::SESSION_TTL,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, session| session.is_valid());
        sessions.insert(session_id.clone(), new_session);

        session_id
    }

    pub async fn remove_session(&self, session_id: &SessionID) -> Option<Session> {
        self.sessions.write().await.remove(session_id)
    }

    pub async fn current_user(&self, jar: &CookieJar) -> CurrentUser {
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return CurrentUser::Anonymous;
        };

        match self.get_session(&cookie.value().to_owned()).await {
            Some(session) => CurrentUser::Authenticated {
                username: session.for_username,
                csrf_token: session.csrf_token,
            },
            None => CurrentUser::Anonymous,
        }
    }

    pub fn session_cookie(&self, session_id: SessionID) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, session_id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .build()
    }
}
