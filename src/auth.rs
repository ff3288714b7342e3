use crate::store::Store;
use argon2::PasswordVerifier;
use std::collections::HashMap;
use tokio::io::AsyncBufReadExt;

// dummy unit tuple so `Auth`s can't be instantiated outside of this file
pub struct Auth(());

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("error reading logins: {0}")]
    Io(#[from] std::io::Error),
    #[error("error verifying password hash: {0}")]
    Hash(argon2::password_hash::Error),
    #[error("password check failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

async fn read_logins(store: &Store) -> std::io::Result<HashMap<String, String>> {
    let file = tokio::fs::File::open(store.logins_path()).await?;
    let reader = tokio::io::BufReader::new(file);
    let mut reader = reader.lines();

    let mut logins = HashMap::new();
    while let Some(line) = reader.next_line().await? {
        let (username, hash) = match line.split_once('\t') {
            Some(pair) => pair,
            None => continue,
        };
        logins.insert(String::from(username), String::from(hash));
    }

    Ok(logins)
}

fn verify_password(password: &str, hash: &str) -> argon2::password_hash::Result<bool> {
    let hash = argon2::password_hash::PasswordHash::new(hash)?;

    match argon2::Argon2::default().verify_password(password.as_bytes(), &hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(err),
    }
}

impl Auth {
    /// `Ok(Some(Auth))` if valid, `Ok(None)` if invalid, `Err` if logins.txt
    /// could not be read/argon2 verifying failed
    pub async fn validate(
        store: &Store,
        username: &str,
        password: String,
    ) -> Result<Option<Auth>, AuthError> {
        let logins_file = read_logins(store).await?;

        let Some(hash) = logins_file.get(username).cloned() else {
            return Ok(None);
        };

        let password_is_valid =
            tokio::task::spawn_blocking(move || verify_password(&password, &hash))
                .await?
                .map_err(AuthError::Hash)?;

        if password_is_valid {
            Ok(Some(Auth(())))
        } else {
            Ok(None)
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Auth {
        Auth(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use argon2::PasswordHasher;
    use rand::SeedableRng;

    pub(crate) fn hash_password(password: &str) -> String {
        let salt = argon2::password_hash::SaltString::generate(
            &mut rand_chacha::ChaCha20Rng::from_entropy(),
        );

        argon2::Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    fn store_with_logins(dir: &tempfile::TempDir, logins: &str) -> Store {
        std::fs::write(dir.path().join("logins.txt"), logins).unwrap();
        Store::new(dir.path())
    }

    #[tokio::test]
    async fn correct_password_validates() {
        let dir = tempfile::tempdir().unwrap();
        let logins = format!("auth\t{}\n", hash_password("hunter2"));
        let store = store_with_logins(&dir, &logins);

        let auth = Auth::validate(&store, "auth", String::from("hunter2"))
            .await
            .unwrap();
        assert!(auth.is_some());
    }

    #[tokio::test]
    async fn wrong_password_or_user_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let logins = format!("malformed line\nauth\t{}", hash_password("hunter2"));
        let store = store_with_logins(&dir, &logins);

        assert!(Auth::validate(&store, "auth", String::from("wrong"))
            .await
            .unwrap()
            .is_none());
        assert!(Auth::validate(&store, "nobody", String::from("hunter2"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn broken_hash_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_logins(&dir, "auth\tnot-a-hash\n");

        assert!(matches!(
            Auth::validate(&store, "auth", String::from("x")).await,
            Err(AuthError::Hash(_))
        ));
    }

    #[tokio::test]
    async fn missing_logins_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());

        assert!(matches!(
            Auth::validate(&store, "auth", String::from("x")).await,
            Err(AuthError::Io(_))
        ));
    }
}
