use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
}

/// Static username/password pairs compared verbatim.
#[derive(Debug, Clone)]
pub struct AllowList {
    credentials: Vec<(String, String)>,
}

impl Default for AllowList {
    fn default() -> Self {
        AllowList::from_pairs(&[
            ("admin", "password123"),
            ("manager", "schedule456"),
            ("supervisor", "team789"),
        ])
    }
}

impl AllowList {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        AllowList {
            credentials: pairs
                .iter()
                .map(|(user, pass)| (user.to_string(), pass.to_string()))
                .collect(),
        }
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.credentials
            .iter()
            .any(|(user, pass)| user == username && pass == password)
    }
}

/// An authenticated user. Handed to the renderer only, never to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub username: String,
}

impl Session {
    pub fn logout(self) {
        tracing::info!(session = %self.id, username = %self.username, "logged out");
    }
}

pub fn login(allow_list: &AllowList, username: &str, password: &str) -> Result<Session, AuthError> {
    if !allow_list.verify(username, password) {
        tracing::warn!(username, "login rejected");
        return Err(AuthError::InvalidCredentials);
    }

    let session = Session {
        id: Uuid::new_v4(),
        username: username.to_string(),
    };
    tracing::info!(session = %session.id, username, "logged in");
    Ok(session)
}
