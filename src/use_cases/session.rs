use tracing::{info, warn};

use crate::domain::{
    ApiError, AttendanceApi, LoggedInUser, SESSION_BATCH_NAMES_KEY, SESSION_TOKEN_KEY,
    SESSION_USER_ID_KEY, SessionError, SessionStore, StoreError,
};

const DEFAULT_LOGIN_FAILURE: &str = "Login failed !";

// Every key the operator session owns.
const SESSION_KEYS: [&str; 3] = [
    SESSION_USER_ID_KEY,
    SESSION_BATCH_NAMES_KEY,
    SESSION_TOKEN_KEY,
];

// Login use case: authenticates the operator and records the session keys.
pub struct LoginUseCase<A, S> {
    pub api: A,
    pub store: S,
}

impl<A, S> LoginUseCase<A, S>
where
    A: AttendanceApi,
    S: SessionStore,
{
    #[tracing::instrument(name = "login", skip_all, fields(user_id = %user_id))]
    pub async fn execute(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<LoggedInUser, SessionError> {
        let user = self
            .api
            .login(user_id, password)
            .await
            .map_err(|e| match e {
                ApiError::Upstream { message, .. } => SessionError::LoginRejected(
                    message.unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string()),
                ),
                other => SessionError::Api(other),
            })?;

        let batch_names = encode_batch_names(&user.batch_names)?;
        self.store.set(SESSION_USER_ID_KEY, &user.user_id)?;
        self.store.set(SESSION_BATCH_NAMES_KEY, &batch_names)?;

        info!(batches = user.batch_names.len(), "operator logged in");
        Ok(user)
    }
}

// Logout use case: forgets every session key, including the active token.
pub struct LogoutUseCase<S> {
    pub store: S,
}

impl<S> LogoutUseCase<S>
where
    S: SessionStore,
{
    pub fn execute(&self) -> Result<(), SessionError> {
        for key in SESSION_KEYS {
            self.store.remove(key)?;
        }
        info!("operator logged out");
        Ok(())
    }
}

fn encode_batch_names(batch_names: &[String]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(batch_names)?)
}

/// Batch names recorded by the last login; missing or unreadable data yields none.
pub fn stored_batches<S: SessionStore + ?Sized>(store: &S) -> Vec<String> {
    let raw = match store.get(SESSION_BATCH_NAMES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "failed to read stored batch names");
            return Vec::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(error = %e, "stored batch names are not a JSON list");
        Vec::new()
    })
}

/// Resolves the batch to work on: an explicit choice wins, else the first stored batch.
pub fn resolve_batch<S: SessionStore + ?Sized>(
    store: &S,
    explicit: Option<String>,
) -> Option<String> {
    match explicit {
        Some(batch) => Some(batch),
        None => stored_batches(store).into_iter().next(),
    }
}
