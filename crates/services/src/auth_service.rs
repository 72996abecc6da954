use std::sync::{Arc, PoisonError, RwLock};

use quiz_core::model::{AuthToken, Credentials, ProfileUpdateDraft, Registration, User};
use storage::repository::{AuthRepository, AuthStore, LoginGrant, StorageError, StoredAuth};
use tracing::{info, warn};

use crate::Clock;
use crate::error::AuthError;

#[derive(Clone)]
struct SignedIn {
    token: AuthToken,
    user: User,
}

/// The signed-in user and their token.
///
/// `restore` runs once at startup; `login`/`register` and `logout` are the only
/// other places the state changes, apart from `expire` when the backend
/// rejects the token.
pub struct AuthSession {
    clock: Clock,
    auth: Arc<dyn AuthRepository>,
    store: Arc<dyn AuthStore>,
    state: RwLock<Option<SignedIn>>,
}

impl AuthSession {
    #[must_use]
    pub fn new(clock: Clock, auth: Arc<dyn AuthRepository>, store: Arc<dyn AuthStore>) -> Self {
        Self {
            clock,
            auth,
            store,
            state: RwLock::new(None),
        }
    }

    fn set(&self, signed_in: Option<SignedIn>) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = signed_in;
    }

    fn snapshot(&self) -> Option<SignedIn> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.snapshot().map(|s| s.user)
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Token for authenticated calls.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` when nobody is signed in.
    pub fn token(&self) -> Result<AuthToken, AuthError> {
        self.snapshot()
            .map(|s| s.token)
            .ok_or(AuthError::NotSignedIn)
    }

    /// Reload the remembered login and confirm it with the backend.
    ///
    /// A token the backend rejects is forgotten. When the backend cannot be
    /// reached the stored user is kept so the app can retry later.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the local store cannot be read or cleared.
    pub async fn restore(&self) -> Result<Option<User>, AuthError> {
        let Some(stored) = self.store.load_auth().await? else {
            return Ok(None);
        };

        match self.auth.current_user(&stored.token).await {
            Ok(user) => {
                info!(user = %user.id, "restored login");
                self.remember(stored.token, user.clone()).await;
                Ok(Some(user))
            }
            Err(StorageError::Unauthorized | StorageError::NotFound) => {
                info!("stored login was rejected, clearing it");
                self.store.clear_auth().await?;
                Ok(None)
            }
            Err(err) => {
                warn!(error = %err, "could not verify stored login, keeping it");
                self.set(Some(SignedIn {
                    token: stored.token,
                    user: stored.user.clone(),
                }));
                Ok(Some(stored.user))
            }
        }
    }

    /// # Errors
    ///
    /// Returns `AuthError::Invalid` for malformed input and
    /// `AuthError::Storage` if the backend rejects the credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let credentials = Credentials::new(email, password)?;
        self.login_with(&credentials).await
    }

    /// Create an account and sign straight in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Invalid` for malformed input and
    /// `AuthError::Storage` if registration or the follow-up login fails.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let registration = Registration::new(username, email, password)?;
        self.auth.register(&registration).await?;
        info!(email = %registration.email, "registered");
        self.login_with(&registration.credentials()).await
    }

    async fn login_with(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let LoginGrant { token, user } = self.auth.login(credentials).await?;
        info!(user = %user.id, "signed in");
        self.remember(token, user.clone()).await;
        Ok(user)
    }

    async fn remember(&self, token: AuthToken, user: User) {
        let stored = StoredAuth {
            token: token.clone(),
            user: user.clone(),
            saved_at: self.clock.now(),
        };
        self.set(Some(SignedIn { token, user }));
        if let Err(err) = self.store.save_auth(&stored).await {
            warn!(error = %err, "could not persist login");
        }
    }

    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the remembered login cannot be cleared.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.set(None);
        self.store.clear_auth().await?;
        info!("signed out");
        Ok(())
    }

    /// Drop the login after the backend rejected the token.
    pub async fn expire(&self) {
        if self.snapshot().is_none() {
            return;
        }
        warn!("token rejected by backend, signing out");
        self.set(None);
        if let Err(err) = self.store.clear_auth().await {
            warn!(error = %err, "could not clear expired login");
        }
    }

    /// Pass a storage result through, signing out on `Unauthorized`.
    pub(crate) async fn guard<T>(
        &self,
        result: Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        if matches!(result, Err(StorageError::Unauthorized)) {
            self.expire().await;
        }
        result
    }

    /// Apply a profile form and refresh the user from the backend.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn`, `AuthError::Invalid` for a bad form,
    /// or `AuthError::Storage` if the update fails.
    pub async fn update_profile(&self, draft: ProfileUpdateDraft) -> Result<User, AuthError> {
        let SignedIn { token, user } = self.snapshot().ok_or(AuthError::NotSignedIn)?;
        let update = draft.validate(&user)?;
        self.guard(self.auth.update_profile(&token, &update).await)
            .await?;
        let refreshed = self.guard(self.auth.current_user(&token).await).await?;
        info!(user = %refreshed.id, "profile updated");
        self.remember(token, refreshed.clone()).await;
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::UserError;
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::InMemoryRepository;

    fn session_over(repo: &InMemoryRepository) -> AuthSession {
        AuthSession::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    #[tokio::test]
    async fn register_signs_in_and_remembers_login() {
        let repo = InMemoryRepository::with_clock(fixed_clock());
        let session = session_over(&repo);

        let user = session
            .register("ada", "ada@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(user.username, "ada");
        assert!(session.is_signed_in());

        let stored = repo.load_auth().await.unwrap().unwrap();
        assert_eq!(stored.user, user);
        assert_eq!(stored.saved_at, fixed_now());
    }

    #[tokio::test]
    async fn register_validates_before_calling_backend() {
        let repo = InMemoryRepository::new();
        let session = session_over(&repo);
        let err = session
            .register("ada", "ada@example.com", "123")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Invalid(UserError::PasswordTooShort)));
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn restore_verifies_stored_token() {
        let repo = InMemoryRepository::new();
        session_over(&repo)
            .register("ada", "ada@example.com", "secret1")
            .await
            .unwrap();

        let fresh = session_over(&repo);
        let restored = fresh.restore().await.unwrap();
        assert_eq!(restored.map(|u| u.username), Some("ada".to_owned()));
        assert!(fresh.token().is_ok());
    }

    #[tokio::test]
    async fn restore_forgets_rejected_token() {
        let repo = InMemoryRepository::new();
        repo.save_auth(&StoredAuth {
            token: AuthToken::new("stale"),
            user: User {
                id: quiz_core::model::UserId::new("u"),
                username: "ada".into(),
                email: "ada@example.com".into(),
                name: None,
            },
            saved_at: fixed_now(),
        })
        .await
        .unwrap();

        let session = session_over(&repo);
        assert_eq!(session.restore().await.unwrap(), None);
        assert!(repo.load_auth().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn logout_clears_state_and_store() {
        let repo = InMemoryRepository::new();
        let session = session_over(&repo);
        session
            .register("ada", "ada@example.com", "secret1")
            .await
            .unwrap();

        session.logout().await.unwrap();
        assert!(matches!(session.token(), Err(AuthError::NotSignedIn)));
        assert!(repo.load_auth().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_profile_refreshes_user() {
        let repo = InMemoryRepository::new();
        let session = session_over(&repo);
        session
            .register("ada", "ada@example.com", "secret1")
            .await
            .unwrap();

        let updated = session
            .update_profile(ProfileUpdateDraft {
                name: "Ada Lovelace".into(),
                password: "newpass".into(),
                confirm_password: "newpass".into(),
            })
            .await
            .unwrap();
        assert_eq!(updated.display_name(), "Ada Lovelace");
        assert_eq!(
            session.current_user().and_then(|u| u.name),
            Some("Ada Lovelace".to_owned())
        );

        session.logout().await.unwrap();
        assert!(session.login("ada@example.com", "newpass").await.is_ok());
    }

    #[tokio::test]
    async fn guard_signs_out_on_unauthorized() {
        let repo = InMemoryRepository::new();
        let session = session_over(&repo);
        session
            .register("ada", "ada@example.com", "secret1")
            .await
            .unwrap();

        let result: Result<(), _> = session.guard(Err(StorageError::Unauthorized)).await;
        assert!(result.is_err());
        assert!(!session.is_signed_in());
    }
}
