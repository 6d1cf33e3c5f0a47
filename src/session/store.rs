//! Session state and the store that owns it

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use super::cookie::{CookieError, CookieJar, MemoryCookieJar};
use super::navigation::{Navigation, Navigator, NullNavigator, Pages, redirect_param};

/// The pair of credentials held for the current user
///
/// Logged in if and only if `access_token` is present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived credential sent on every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Longer-lived credential used only to obtain a new access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Session {
    /// Create a session from raw tokens
    #[must_use]
    pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }

    /// Whether the user is considered logged in
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Tokens issued by login, register or refresh
///
/// Accepts the `token` field used by the login endpoint as well as `accessToken`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// New access token
    #[serde(alias = "token", alias = "access_token")]
    pub access_token: String,

    /// Rotated refresh token, if the server issued one
    #[serde(
        default,
        alias = "refresh_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<String>,
}

impl TokenPair {
    /// Create a token pair
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

/// Contract between the HTTP client and whatever owns the session
///
/// The client only reads tokens and requests transitions; it never edits
/// session fields directly.
pub trait SessionStore: Send + Sync {
    /// Current access token
    fn access_token(&self) -> Option<String>;

    /// Current refresh token
    fn refresh_token(&self) -> Option<String>;

    /// Store new tokens. A missing refresh token keeps the existing one.
    /// With `should_redirect`, navigate to the post-login destination.
    fn log_in(&self, tokens: TokenPair, should_redirect: bool);

    /// Clear both tokens and navigate to the login page, carrying
    /// `redirect` as the return target when given.
    fn log_out(&self, redirect: Option<&str>);

    /// Where the user should land after re-authenticating
    fn return_location(&self) -> String {
        "/".to_string()
    }

    /// Both tokens as one value
    fn snapshot(&self) -> Session {
        Session::new(self.access_token(), self.refresh_token())
    }
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn access_token(&self) -> Option<String> {
        (**self).access_token()
    }

    fn refresh_token(&self) -> Option<String> {
        (**self).refresh_token()
    }

    fn log_in(&self, tokens: TokenPair, should_redirect: bool) {
        (**self).log_in(tokens, should_redirect);
    }

    fn log_out(&self, redirect: Option<&str>) {
        (**self).log_out(redirect);
    }

    fn return_location(&self) -> String {
        (**self).return_location()
    }

    fn snapshot(&self) -> Session {
        (**self).snapshot()
    }
}

/// Session store persisted through a [`CookieJar`]
///
/// ```
/// use ldx_insight_client::session::{CookieSessionStore, SessionStore, TokenPair};
///
/// let store = CookieSessionStore::in_memory();
/// assert!(!store.snapshot().is_logged_in());
///
/// store.log_in(TokenPair::new("T1", Some("R1".to_string())), false);
/// assert_eq!(store.access_token().as_deref(), Some("T1"));
///
/// store.log_out(None);
/// assert_eq!(store.refresh_token(), None);
/// ```
pub struct CookieSessionStore {
    state: RwLock<Session>,
    jar: Box<dyn CookieJar>,
    navigator: Arc<dyn Navigator>,
    pages: Pages,
}

impl std::fmt::Debug for CookieSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("CookieSessionStore")
            .field("logged_in", &state.is_logged_in())
            .field("has_refresh_token", &state.refresh_token.is_some())
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

impl CookieSessionStore {
    /// Create a store initialized from the persisted cookie
    ///
    /// A missing cookie yields a logged-out session; an unreadable one is
    /// logged and treated the same way.
    pub fn hydrate(jar: impl CookieJar + 'static, navigator: Arc<dyn Navigator>) -> Self {
        let session = load_session(&jar).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring unreadable session cookie");
            Session::default()
        });
        Self::with_session(session, jar, navigator)
    }

    /// Like [`hydrate`](Self::hydrate), but an unreadable cookie is an error
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the cookie exists but cannot be read
    /// or parsed.
    pub fn try_hydrate(
        jar: impl CookieJar + 'static,
        navigator: Arc<dyn Navigator>,
    ) -> crate::Result<Self> {
        let session = load_session(&jar)?;
        Ok(Self::with_session(session, jar, navigator))
    }

    fn with_session(
        session: Session,
        jar: impl CookieJar + 'static,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            state: RwLock::new(session),
            jar: Box::new(jar),
            navigator,
            pages: Pages::default(),
        }
    }

    /// Store with no persistence and no navigation, starting logged out
    #[must_use]
    pub fn in_memory() -> Self {
        Self::hydrate(MemoryCookieJar::new(), Arc::new(NullNavigator))
    }

    /// Override the login and home pages
    #[must_use]
    pub fn with_pages(mut self, pages: Pages) -> Self {
        self.pages = pages;
        self
    }

    /// Configured pages
    #[must_use]
    pub fn pages(&self) -> &Pages {
        &self.pages
    }

    /// Navigator used for redirects
    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_login_page(&self, location: &str) -> bool {
        location.split(['?', '#']).next() == Some(self.pages.login.as_str())
    }
}

fn load_session(jar: &impl CookieJar) -> Result<Session, CookieError> {
    match jar.load() {
        Ok(session) => {
            tracing::debug!(
                logged_in = session.is_logged_in(),
                "Hydrated session from cookie"
            );
            Ok(session)
        }
        Err(CookieError::NotFound) => {
            tracing::debug!("No session cookie found");
            Ok(Session::default())
        }
        Err(e) => Err(e),
    }
}

impl SessionStore for CookieSessionStore {
    fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    fn log_in(&self, tokens: TokenPair, should_redirect: bool) {
        let session = {
            let mut state = self.write();
            state.access_token = Some(tokens.access_token);
            if let Some(refresh_token) = tokens.refresh_token {
                state.refresh_token = Some(refresh_token);
            }
            state.clone()
        };

        if let Err(e) = self.jar.save(&session) {
            tracing::warn!(error = %e, "Failed to persist session cookie");
        }

        if should_redirect {
            let target = self
                .navigator
                .current_location()
                .and_then(|location| redirect_param(&location))
                .unwrap_or_else(|| self.pages.home.clone());
            self.navigator.navigate(Navigation::to(target));
        }
    }

    fn log_out(&self, redirect: Option<&str>) {
        *self.write() = Session::default();

        if let Err(e) = self.jar.clear() {
            tracing::warn!(error = %e, "Failed to remove session cookie");
        }

        let navigation = match redirect {
            Some(target) => Navigation::with_redirect(self.pages.login.clone(), target),
            None => Navigation::to(self.pages.login.clone()),
        };
        self.navigator.navigate(navigation);
    }

    fn return_location(&self) -> String {
        match self.navigator.current_location() {
            Some(location) => redirect_param(&location).unwrap_or_else(|| {
                if self.is_login_page(&location) {
                    self.pages.home.clone()
                } else {
                    location
                }
            }),
            None => self.pages.home.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{FileCookieJar, MemoryNavigator};
    use tempfile::TempDir;

    fn store_at(location: &str) -> (CookieSessionStore, Arc<MemoryNavigator>) {
        let navigator = Arc::new(MemoryNavigator::new(location));
        let store = CookieSessionStore::hydrate(MemoryCookieJar::new(), navigator.clone());
        (store, navigator)
    }

    #[test]
    fn test_token_pair_accepts_login_shape() {
        let tokens: TokenPair = serde_json::from_str(r#"{"token":"jwt"}"#).unwrap();
        assert_eq!(tokens, TokenPair::new("jwt", None));

        let tokens: TokenPair =
            serde_json::from_str(r#"{"accessToken":"T2","refreshToken":"R2"}"#).unwrap();
        assert_eq!(tokens, TokenPair::new("T2", Some("R2".to_string())));
    }

    #[test]
    fn test_hydrate_from_cookie() {
        let jar = MemoryCookieJar::with_session(Session::new(
            Some("T1".to_string()),
            Some("R1".to_string()),
        ));
        let store = CookieSessionStore::hydrate(jar, Arc::new(NullNavigator));

        assert_eq!(store.access_token().as_deref(), Some("T1"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));
    }

    #[test]
    fn test_hydrate_ignores_corrupt_cookie() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "{").unwrap();

        let store =
            CookieSessionStore::hydrate(FileCookieJar::with_path(path), Arc::new(NullNavigator));
        assert!(!store.snapshot().is_logged_in());
    }

    #[test]
    fn test_try_hydrate_reports_corrupt_cookie() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "{").unwrap();

        let result = CookieSessionStore::try_hydrate(
            FileCookieJar::with_path(path),
            Arc::new(NullNavigator),
        );
        assert!(matches!(
            result,
            Err(crate::ClientError::Storage(CookieError::Json(_)))
        ));

        let missing = CookieSessionStore::try_hydrate(
            FileCookieJar::with_path(temp_dir.path().join("absent.json")),
            Arc::new(NullNavigator),
        )
        .unwrap();
        assert!(!missing.snapshot().is_logged_in());
    }

    #[test]
    fn test_log_in_persists_and_keeps_refresh_token() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        let store = CookieSessionStore::hydrate(
            FileCookieJar::with_path(path.clone()),
            Arc::new(NullNavigator),
        );

        store.log_in(TokenPair::new("T1", Some("R1".to_string())), false);
        store.log_in(TokenPair::new("T2", None), false);

        assert_eq!(store.access_token().as_deref(), Some("T2"));
        assert_eq!(store.refresh_token().as_deref(), Some("R1"));

        let rehydrated =
            CookieSessionStore::hydrate(FileCookieJar::with_path(path), Arc::new(NullNavigator));
        assert_eq!(rehydrated.snapshot(), store.snapshot());
    }

    #[test]
    fn test_log_in_redirects_home_by_default() {
        let (store, navigator) = store_at("/login");
        store.log_in(TokenPair::new("T1", None), true);
        assert_eq!(navigator.location(), "/");
    }

    #[test]
    fn test_log_in_follows_redirect_param() {
        let (store, navigator) = store_at("/login?redirect=%2Fdatasets%2F42");
        store.log_in(TokenPair::new("T1", None), true);
        assert_eq!(navigator.location(), "/datasets/42");
    }

    #[test]
    fn test_silent_log_in_does_not_navigate() {
        let (store, navigator) = store_at("/datasets");
        store.log_in(TokenPair::new("T1", None), false);
        assert!(navigator.history().is_empty());
        assert_eq!(navigator.location(), "/datasets");
    }

    #[test]
    fn test_log_out_clears_and_redirects() {
        let (store, navigator) = store_at("/datasets");
        store.log_in(TokenPair::new("T1", Some("R1".to_string())), false);

        store.log_out(Some("/datasets"));

        assert_eq!(store.snapshot(), Session::default());
        assert_eq!(navigator.location(), "/login?redirect=%2Fdatasets");
    }

    #[test]
    fn test_log_out_twice_is_idempotent() {
        let (store, navigator) = store_at("/stats");
        store.log_in(TokenPair::new("T1", Some("R1".to_string())), false);

        store.log_out(None);
        let once = store.snapshot();
        store.log_out(None);

        assert_eq!(store.snapshot(), once);
        assert_eq!(once, Session::default());
        assert_eq!(navigator.location(), "/login");
    }

    #[test]
    fn test_return_location() {
        let (store, navigator) = store_at("/datasets?page=3");
        assert_eq!(store.return_location(), "/datasets?page=3");

        navigator.set_location("/login?redirect=%2Fstats");
        assert_eq!(store.return_location(), "/stats");

        navigator.set_location("/login");
        assert_eq!(store.return_location(), "/");

        let headless = CookieSessionStore::in_memory();
        assert_eq!(headless.return_location(), "/");
    }
}
