//! Navigation side effects of logging in and out
//!
//! A session change in the browser moves the user between pages. The client
//! expresses that through [`Navigator`]: a UI layer implements it to switch
//! screens, while [`MemoryNavigator`] just tracks the location and history.

use std::sync::{Arc, Mutex, PoisonError};

use reqwest::Url;

use crate::utils::percent_encode;

/// Query parameter carrying the post-login destination
pub const REDIRECT_PARAM: &str = "redirect";

/// Well-known application pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pages {
    /// Login page
    pub login: String,
    /// Default landing page after login
    pub home: String,
}

impl Default for Pages {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            home: "/".to_string(),
        }
    }
}

/// A navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Destination location (path, optionally with its own query)
    pub path: String,
    /// Where to return after the destination has done its job
    pub redirect: Option<String>,
}

impl Navigation {
    /// Navigate to a location
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            redirect: None,
        }
    }

    /// Navigate to a location, carrying a `redirect` target
    pub fn with_redirect(path: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            redirect: Some(redirect.into()),
        }
    }

    /// Location string, e.g. `/login?redirect=%2Fdatasets`
    #[must_use]
    pub fn href(&self) -> String {
        match &self.redirect {
            Some(target) => {
                let separator = if self.path.contains('?') { '&' } else { '?' };
                format!(
                    "{}{separator}{REDIRECT_PARAM}={}",
                    self.path,
                    percent_encode(target)
                )
            }
            None => self.path.clone(),
        }
    }
}

/// Extract the `redirect` query parameter from a location
#[must_use]
pub fn redirect_param(location: &str) -> Option<String> {
    let url = Url::parse("http://localhost/").ok()?.join(location).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == REDIRECT_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Performs page navigation on behalf of the session store
pub trait Navigator: Send + Sync {
    /// Current location, if the navigator tracks one
    fn current_location(&self) -> Option<String>;

    /// Move to another location
    fn navigate(&self, to: Navigation);
}

impl<T: Navigator + ?Sized> Navigator for Arc<T> {
    fn current_location(&self) -> Option<String> {
        (**self).current_location()
    }

    fn navigate(&self, to: Navigation) {
        (**self).navigate(to);
    }
}

/// Navigator for headless use: logs requests and tracks nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn current_location(&self) -> Option<String> {
        None
    }

    fn navigate(&self, to: Navigation) {
        tracing::debug!(location = %to.href(), "navigation requested");
    }
}

#[derive(Debug)]
struct History {
    location: String,
    visited: Vec<Navigation>,
}

/// In-memory navigator that follows every navigation request
#[derive(Debug)]
pub struct MemoryNavigator {
    history: Mutex<History>,
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MemoryNavigator {
    /// Navigator starting at `location`
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(History {
                location: location.into(),
                visited: Vec::new(),
            }),
        }
    }

    /// Current location
    #[must_use]
    pub fn location(&self) -> String {
        self.lock().location.clone()
    }

    /// Every navigation performed so far, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<Navigation> {
        self.lock().visited.clone()
    }

    /// Most recent navigation
    #[must_use]
    pub fn last(&self) -> Option<Navigation> {
        self.lock().visited.last().cloned()
    }

    /// Jump to a location without recording it, as a user following a link would
    pub fn set_location(&self, location: impl Into<String>) {
        self.lock().location = location.into();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for MemoryNavigator {
    fn current_location(&self) -> Option<String> {
        Some(self.location())
    }

    fn navigate(&self, to: Navigation) {
        tracing::debug!(location = %to.href(), "navigating");
        let mut history = self.lock();
        history.location = to.href();
        history.visited.push(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_href_without_redirect() {
        assert_eq!(Navigation::to("/login").href(), "/login");
    }

    #[test]
    fn test_href_encodes_redirect() {
        let nav = Navigation::with_redirect("/login", "/datasets?page=2");
        assert_eq!(nav.href(), "/login?redirect=%2Fdatasets%3Fpage%3D2");
    }

    #[test]
    fn test_href_appends_to_existing_query() {
        let nav = Navigation::with_redirect("/login?lang=vi", "/stats");
        assert_eq!(nav.href(), "/login?lang=vi&redirect=%2Fstats");
    }

    #[test]
    fn test_redirect_param_round_trip() {
        let nav = Navigation::with_redirect("/login", "/datasets?page=2");
        assert_eq!(
            redirect_param(&nav.href()),
            Some("/datasets?page=2".to_string())
        );
    }

    #[test]
    fn test_redirect_param_absent_or_empty() {
        assert_eq!(redirect_param("/datasets"), None);
        assert_eq!(redirect_param("/login?redirect="), None);
        assert_eq!(redirect_param("/login?other=1"), None);
    }

    #[test]
    fn test_memory_navigator_tracks_location() {
        let navigator = MemoryNavigator::new("/datasets");
        assert_eq!(navigator.current_location().as_deref(), Some("/datasets"));

        navigator.navigate(Navigation::with_redirect("/login", "/datasets"));

        assert_eq!(navigator.location(), "/login?redirect=%2Fdatasets");
        assert_eq!(navigator.history().len(), 1);
        assert_eq!(
            navigator.last().and_then(|nav| nav.redirect),
            Some("/datasets".to_string())
        );
    }

    #[test]
    fn test_null_navigator_has_no_location() {
        let navigator = NullNavigator;
        navigator.navigate(Navigation::to("/login"));
        assert_eq!(navigator.current_location(), None);
    }
}
