//! Registered applications allowed to call private routes.

use std::fmt;

use crate::config::ApplicationConfig;
use crate::security::AuthError;

/// An API client identified by id and shared key.
#[derive(Clone, PartialEq, Eq)]
pub struct Application {
    pub id: String,
    pub key: String,
}

impl Application {
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }
}

// Keys stay out of logs.
impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl From<ApplicationConfig> for Application {
    fn from(config: ApplicationConfig) -> Self {
        Self::new(config.id, config.key)
    }
}

/// Ordered list of applications. Lookups return the first id match.
#[derive(Debug, Clone, Default)]
pub struct Applications {
    apps: Vec<Application>,
}

impl Applications {
    pub fn new(apps: Vec<Application>) -> Self {
        Self { apps }
    }

    pub fn push(&mut self, app: Application) {
        self.apps.push(app);
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Returns an owned copy of the first application with the given id.
    pub fn find_by_id(&self, id: &str) -> Result<Application, AuthError> {
        self.apps
            .iter()
            .find(|app| app.id == id)
            .cloned()
            .ok_or(AuthError::ApplicationNotFound)
    }
}

impl FromIterator<Application> for Applications {
    fn from_iter<I: IntoIterator<Item = Application>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
