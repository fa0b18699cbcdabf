//! Application state for the workforce API.

use std::sync::Arc;

use crate::auth::LoginGuard;
use crate::config::ConfigLoader;
use crate::store::Database;

/// Shared application state.
///
/// Contains resources that are shared across all request handlers: the
/// loaded configuration, the store and the login lockout guard.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    db: Arc<Database>,
    login_guard: Arc<LoginGuard>,
}

impl AppState {
    /// Creates state over an empty store.
    pub fn new(config: ConfigLoader) -> Self {
        Self::with_database(config, Arc::new(Database::new()))
    }

    /// Creates state over an existing store.
    pub fn with_database(config: ConfigLoader, db: Arc<Database>) -> Self {
        let login_guard = LoginGuard::new(config.security());
        Self::with_parts(config, db, login_guard)
    }

    /// Creates state from prebuilt parts.
    pub fn with_parts(config: ConfigLoader, db: Arc<Database>, login_guard: LoginGuard) -> Self {
        Self {
            config: Arc::new(config),
            db,
            login_guard: Arc::new(login_guard),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// The shared store.
    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    /// The login lockout guard.
    pub fn login_guard(&self) -> &Arc<LoginGuard> {
        &self.login_guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone + Send + Sync>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_store() {
        let state = AppState::new(ConfigLoader::from_config(EngineConfig::default()));
        let clone = state.clone();
        assert!(Arc::ptr_eq(state.db(), clone.db()));
    }
}
