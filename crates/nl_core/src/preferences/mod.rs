use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::{KeyValueStore, KEY_LOGGED_IN, KEY_REMEMBERED_USERNAME, KEY_THEME};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Missing or unrecognised values fall back to [`Theme::Light`].
pub fn load_theme(store: &dyn KeyValueStore) -> Result<Theme, AppError> {
    let raw = store.get(KEY_THEME)?;
    Ok(raw.as_deref().and_then(Theme::from_str).unwrap_or_default())
}

pub fn save_theme(store: &dyn KeyValueStore, theme: Theme) -> Result<(), AppError> {
    store.set(KEY_THEME, theme.as_str())
}

/// Mock sign-in gate. Credentials are required to be present but are never checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionGate {
    logged_in: bool,
    remembered_username: Option<String>,
}

impl SessionGate {
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, AppError> {
        let logged_in = store.get(KEY_LOGGED_IN)?.as_deref() == Some("true");
        let remembered_username = store
            .get(KEY_REMEMBERED_USERNAME)?
            .filter(|u| !u.trim().is_empty());
        Ok(Self {
            logged_in,
            remembered_username,
        })
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn remembered_username(&self) -> Option<&str> {
        self.remembered_username.as_deref()
    }

    pub fn login(
        &mut self,
        store: &dyn KeyValueStore,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<(), AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::new(
                "SESSION_CREDENTIALS_REQUIRED",
                "Please enter both username and password.",
            ));
        }

        self.logged_in = true;
        if remember_me {
            store.set(KEY_LOGGED_IN, "true")?;
            store.set(KEY_REMEMBERED_USERNAME, username)?;
            self.remembered_username = Some(username.to_string());
        } else {
            store.remove(KEY_LOGGED_IN)?;
            store.remove(KEY_REMEMBERED_USERNAME)?;
            self.remembered_username = None;
        }
        tracing::info!(remember_me, "session unlocked");
        Ok(())
    }

    /// Remembered username is kept so the next sign-in can prefill it.
    pub fn logout(&mut self, store: &dyn KeyValueStore) -> Result<(), AppError> {
        self.logged_in = false;
        store.remove(KEY_LOGGED_IN)
    }
}
