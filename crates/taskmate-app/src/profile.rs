//! User profile and theme preference records.
//!
//! Both live under global keys: one profile per device, not per owner.

use taskmate_core::{Preferences, Theme, User};
use taskmate_store::KeyValueStore;
use tracing::{debug, info};

use crate::error::{RepositoryError, RepositoryResult};

const USER_KEY: &str = "@user";
const THEME_KEY: &str = "@theme";

const FALLBACK_NAME: &str = "Task Master";
const FALLBACK_EMAIL: &str = "user@example.com";

/// Identity handed over by the external authentication provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthIdentity {
    /// Provider-side user id; doubles as the task owner id.
    pub id: String,
    /// Email on record, if any.
    pub email: Option<String>,
    /// Full name from the provider's metadata, if any.
    pub full_name: Option<String>,
}

impl AuthIdentity {
    /// Profile created the first time this identity views its profile.
    #[must_use]
    pub fn default_profile(&self) -> User {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
        };
        User {
            name: non_blank(&self.full_name).unwrap_or_else(|| FALLBACK_NAME.to_owned()),
            email: non_blank(&self.email).unwrap_or_else(|| FALLBACK_EMAIL.to_owned()),
            avatar: None,
            preferences: Preferences::default(),
        }
    }
}

/// Single-record profile storage.
pub struct ProfileRepository<S> {
    store: S,
}

impl<S> ProfileRepository<S> {
    /// Wrap a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> ProfileRepository<S> {
    /// Load the stored profile, if any.
    ///
    /// # Errors
    /// Returns an error if the store fails or the record is malformed.
    pub async fn load(&self) -> RepositoryResult<Option<User>> {
        let Some(raw) = self.store.get(USER_KEY).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| RepositoryError::Decode {
                key: USER_KEY.to_owned(),
                source,
            })
    }

    /// Overwrite the stored profile.
    ///
    /// # Errors
    /// Returns an error if encoding or the store write fails.
    pub async fn save(&self, user: &User) -> RepositoryResult<()> {
        let body = serde_json::to_string(user).map_err(|source| RepositoryError::Encode {
            key: USER_KEY.to_owned(),
            source,
        })?;
        self.store.set(USER_KEY, &body).await?;
        debug!(name = %user.name, "Saved profile");
        Ok(())
    }

    /// Return the stored profile, creating and persisting a default one from
    /// `identity` when none exists yet.
    ///
    /// # Errors
    /// Returns an error if loading or saving fails.
    pub async fn ensure(&self, identity: &AuthIdentity) -> RepositoryResult<User> {
        if let Some(user) = self.load().await? {
            return Ok(user);
        }
        let user = identity.default_profile();
        self.save(&user).await?;
        info!(name = %user.name, "Created profile from identity");
        Ok(user)
    }

    /// Flip the notifications preference and persist the profile, creating
    /// it from `identity` first if needed.
    ///
    /// # Errors
    /// Returns an error if loading or saving fails.
    pub async fn toggle_notifications(&self, identity: &AuthIdentity) -> RepositoryResult<User> {
        let mut user = self.ensure(identity).await?;
        user.preferences.notifications = !user.preferences.notifications;
        self.save(&user).await?;
        debug!(
            notifications = user.preferences.notifications,
            "Toggled notifications"
        );
        Ok(user)
    }
}

/// Two-valued theme preference storage.
pub struct ThemeRepository<S> {
    store: S,
}

impl<S> ThemeRepository<S> {
    /// Wrap a store.
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

impl<S: KeyValueStore> ThemeRepository<S> {
    /// Load the theme; unknown or missing values are light.
    ///
    /// # Errors
    /// Returns an error if the store read fails.
    pub async fn load(&self) -> RepositoryResult<Theme> {
        let stored = self.store.get(THEME_KEY).await?;
        Ok(Theme::from_stored(stored.as_deref()))
    }

    /// Persist the theme literal.
    ///
    /// # Errors
    /// Returns an error if the store write fails.
    pub async fn save(&self, theme: Theme) -> RepositoryResult<()> {
        self.store.set(THEME_KEY, theme.as_str()).await?;
        Ok(())
    }

    /// Flip and persist the theme, returning the new value.
    ///
    /// # Errors
    /// Returns an error if reading or writing fails.
    pub async fn toggle(&self) -> RepositoryResult<Theme> {
        let next = self.load().await?.toggled();
        self.save(next).await?;
        debug!(theme = %next, "Toggled theme");
        Ok(next)
    }
}
