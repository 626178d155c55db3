//! Account settings panel
//!
//! Edits go through [`SettingsField`] so nested notification toggles are
//! addressed by a typed path. Saving writes the display name back onto the
//! signed-in identity.

use crate::error::SettingsError;
use crate::session::{Identity, SessionContext};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "system" => Some(Theme::System),
            _ => None,
        }
    }
}

/// Delivery channels a user can opt in or out of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Email,
    Push,
    Sms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannels {
    pub email: bool,
    pub push: bool,
    pub sms: bool,
}

impl Default for NotificationChannels {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sms: false,
        }
    }
}

impl NotificationChannels {
    pub fn enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email,
            Channel::Push => self.push,
            Channel::Sms => self.sms,
        }
    }

    fn slot(&mut self, channel: Channel) -> &mut bool {
        match channel {
            Channel::Email => &mut self.email,
            Channel::Push => &mut self.push,
            Channel::Sms => &mut self.sms,
        }
    }
}

/// Free-text profile fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Email,
    Phone,
    Language,
}

/// One edit to the settings record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsField {
    Profile(ProfileField, String),
    Notification(Channel, bool),
    Theme(Theme),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub language: String,
    pub notifications: NotificationChannels,
    pub theme: Theme,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            language: "English".into(),
            notifications: NotificationChannels::default(),
            theme: Theme::default(),
        }
    }
}

impl UserSettings {
    /// Settings pre-filled from the signed-in caller, or blank when anonymous
    pub fn for_session(session: &SessionContext) -> Self {
        match session.identity() {
            Some(identity) => Self::for_identity(identity),
            None => Self::default(),
        }
    }

    pub fn for_identity(identity: &Identity) -> Self {
        Self {
            name: identity.name.clone(),
            email: identity.email.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    pub fn update(&mut self, field: SettingsField) {
        match field {
            SettingsField::Profile(field, value) => *self.text_mut(field) = value,
            SettingsField::Notification(channel, on) => *self.notifications.slot(channel) = on,
            SettingsField::Theme(theme) => self.theme = theme,
        }
    }

    pub fn text(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Email => &self.email,
            ProfileField::Phone => &self.phone,
            ProfileField::Language => &self.language,
        }
    }

    fn text_mut(&mut self, field: ProfileField) -> &mut String {
        match field {
            ProfileField::Name => &mut self.name,
            ProfileField::Email => &mut self.email,
            ProfileField::Phone => &mut self.phone,
            ProfileField::Language => &mut self.language,
        }
    }

    /// Write the display name back onto the session identity.
    ///
    /// Returns whether the identity changed. Favorites are left alone.
    pub fn save(&self, session: &mut SessionContext) -> Result<bool, SettingsError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SettingsError::BlankName);
        }

        let identity = session.identity.as_mut().ok_or(SettingsError::NotSignedIn)?;
        if identity.name == name {
            debug!("Settings saved with no identity change");
            return Ok(false);
        }

        info!("Display name changed for {}", identity.id);
        identity.name = name.to_string();
        Ok(true)
    }
}
