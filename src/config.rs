//! Application policy values, loaded from an optional JSON file.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

use crate::calendar::{JAKARTA_UTC_OFFSET_HOURS, reference_offset};
use crate::schedule::Session;
use crate::stats::{DEFAULT_ALPA_LIMIT, DEFAULT_STREAK_WINDOW};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Hours east of UTC used for "today" and period boundaries.
    pub utc_offset_hours: i32,
    pub alpa_limit: u32,
    /// Rows fetched for the streak.
    pub streak_window: usize,
    /// WhatsApp number confirming morning attendance.
    pub morning_contact: String,
    pub evening_contact: String,
    pub photo_bucket: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: JAKARTA_UTC_OFFSET_HOURS,
            alpa_limit: DEFAULT_ALPA_LIMIT,
            streak_window: DEFAULT_STREAK_WINDOW,
            morning_contact: "6282229910627".to_string(),
            evening_contact: "6283847423953".to_string(),
            photo_bucket: "attendance-proofs".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let config: AppConfig = serde_json::from_reader(file)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_hours {} is outside -12..=14",
                self.utc_offset_hours
            )));
        }
        if self.streak_window == 0 {
            return Err(ConfigError::Invalid(
                "streak_window must be at least 1".into(),
            ));
        }
        for (name, number) in [
            ("morning_contact", &self.morning_contact),
            ("evening_contact", &self.evening_contact),
        ] {
            if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be an international number without '+' (got '{number}')"
                )));
            }
        }
        if self.photo_bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("photo_bucket must not be empty".into()));
        }
        Ok(())
    }

    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        reference_offset(self.utc_offset_hours).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn contact_for(&self, session: Session) -> &str {
        match session {
            Session::Morning => &self.morning_contact,
            Session::Evening => &self.evening_contact,
        }
    }

    /// Bucket-qualified key for a path from [`crate::photo_storage_path`].
    pub fn photo_object_key(&self, storage_path: &str) -> String {
        format!("{}/{}", self.photo_bucket.trim_end_matches('/'), storage_path)
    }

    /// `wa.me` deep link for confirming a session's attendance.
    pub fn confirmation_link(&self, session: Session) -> String {
        format!("https://wa.me/{}", self.contact_for(session))
    }
}
