// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session configuration types.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::event::DEFAULT_CHANNEL_CAPACITY;

/// Default capacity of the inbound update channel.
pub const DEFAULT_UPDATE_CAPACITY: usize = 64;

/// Configuration for a [`RestoreSession`](super::RestoreSession).
///
/// # Examples
///
/// ```
/// use hatch_restore::manager::SessionConfig;
///
/// let config = SessionConfig::new()
///     .with_event_capacity(32)
///     .with_update_capacity(8)
///     .with_bootstrap(false);
///
/// assert_eq!(config.event_capacity, 32);
/// assert!(!config.bootstrap_on_start);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Capacity of the device event broadcast channel.
    pub event_capacity: usize,
    /// Capacity of the inbound update channel a transport should create.
    pub update_capacity: usize,
    /// Whether `run` reads every device's reported snapshot before
    /// processing updates.
    pub bootstrap_on_start: bool,
    /// Credential refresh timing.
    pub refresh: RefreshSchedule,
}

impl SessionConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the event channel capacity.
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Sets the update channel capacity.
    #[must_use]
    pub fn with_update_capacity(mut self, capacity: usize) -> Self {
        self.update_capacity = capacity;
        self
    }

    /// Enables or disables the bootstrap read on start.
    #[must_use]
    pub fn with_bootstrap(mut self, enabled: bool) -> Self {
        self.bootstrap_on_start = enabled;
        self
    }

    /// Sets the credential refresh schedule.
    #[must_use]
    pub fn with_refresh(mut self, refresh: RefreshSchedule) -> Self {
        self.refresh = refresh;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
            update_capacity: DEFAULT_UPDATE_CAPACITY,
            bootstrap_on_start: true,
            refresh: RefreshSchedule::default(),
        }
    }
}

/// When to re-establish the cloud session.
///
/// Shadow credentials expire; the session is rebuilt `lead` before the
/// expiry, and `retry` after a failed attempt. The host owning the
/// connection reads the timing through
/// [`RestoreSession::next_refresh_in`](super::RestoreSession::next_refresh_in).
///
/// # Examples
///
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
/// use hatch_restore::manager::RefreshSchedule;
///
/// let schedule = RefreshSchedule::default();
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// let expires = now + TimeDelta::hours(1);
///
/// assert_eq!(schedule.next_refresh(expires, now), TimeDelta::minutes(59));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    /// How long before expiry to refresh.
    pub lead: TimeDelta,
    /// Delay before retrying a failed refresh.
    pub retry: TimeDelta,
}

impl RefreshSchedule {
    /// Creates a schedule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how long before expiry to refresh.
    #[must_use]
    pub fn with_lead(mut self, lead: TimeDelta) -> Self {
        self.lead = lead;
        self
    }

    /// Sets the retry delay.
    #[must_use]
    pub fn with_retry(mut self, retry: TimeDelta) -> Self {
        self.retry = retry;
        self
    }

    /// Time from `now` until the next refresh. Never negative.
    #[must_use]
    pub fn next_refresh(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> TimeDelta {
        (expires_at - now - self.lead).max(TimeDelta::zero())
    }

    /// Like [`next_refresh`](Self::next_refresh), as a sleep duration.
    #[must_use]
    pub fn next_refresh_in(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        self.next_refresh(expires_at, now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Retry delay as a sleep duration.
    #[must_use]
    pub fn retry_in(&self) -> Duration {
        self.retry.to_std().unwrap_or(Duration::ZERO)
    }

    /// Converts a credential expiration in epoch seconds.
    ///
    /// Returns `None` for values outside the representable range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn expiration_from_epoch(seconds: f64) -> Option<DateTime<Utc>> {
        if !seconds.is_finite() {
            return None;
        }
        let millis = (seconds * 1000.0).round() as i64;
        DateTime::from_timestamp_millis(millis)
    }
}

impl Default for RefreshSchedule {
    fn default() -> Self {
        Self {
            lead: TimeDelta::minutes(1),
            retry: TimeDelta::minutes(1),
        }
    }
}

/// Prefix of every client id.
pub const CLIENT_ID_PREFIX: &str = "hatch_restore_light";

/// Client identifier for the shadow connection.
///
/// Made of a fixed prefix, the account email reduced to lowercase ASCII
/// letters, and a random UUID.
///
/// # Examples
///
/// ```
/// use hatch_restore::manager::ClientId;
///
/// let id = ClientId::for_account("Jane.Doe+1@Example.com");
/// assert!(id.as_str().starts_with("hatch_restore_light/janedoeexamplecom/"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    /// Creates a fresh client id for an account.
    #[must_use]
    pub fn for_account(email: &str) -> Self {
        Self::with_uuid(email, Uuid::new_v4())
    }

    fn with_uuid(email: &str, uuid: Uuid) -> Self {
        let safe: String = email
            .chars()
            .filter(char::is_ascii_alphabetic)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self(format!("{CLIENT_ID_PREFIX}/{safe}/{uuid}"))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
