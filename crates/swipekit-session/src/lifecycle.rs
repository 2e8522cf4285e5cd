//! Host application lifecycle hooks.
//!
//! An audio-jack reader holds the audio route while connected, so the
//! session releases it when the host application is suspended and
//! reconnects on resume, but only if the caller had the session active.

use serde::{Deserialize, Serialize};

use crate::session::{ActivationOutcome, DeactivationOutcome};

/// Host application lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The application is about to move to the background.
    Suspended,

    /// The application became active again.
    Resumed,
}

/// What the session did in response to a [`LifecycleEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The caller does not want the session active; nothing was done.
    Ignored,

    /// The session was deactivated for suspension.
    Deactivated(DeactivationOutcome),

    /// The session was reactivated after resume.
    Activated(ActivationOutcome),
}
