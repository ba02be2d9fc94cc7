//! Reflection nudge escalation
//!
//! Counts how many focus sessions in a row ended without a reflection note and
//! picks how forcefully the completion dialog pushes toward writing one.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::services::KeyValueStore;

/// Key under which the skip counter is persisted
pub const CONSECUTIVE_SKIPS_KEY: &str = "consecutive_skips";

/// Completion dialog tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogVariant {
    /// Continue and reflect offered with equal weight
    Neutral,
    /// Reflection is the primary action, skipping is discouraged
    Nudge,
    /// Reflection is the only way out
    Mandatory,
}

impl DialogVariant {
    pub fn allows_skip(&self) -> bool {
        !matches!(self, DialogVariant::Mandatory)
    }

    /// Whether clicking outside the dialog closes it
    pub fn dismissible(&self) -> bool {
        self.allows_skip()
    }

    pub fn skip_label(&self) -> Option<&'static str> {
        match self {
            DialogVariant::Neutral => Some("Continue Session"),
            DialogVariant::Nudge => Some("Skip (Not Recommended)"),
            DialogVariant::Mandatory => None,
        }
    }

    pub fn reflect_label(&self) -> &'static str {
        match self {
            DialogVariant::Neutral => "Go to Feynman Notes",
            DialogVariant::Nudge => "Write Feynman Notes",
            DialogVariant::Mandatory => "Write Feynman Notes Now",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DialogVariant::Neutral => "What would you like to do next?",
            DialogVariant::Nudge => {
                "You skipped your last reflection. Explaining what you learned helps it stick."
            }
            DialogVariant::Mandatory => {
                "You've skipped several reflections in a row. Take a moment to write your notes."
            }
        }
    }
}

/// Dialog tier for a given number of consecutive skips
pub fn variant_for(consecutive_skips: u32) -> DialogVariant {
    match consecutive_skips {
        0 => DialogVariant::Neutral,
        1 => DialogVariant::Nudge,
        _ => DialogVariant::Mandatory,
    }
}

/// What a click outside the completion dialog means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DismissPolicy {
    /// Treat it exactly like an explicit skip
    #[default]
    #[value(name = "skip")]
    CountsAsSkip,
    /// Close the dialog without touching the counter
    #[value(name = "ignore")]
    Ignored,
}

#[derive(Debug, Clone, Default)]
pub struct EscalationTracker {
    consecutive_skips: u32,
}

impl EscalationTracker {
    pub fn new(consecutive_skips: u32) -> Self {
        Self { consecutive_skips }
    }

    /// Restore the counter; a missing or unreadable value starts at zero
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let consecutive_skips = store
            .get(CONSECUTIVE_SKIPS_KEY)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0);
        Self { consecutive_skips }
    }

    pub fn consecutive_skips(&self) -> u32 {
        self.consecutive_skips
    }

    pub fn variant(&self) -> DialogVariant {
        variant_for(self.consecutive_skips)
    }

    /// Dialog tier to show after a completed focus session
    pub fn on_focus_session_complete(&self) -> DialogVariant {
        self.variant()
    }

    /// Record an explicit skip. Ignored (returns false) in the mandatory tier.
    pub fn on_user_skips(&mut self, store: &dyn KeyValueStore) -> bool {
        if !self.variant().allows_skip() {
            return false;
        }
        self.consecutive_skips += 1;
        info!("Reflection skipped ({} in a row)", self.consecutive_skips);
        self.persist(store);
        true
    }

    /// The user is heading to the reflection flow; start over
    pub fn on_user_reflects(&mut self, store: &dyn KeyValueStore) {
        self.consecutive_skips = 0;
        self.persist(store);
    }

    fn persist(&self, store: &dyn KeyValueStore) {
        if let Err(e) = store.set(CONSECUTIVE_SKIPS_KEY, &self.consecutive_skips.to_string()) {
            warn!("Failed to persist skip counter: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;

    #[test]
    fn test_variant_tiers() {
        assert_eq!(variant_for(0), DialogVariant::Neutral);
        assert_eq!(variant_for(1), DialogVariant::Nudge);
        assert_eq!(variant_for(2), DialogVariant::Mandatory);
        assert_eq!(variant_for(17), DialogVariant::Mandatory);
    }

    #[test]
    fn test_skips_escalate_and_clamp() {
        let store = MemoryStore::new();
        let mut tracker = EscalationTracker::default();

        let mut seen = vec![tracker.on_focus_session_complete()];
        for _ in 0..3 {
            tracker.on_user_skips(&store);
            seen.push(tracker.on_focus_session_complete());
        }

        assert_eq!(
            seen,
            vec![
                DialogVariant::Neutral,
                DialogVariant::Nudge,
                DialogVariant::Mandatory,
                DialogVariant::Mandatory,
            ]
        );
        assert_eq!(tracker.consecutive_skips(), 2);
    }

    #[test]
    fn test_nudge_skip_reaches_mandatory() {
        let store = MemoryStore::new();
        let mut tracker = EscalationTracker::new(1);
        assert!(tracker.on_user_skips(&store));

        assert_eq!(tracker.consecutive_skips(), 2);
        let variant = tracker.on_focus_session_complete();
        assert_eq!(variant, DialogVariant::Mandatory);
        assert_eq!(variant.skip_label(), None);
        assert!(!variant.dismissible());
    }

    #[test]
    fn test_reflect_resets_from_any_tier() {
        let store = MemoryStore::new();
        for start in [0, 1, 2, 9] {
            let mut tracker = EscalationTracker::new(start);
            tracker.on_user_reflects(&store);
            assert_eq!(tracker.variant(), DialogVariant::Neutral);
            assert_eq!(store.get(CONSECUTIVE_SKIPS_KEY).as_deref(), Some("0"));
        }
    }

    #[test]
    fn test_counter_is_persisted_and_restored() {
        let store = MemoryStore::new();
        let mut tracker = EscalationTracker::load(&store);
        assert_eq!(tracker.consecutive_skips(), 0);

        tracker.on_user_skips(&store);
        assert_eq!(store.get(CONSECUTIVE_SKIPS_KEY).as_deref(), Some("1"));
        assert_eq!(EscalationTracker::load(&store).consecutive_skips(), 1);

        store.set(CONSECUTIVE_SKIPS_KEY, "garbage").unwrap();
        assert_eq!(EscalationTracker::load(&store).consecutive_skips(), 0);
    }

    #[test]
    fn test_nudge_labels() {
        assert_eq!(DialogVariant::Nudge.skip_label(), Some("Skip (Not Recommended)"));
        assert!(DialogVariant::Neutral.dismissible());
    }
}
