//! Audible tones and toast messages
//!
//! Everything here is fire-and-forget: failures are logged and swallowed.

use std::io::Write;
use tracing::{debug, info};

/// Short tones played at timer start and completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Start,
    Complete,
}

impl Tone {
    pub fn frequency_hz(&self) -> u32 {
        match self {
            Tone::Start => 400,
            Tone::Complete => 600,
        }
    }

    pub fn duration_ms(&self) -> u32 {
        match self {
            Tone::Start => 300,
            Tone::Complete => 800,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn play(&self, tone: Tone);
    fn toast(&self, message: &str);
}

/// Rings the terminal bell and logs toasts
#[derive(Debug, Clone, Copy)]
pub struct TerminalNotifier {
    pub bell: bool,
}

impl TerminalNotifier {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl Notifier for TerminalNotifier {
    fn play(&self, tone: Tone) {
        debug!("Tone {:?} ({}Hz, {}ms)", tone, tone.frequency_hz(), tone.duration_ms());
        if !self.bell {
            return;
        }
        let mut stderr = std::io::stderr();
        let rings = if tone == Tone::Complete { 2 } else { 1 };
        for _ in 0..rings {
            if let Err(e) = stderr.write_all(b"\x07") {
                debug!("Terminal bell unavailable: {}", e);
                return;
            }
        }
        if let Err(e) = stderr.flush() {
            debug!("Terminal bell unavailable: {}", e);
        }
    }

    fn toast(&self, message: &str) {
        info!("{}", message);
    }
}
