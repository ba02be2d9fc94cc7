//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};
use clap::Parser;

use crate::state::{ControllerSettings, DismissPolicy, ModeDurations};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "lockin")]
#[command(about = "A deadline-based Pomodoro timer service with reflection nudges")]
#[command(version = "0.3.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Focus session length in minutes
    #[arg(long, default_value = "25")]
    pub focus_minutes: u32,

    /// Short break length in minutes
    #[arg(long, default_value = "5")]
    pub short_break_minutes: u32,

    /// Long break length in minutes
    #[arg(long, default_value = "15")]
    pub long_break_minutes: u32,

    /// Take a long break after every Nth completed focus session (0 disables)
    #[arg(long, default_value = "4")]
    pub long_break_every: u32,

    /// How often the running timer is recomputed, in milliseconds
    #[arg(long, default_value = "100")]
    pub poll_interval_ms: u64,

    /// Directory for the local key-value file and the session log
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Keep everything in memory; nothing survives a restart
    #[arg(long)]
    pub ephemeral: bool,

    /// Base route of the reflection (Feynman notes) flow
    #[arg(long, default_value = "/reflection")]
    pub reflection_url: String,

    /// Whether clicking outside the completion dialog counts as a skip
    #[arg(long, value_enum, default_value = "skip")]
    pub dismiss_policy: DismissPolicy,

    /// Do not ring the terminal bell
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Reject settings the timer cannot work with
    pub fn validate(&self) -> Result<(), String> {
        for (name, minutes) in [
            ("focus", self.focus_minutes),
            ("short break", self.short_break_minutes),
            ("long break", self.long_break_minutes),
        ] {
            if minutes == 0 {
                return Err(format!("{} duration must be at least one minute", name));
            }
        }
        if self.poll_interval_ms == 0 {
            return Err("poll interval must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Data directory, defaulting to the platform data dir
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("lockin")
        })
    }

    pub fn mode_durations(&self) -> ModeDurations {
        ModeDurations {
            focus_seconds: i64::from(self.focus_minutes) * 60,
            short_break_seconds: i64::from(self.short_break_minutes) * 60,
            long_break_seconds: i64::from(self.long_break_minutes) * 60,
            long_break_every: self.long_break_every,
        }
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            durations: self.mode_durations(),
            dismiss_policy: self.dismiss_policy,
            reflection_base: self.reflection_url.clone(),
        }
    }
}
