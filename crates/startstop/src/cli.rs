//! Command-line interface for startstop

use argh::FromArgs;

use crate::config::{LevelExecution, LifecycleConfig, StopPolicy};

/// Start a graph of simulated components in dependency order, stop it on Ctrl+C
#[derive(FromArgs, Debug)]
pub struct StartStopArgs {
    /// path to the manifest (default: manifests/demo.yaml)
    #[argh(positional, default = "String::from(\"manifests/demo.yaml\")")]
    pub manifest: String,

    /// show start plan without executing
    #[argh(switch)]
    pub dry_run: bool,

    /// validate manifest and exit
    #[argh(switch)]
    pub validate: bool,

    /// keep stopping the remaining components after a failure
    #[argh(switch)]
    pub best_effort: bool,

    /// run the members of a level concurrently
    #[argh(switch)]
    pub concurrent: bool,

    /// override the start phase deadline in milliseconds
    #[argh(option, from_str_fn(parse_timeout))]
    pub start_timeout_ms: Option<u64>,

    /// override the stop phase deadline in milliseconds
    #[argh(option, from_str_fn(parse_timeout))]
    pub stop_timeout_ms: Option<u64>,

    /// log level (error, warn, info, debug, trace)
    #[argh(option, short = 'l', default = "String::from(\"info\")")]
    pub log_level: String,
}

/// Parse a non-zero millisecond timeout
fn parse_timeout(s: &str) -> Result<u64, String> {
    match s.parse::<u64>() {
        Ok(0) => Err("timeout must be greater than zero".to_string()),
        Ok(ms) => Ok(ms),
        Err(e) => Err(format!("Invalid timeout '{}': {}", s, e)),
    }
}

impl StartStopArgs {
    /// Apply command-line overrides on top of the manifest settings
    pub fn apply_overrides(&self, config: &mut LifecycleConfig) {
        if self.best_effort {
            config.stop_policy = StopPolicy::BestEffort;
        }
        if self.concurrent {
            config.level_execution = LevelExecution::Concurrent;
        }
        if let Some(ms) = self.start_timeout_ms {
            config.start_timeout_ms = ms;
        }
        if let Some(ms) = self.stop_timeout_ms {
            config.stop_timeout_ms = ms;
        }
    }
}
