//! Startstop CLI
//!
//! Usage:
//!   startstop manifests/demo.yaml
//!   startstop manifests/demo.yaml --best-effort --stop-timeout-ms 2000
//!   startstop manifests/demo.yaml --dry-run

use startstop::{Manifest, StartStopArgs};

#[tokio::main]
async fn main() {
    let args: StartStopArgs = argh::from_env();

    // Initialize logging
    let log_level = match args.log_level.to_lowercase().as_str() {
        "error" => "error",
        "warn" => "warn",
        "info" => "info",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    };
    let env = env_logger::Env::default().default_filter_or(log_level);
    env_logger::init_from_env(env);

    // Load manifest
    log::info!("Loading manifest: {}", args.manifest);
    let mut manifest = match Manifest::from_file(&args.manifest) {
        Ok(m) => m,
        Err(e) => {
            log::error!("Failed to load manifest: {}", e);
            std::process::exit(1);
        }
    };

    if args.validate {
        println!("Manifest '{}' is valid", args.manifest);
        println!("  Components: {}", manifest.components.len());
        return;
    }

    args.apply_overrides(&mut manifest.settings);
    if let Err(e) = manifest.validate() {
        log::error!("Invalid settings: {}", e);
        std::process::exit(1);
    }

    let graph = match manifest.build_graph() {
        Ok(g) => g,
        Err(e) => {
            log::error!("Failed to build graph: {}", e);
            std::process::exit(1);
        }
    };

    // Dry run mode
    if args.dry_run {
        match graph.plan() {
            Ok(plan) => println!("{}", plan),
            Err(e) => {
                log::error!("Failed to generate start plan: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    log::info!("Running {} components, press Ctrl+C to stop", graph.len());
    graph.run().await;
    log::info!("Startstop exiting");
}
