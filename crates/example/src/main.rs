//! Example registry boot.
//!
//! Loads `.env`, reads `OC_*` configuration from the environment, starts a
//! registry with the demo plugins and authenticates a user through them.
//!
//! # Usage
//!
//! ```bash
//! OC_LOG_FORMAT=compact OC_VERBOSE=1 oc-registry [username] [password]
//! ```

use std::process::ExitCode;

use example::{AUTHENTICATION, DemoPlugins};
use oc_core::{RegistryConfig, init_tracing};
use oc_registry::Registry;
use serde_json::json;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let config = match RegistryConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&RegistryConfig::default().tracing());
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.tracing());

    let mut args = std::env::args().skip(1);
    let username = args.next().unwrap_or_else(|| "admin".to_owned());
    let password = args.next().unwrap_or_else(|| "admin".to_owned());

    let mut registry = Registry::new(config);
    registry
        .on("start", |data| tracing::info!(plugins = %data["plugins"], "registry ready"))
        .on("error", |data| {
            let message = data["message"].as_str().unwrap_or_default();
            tracing::error!(code = %data["code"], "{message}");
        })
        .on("stop", |_| tracing::info!("registry stopped"));

    if let Err(e) = registry.register_group(DemoPlugins::default()) {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }

    let started = registry.start().await.map(|plugins| {
        plugins.call(
            AUTHENTICATION,
            json!({ "username": &username, "password": password }),
        )
    });
    let Ok(authenticated) = started else {
        registry.close();
        return ExitCode::FAILURE;
    };

    let code = match authenticated {
        Ok(result) => {
            tracing::info!(%username, authenticated = %result, "authentication checked");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(%username, "authentication failed: {e}");
            ExitCode::FAILURE
        }
    };

    registry.close();
    code
}
