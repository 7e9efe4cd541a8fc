// # ddnsd - DDNS Daemon
//
// Thin integration layer: reads configuration from the environment, builds
// one provider per configured record, publishes a single address to all of
// them and exits. Scheduling and public IP detection run outside this
// binary; invoke it from a timer or a network hook.
//
// No registrar logic and no retries live here.
//
// ## Configuration
//
// - `DDNS_SETTINGS`: JSON settings document, `{"settings": [...]}`
// - `DDNS_IP`: address to publish
// - `DDNS_TIMEOUT_SECS`: per-update deadline in seconds (default 30)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export DDNS_SETTINGS='{"settings":[{"provider":"strato","domain":"example.com","password":"secret"}]}'
// export DDNS_IP=203.0.113.5
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::{DdnsConfig, DnsProvider, ProviderRegistry, UpdateContext};
use std::env;
use std::net::IpAddr;
use std::process::ExitCode;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// - 0: every record updated
/// - 1: configuration or startup error
/// - 2: at least one record failed to update
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    Success = 0,
    ConfigError = 1,
    UpdateFailed = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    settings: DdnsConfig,
    ip: IpAddr,
    timeout: Duration,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let raw_settings = env::var("DDNS_SETTINGS").context(
            "DDNS_SETTINGS is required. \
            Set it via: export DDNS_SETTINGS='{\"settings\":[...]}'",
        )?;
        let settings = DdnsConfig::from_json(&raw_settings).context("parsing DDNS_SETTINGS")?;

        let raw_ip = env::var("DDNS_IP").context("DDNS_IP is required")?;
        let ip = raw_ip
            .trim()
            .parse()
            .with_context(|| format!("DDNS_IP is not an IP address: {}", raw_ip))?;

        let timeout_secs = match env::var("DDNS_TIMEOUT_SECS") {
            Ok(s) => s
                .parse()
                .with_context(|| format!("DDNS_TIMEOUT_SECS is not a number: {}", s))?,
            Err(_) => 30,
        };

        Ok(Self {
            settings,
            ip,
            timeout: Duration::from_secs(timeout_secs),
            log_level: env::var("DDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        if !(1..=300).contains(&self.timeout.as_secs()) {
            anyhow::bail!(
                "DDNS_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.timeout.as_secs()
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    rt.block_on(run(config)).into()
}

fn build_registry() -> ProviderRegistry {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "ddnss")]
    ddns_provider_ddnss::register(&registry);
    #[cfg(feature = "infomaniak")]
    ddns_provider_infomaniak::register(&registry);
    #[cfg(feature = "spdyn")]
    ddns_provider_spdyn::register(&registry);
    #[cfg(feature = "strato")]
    ddns_provider_strato::register(&registry);

    registry
}

/// Publish the configured address to every record
async fn run(config: Config) -> DdnsExitCode {
    let registry = build_registry();
    info!(providers = ?registry.list_providers(), "registered providers");

    let providers = match registry.create_all(&config.settings) {
        Ok(providers) => providers,
        Err(e) => {
            error!("Invalid record settings: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let client = match ddns_core::protocol::transport::build_client(config.timeout) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let (ctx, cancel) = UpdateContext::new()
        .with_timeout(config.timeout)
        .cancellable();

    let mut updates = JoinSet::new();
    for provider in providers {
        if !provider.ip_version().admits(config.ip) {
            info!(record = %provider, ip = %config.ip, "skipping record of another address family");
            continue;
        }
        let ctx = ctx.clone();
        let client = client.clone();
        let ip = config.ip;
        updates.spawn(async move { update_one(provider.as_ref(), &ctx, &client, ip).await });
    }

    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);
    let mut cancelled = false;

    let mut failed = 0usize;
    let mut succeeded = 0usize;
    loop {
        tokio::select! {
            joined = updates.join_next() => match joined {
                Some(Ok(true)) => succeeded += 1,
                Some(Ok(false)) => failed += 1,
                Some(Err(e)) => {
                    error!("Update task failed: {}", e);
                    failed += 1;
                }
                None => break,
            },
            signal = &mut shutdown, if !cancelled => {
                if cancels_updates(&signal) {
                    cancel.cancel();
                }
                cancelled = true;
            }
        }
    }

    info!(succeeded, failed, "update run finished");

    if failed == 0 {
        DdnsExitCode::Success
    } else {
        DdnsExitCode::UpdateFailed
    }
}

async fn update_one(
    provider: &dyn DnsProvider,
    ctx: &UpdateContext,
    client: &reqwest::Client,
    ip: IpAddr,
) -> bool {
    match provider.update(ctx, client, ip).await {
        Ok(result) => {
            info!(record = %provider, ip = %result.ip(), ?result, "record up to date");
            true
        }
        Err(e) => {
            warn!(
                record = %provider,
                kind = ?e.kind(),
                retryable = e.is_retryable(),
                "update failed: {}",
                e
            );
            false
        }
    }
}

/// Whether the outcome of waiting for a shutdown signal should cancel updates
///
/// A broken signal handler is logged and leaves the running updates alone.
fn cancels_updates(signal: &Result<&'static str>) -> bool {
    match signal {
        Ok(name) => {
            warn!("Received {}, cancelling in-flight updates", name);
            true
        }
        Err(e) => {
            warn!("Signal handling failed, updates continue: {:#}", e);
            false
        }
    }
}

/// Wait for SIGTERM or SIGINT
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    tokio::select! {
        _ = sigterm.recv() => Ok("SIGTERM"),
        _ = sigint.recv() => Ok("SIGINT"),
    }
}

/// Wait for CTRL-C
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
