use clap::Args;
use serde_json::Value;

use tender_calc_core::config::{ConfigResolver, ResolvedConstants};

use crate::input;

/// Configuration layer flags shared by every calculating subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// User configuration override (JSON or YAML)
    #[arg(long = "config")]
    pub config: Option<String>,

    /// Replace the embedded packaged defaults with this file
    #[arg(long = "defaults")]
    pub defaults: Option<String>,

    /// Fail instead of running on hard-coded fallback constants
    #[arg(long)]
    pub no_fallback: bool,
}

/// Arguments for printing the resolved configuration
#[derive(Args)]
pub struct ShowConfigArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Resolve constants from the configured files. An unreadable user file is
/// treated as absent; an unreadable defaults file marks the packaged layer
/// unreachable.
pub fn resolve_constants(
    args: &ConfigArgs,
) -> Result<ResolvedConstants, Box<dyn std::error::Error>> {
    let mut resolver = ConfigResolver::new();

    if let Some(ref path) = args.config {
        match input::file::read_config_text(path) {
            Ok(text) => resolver = resolver.with_user_config(text),
            Err(e) => tracing::warn!(path = %path, error = %e, "user configuration unreadable"),
        }
    }

    if let Some(ref path) = args.defaults {
        resolver = match input::file::read_config_text(path) {
            Ok(text) => resolver.with_packaged(text),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "packaged defaults unreadable");
                resolver.without_packaged()
            }
        };
    }

    if args.no_fallback {
        resolver = resolver.without_fallback();
    }

    Ok(resolver.resolve()?)
}

pub fn run_config(args: ShowConfigArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let resolved = resolve_constants(&args.config)?;
    Ok(serde_json::to_value(resolved)?)
}
