use clap::Args;
use serde_json::Value;

use tender_calc_core::session::CalculationSession;

use super::config::{resolve_constants, ConfigArgs};
use crate::input;

/// Arguments for aggregating a session into base totals
#[derive(Args)]
pub struct TotalsArgs {
    /// Path to session file (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Load a session from `--input` or piped stdin.
pub fn load_session(path: Option<&str>) -> Result<CalculationSession, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_document(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--input file is required (or pipe a session JSON on stdin)".into())
    }
}

pub fn run_totals(args: TotalsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let session = load_session(args.input.as_deref())?;
    let resolved = resolve_constants(&args.config)?;
    let totals = session.base_totals(&resolved.constants)?;
    Ok(serde_json::to_value(totals)?)
}
