use clap::{Args, ValueEnum};
use serde_json::Value;
use std::time::Instant;

use tender_calc_core::schemes::{calculate_scheme, find_scheme, standard_schemes, ViewMode};
use tender_calc_core::with_metadata;

use super::config::{resolve_constants, ConfigArgs};
use super::totals::load_session;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ViewArg {
    /// Revenue, payroll, expenses, net profit, profitability
    #[default]
    Headline,
    /// Every line of the waterfall
    Full,
}

impl From<ViewArg> for ViewMode {
    fn from(v: ViewArg) -> Self {
        match v {
            ViewArg::Headline => ViewMode::Headline,
            ViewArg::Full => ViewMode::Full,
        }
    }
}

/// Arguments for comparing every scheme
#[derive(Args)]
pub struct CompareArgs {
    /// Path to session file (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Matrix rows to show
    #[arg(long, value_enum, default_value_t = ViewArg::Headline)]
    pub view: ViewArg,

    /// Only these scheme codes, comma separated
    #[arg(long, value_delimiter = ',')]
    pub schemes: Vec<String>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for evaluating one scheme
#[derive(Args)]
pub struct SchemeArgs {
    /// Path to session file (JSON or YAML)
    #[arg(long)]
    pub input: Option<String>,

    /// Scheme code, e.g. BELUSN
    #[arg(long)]
    pub code: String,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let session = load_session(args.input.as_deref())?;
    let resolved = resolve_constants(&args.config)?;

    let schemes = if args.schemes.is_empty() {
        standard_schemes()
    } else {
        args.schemes
            .iter()
            .map(|code| find_scheme(code).ok_or_else(|| format!("Unknown scheme code '{code}'")))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut output = session.compare(&resolved.constants, &schemes, args.view.into())?;
    output.warnings.extend(resolved.warnings);
    Ok(serde_json::to_value(output)?)
}

pub fn run_scheme(args: SchemeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let descriptor =
        find_scheme(&args.code).ok_or_else(|| format!("Unknown scheme code '{}'", args.code))?;
    let session = load_session(args.input.as_deref())?;
    let resolved = resolve_constants(&args.config)?;

    let base = session.base_totals(&resolved.constants)?;
    let result = calculate_scheme(&base, &resolved.constants, &descriptor)?;

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        &format!("{} tax waterfall", descriptor.name),
        &descriptor,
        resolved.warnings,
        elapsed,
        result,
    );
    Ok(serde_json::to_value(output)?)
}
