use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use tender_calc_core::tender::{guarantee_cost, GuaranteeKind};

use super::config::{resolve_constants, ConfigArgs};

/// Arguments for bank guarantee cost
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct GuaranteeArgs {
    /// Secured amount (contract or bid price)
    #[arg(long)]
    pub amount: Decimal,

    /// bid or contract
    #[arg(long, default_value = "bid")]
    pub kind: GuaranteeKind,

    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run_guarantee(args: GuaranteeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let resolved = resolve_constants(&args.config)?;
    let rate = args.kind.rate(&resolved.constants);
    let cost = guarantee_cost(args.amount, args.kind, &resolved.constants)?;
    Ok(json!({
        "result": {
            "cost": cost.to_string(),
            "kind": args.kind,
            "amount": args.amount.to_string(),
            "rate_pct": rate.normalize().to_string(),
        },
        "warnings": resolved.warnings,
    }))
}
