use serde_json::Value;

use tender_calc_core::schemes::standard_schemes;

pub fn run_schemes() -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(standard_schemes())?)
}
