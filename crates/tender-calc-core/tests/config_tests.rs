use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use tender_calc_core::config::{ConfigLayer, ConfigResolver, Constants};
use tender_calc_core::TenderCalcError;

#[test]
fn test_unreachable_packaged_without_user_uses_fallback() {
    let resolved = ConfigResolver::new().without_packaged().resolve().unwrap();
    assert_eq!(resolved.source, ConfigLayer::Fallback);
    assert_eq!(resolved.constants, Constants::fallback());
    assert_eq!(resolved.constants.vat_rate, dec!(20));
    assert_eq!(resolved.constants.payroll_net_factor, dec!(0.87));
}

#[test]
fn test_user_layer_beats_packaged_per_leaf() {
    let user = r#"{
        "taxes": { "profit": "0,2" },
        "salary": { "official_default": "30 000" },
        "cashout": { "commission": "oops" }
    }"#;
    let resolved = ConfigResolver::new().with_user_config(user).resolve().unwrap();
    let c = resolved.constants;
    assert_eq!(resolved.source, ConfigLayer::User);
    assert_eq!(c.profit_tax_rate, dec!(20));
    assert_eq!(c.official_salary_floor, dec!(30000));
    // Unparseable leaf counts as absent and falls back to the packaged value
    assert_eq!(c.cash_out_commission_rate, dec!(15));
    assert_eq!(c.vat_rate, dec!(22));
}

#[test]
fn test_replaced_packaged_text() {
    let resolved = ConfigResolver::new()
        .with_packaged(r#"{"taxes": {"ndfl": 0.15}}"#)
        .resolve()
        .unwrap();
    assert_eq!(resolved.source, ConfigLayer::Packaged);
    assert_eq!(resolved.constants.ndfl_rate, dec!(15));
    assert_eq!(resolved.constants.payroll_net_factor, dec!(0.85));
    // Leaves missing from the replacement come from the hard-coded values
    assert_eq!(resolved.constants.vat_rate, dec!(20));
    assert_eq!(resolved.constants.official_salary_floor, dec!(27093));
}

#[test]
fn test_total_absence_is_an_error_only_without_fallback() {
    let ok = ConfigResolver::new()
        .with_user_config("not json")
        .without_packaged()
        .resolve();
    assert!(ok.is_ok());

    let err = ConfigResolver::new()
        .with_user_config("not json")
        .without_packaged()
        .without_fallback()
        .resolve();
    assert!(matches!(err, Err(TenderCalcError::ConfigUnavailable(_))));
}
