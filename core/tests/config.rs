//! Settings validation tests.

use mailsim_core::{config::SimConfig, error::SimError};

fn assert_config_error(config: &SimConfig) {
    match config.validate() {
        Err(SimError::Configuration(_)) => {}
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

#[test]
fn default_test_config_is_valid() {
    SimConfig::default_test().validate().unwrap();
}

#[test]
fn bundled_settings_file_loads() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
    let config = SimConfig::load(dir).unwrap();
    assert_eq!(config.weekday_names.len(), 7);
    assert_eq!(config.mailing_quota_per_month.len(), 12);
}

#[test]
fn non_positive_sizes_are_rejected() {
    let mut c = SimConfig::default_test();
    c.population_size = 0;
    assert_config_error(&c);

    let mut c = SimConfig::default_test();
    c.horizon_days = 0;
    assert_config_error(&c);

    let mut c = SimConfig::default_test();
    c.step_days = 0;
    assert_config_error(&c);
}

#[test]
fn malformed_month_maps_are_rejected() {
    let mut c = SimConfig::default_test();
    c.mailing_quota_per_month.remove("07");
    assert_config_error(&c);

    let mut c = SimConfig::default_test();
    c.purchase_share_per_month.insert("13".into(), 0.0);
    assert_config_error(&c);
}

#[test]
fn purchase_shares_must_not_exceed_one() {
    let mut c = SimConfig::default_test();
    c.purchase_share_per_month.insert("01".into(), 0.5);
    assert_config_error(&c);

    let mut c = SimConfig::default_test();
    c.purchase_share_per_month.insert("02".into(), -0.01);
    assert_config_error(&c);
}

#[test]
fn buyer_share_and_weekday_names_are_checked() {
    let mut c = SimConfig::default_test();
    c.buyer_share = 1.5;
    assert_config_error(&c);

    let mut c = SimConfig::default_test();
    c.weekday_names.pop();
    assert_config_error(&c);
}
