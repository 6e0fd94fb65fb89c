//! Mailing calendar tests.

use chrono::NaiveDate;
use mailsim_core::{
    clock::weekday_index,
    config::SimConfig,
    mailing_schedule::build_mailing_schedule,
    rng::{RngBank, RngSlot},
    types::year_month,
};
use std::collections::BTreeMap;

fn end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

#[test]
fn dates_increase_and_match_template_weekday() {
    let config = SimConfig::default_test();
    let mut rng = RngBank::new(42).for_slot(RngSlot::Mailing);
    let schedule = build_mailing_schedule(&mut rng, &config, end_date()).unwrap();

    assert!(!schedule.is_empty(), "a year with quota 4 must produce mailings");
    for pair in schedule.entries.windows(2) {
        assert!(pair[0].date < pair[1].date, "dates must be strictly increasing");
    }
    for m in &schedule.entries {
        assert_eq!(
            m.email.sending_day,
            weekday_index(m.date),
            "email {} scheduled on the wrong weekday",
            m.email.id
        );
    }
}

#[test]
fn template_ids_are_sequential_from_one() {
    let config = SimConfig::default_test();
    let mut rng = RngBank::new(3).for_slot(RngSlot::Mailing);
    let schedule = build_mailing_schedule(&mut rng, &config, end_date()).unwrap();
    for (i, m) in schedule.entries.iter().enumerate() {
        assert_eq!(m.email.id, i as u32 + 1);
    }
    let dropped = schedule.dropped.expect("one template is always left waiting");
    assert_eq!(dropped.id, schedule.entries.len() as u32 + 1);
}

#[test]
fn monthly_counts_respect_quota() {
    let mut config = SimConfig::default_test();
    config.mailing_quota_per_month.insert("03".into(), 1);
    config.mailing_quota_per_month.insert("11".into(), 0);
    let mut rng = RngBank::new(17).for_slot(RngSlot::Mailing);
    let schedule = build_mailing_schedule(&mut rng, &config, end_date()).unwrap();

    let mut counted: BTreeMap<String, u32> = BTreeMap::new();
    for m in &schedule.entries {
        *counted.entry(year_month(m.date)).or_insert(0) += 1;
    }
    assert_eq!(counted, schedule.per_month);
    for (ym, count) in &counted {
        let quota = config.mailing_quota(&ym[5..]);
        assert!(*count <= quota, "{ym}: {count} mailings over quota {quota}");
    }
    assert!(!counted.contains_key("2023-11"), "November has a zero quota");
}

#[test]
fn schedule_covers_only_the_horizon() {
    let config = SimConfig::default_test();
    let mut rng = RngBank::new(8).for_slot(RngSlot::Mailing);
    let schedule = build_mailing_schedule(&mut rng, &config, end_date()).unwrap();
    let start = end_date() - chrono::Duration::days(i64::from(config.horizon_days));
    for m in &schedule.entries {
        assert!(m.date > start && m.date <= end_date(), "{} outside horizon", m.date);
    }
}

#[test]
fn wider_steps_only_land_on_step_days() {
    let mut config = SimConfig::default_test();
    config.step_days = 7;
    let mut rng = RngBank::new(8).for_slot(RngSlot::Mailing);
    let schedule = build_mailing_schedule(&mut rng, &config, end_date()).unwrap();
    let start = end_date() - chrono::Duration::days(i64::from(config.horizon_days));
    for m in &schedule.entries {
        assert_eq!((m.date - start).num_days() % 7, 0);
    }
}
