//! Population builder tests.

use mailsim_core::{
    consumer::{informative_perception, Device, Gender},
    population::build_population,
    rng::{RngBank, RngSlot},
};

#[test]
fn population_has_sequential_ids_and_requested_size() {
    let mut rng = RngBank::new(42).for_slot(RngSlot::Population);
    let consumers = build_population(&mut rng, 250).unwrap();
    assert_eq!(consumers.len(), 250);
    for (i, c) in consumers.iter().enumerate() {
        assert_eq!(c.id, i as u32 + 1);
        assert!(c.age >= 18, "consumer {} has age {}", c.id, c.age);
        assert!(c.income >= 2083, "consumer {} has income {}", c.id, c.income);
        assert!(c.mailing_timestamps.is_empty());
        assert!(!c.product_purchase);
    }
}

#[test]
fn same_seed_builds_bit_identical_population() {
    let a = build_population(&mut RngBank::new(7).for_slot(RngSlot::Population), 300).unwrap();
    let b = build_population(&mut RngBank::new(7).for_slot(RngSlot::Population), 300).unwrap();
    for (x, y) in a.iter().zip(&b) {
        assert_eq!((x.age, x.income, x.gender, x.device), (y.age, y.income, y.gender, y.device));
    }
}

#[test]
fn different_seeds_build_different_populations() {
    let a = build_population(&mut RngBank::new(1).for_slot(RngSlot::Population), 100).unwrap();
    let b = build_population(&mut RngBank::new(2).for_slot(RngSlot::Population), 100).unwrap();
    assert!(a.iter().zip(&b).any(|(x, y)| x.age != y.age || x.income != y.income));
}

#[test]
fn derived_attributes_match_demographics() {
    let mut rng = RngBank::new(99).for_slot(RngSlot::Population);
    let consumers = build_population(&mut rng, 500).unwrap();
    for c in &consumers {
        let expected = informative_perception(c.age, c.gender, c.income);
        assert_eq!(c.informative_perception, expected);
        let influence = if c.device == Device::Mobile { 0.9 } else { 0.0 };
        assert_eq!(c.device_influence, influence);
    }
}

#[test]
fn gender_and_device_shares_are_plausible() {
    let mut rng = RngBank::new(5).for_slot(RngSlot::Population);
    let consumers = build_population(&mut rng, 5000).unwrap();
    let male = consumers.iter().filter(|c| c.gender == Gender::Male).count() as f64 / 5000.0;
    let mobile = consumers.iter().filter(|c| c.device == Device::Mobile).count() as f64 / 5000.0;
    assert!((male - 0.59).abs() < 0.03, "male share {male:.3}");
    assert!(mobile > 0.85 && mobile < 0.97, "mobile share {mobile:.3}");
}
