//! Opening model tests.

use mailsim_core::{
    consumer::{Consumer, Device, Gender},
    email::EmailTemplate,
    opening_model::{
        decide, frequency_term, perceived_value, timespan_term, Personalization,
        PersonalizationRule,
    },
};

/// Age 30, female, income below every band: perception exactly 0.
fn neutral_consumer() -> Consumer {
    Consumer::new(1, 30, 3000, Gender::Female, Device::Desktop)
}

/// Monday send (influence 0) with a short subject.
fn monday_email(length: u32) -> EmailTemplate {
    EmailTemplate::new(1, length, 0)
}

#[test]
fn neutral_consumer_gets_intercept_only() {
    let consumer = neutral_consumer();
    assert_eq!(consumer.informative_perception, 0.0);
    let email = monday_email(5);
    assert_eq!(email.sending_day_influence, 0.0);

    let rule = PersonalizationRule::for_consumer(&consumer);
    let decision = decide(&consumer, &email, &rule);
    assert!((decision.logit - (-1.6)).abs() < 1e-12, "logit {}", decision.logit);
    assert!((decision.probability - 0.1680).abs() < 1e-4, "p {}", decision.probability);
    assert!(!decision.opens);
    assert_eq!(decision.personalization, Personalization::None);
}

#[test]
fn perceived_value_flips_sign_on_short_subjects() {
    let long = monday_email(9);
    let short = monday_email(7);
    assert_eq!(perceived_value(0.4, &long), 0.4);
    assert_eq!(perceived_value(0.4, &short), -0.4);
    assert_eq!(perceived_value(-1.2, &long), -1.2);
    assert_eq!(perceived_value(-1.2, &short), 1.2);
    assert_eq!(perceived_value(0.0, &long), 0.0);
    assert_eq!(perceived_value(0.0, &short), 0.0);
}

#[test]
fn timespan_term_saturates_at_three_days() {
    assert_eq!(timespan_term(0), 0.0);
    assert!((timespan_term(2) - 1.6).abs() < 1e-12);
    assert_eq!(timespan_term(3), 2.4);
    assert_eq!(timespan_term(40), 2.4);
}

#[test]
fn frequency_term_is_quadratic() {
    let none = PersonalizationRule::NONE;
    let product = PersonalizationRule::PRODUCT_BASED;
    assert!((frequency_term(2, &none) - 0.0).abs() < 1e-12);
    assert!((frequency_term(3, &product) - 0.0).abs() < 1e-12);
    assert!((frequency_term(1, &product) - 0.2).abs() < 1e-12);
    assert!((frequency_term(5, &none) - (-1.5)).abs() < 1e-12);
}

#[test]
fn buyers_get_product_based_personalization() {
    let mut consumer = neutral_consumer();
    consumer.record_purchase(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    consumer.prior_email_opening = true;
    let rule = PersonalizationRule::for_consumer(&consumer);
    assert_eq!(rule, PersonalizationRule::PRODUCT_BASED);

    let decision = decide(&consumer, &monday_email(5), &rule);
    // -1.6 + 0.2 (personalization) + 0.7 (prior opening)
    assert!((decision.logit - (-0.7)).abs() < 1e-12, "logit {}", decision.logit);
    assert_eq!(decision.personalization, Personalization::ProductBased);
    assert!(!decision.opens);
}

#[test]
fn mobile_reader_with_saturated_timespan_opens() {
    let mut consumer = Consumer::new(2, 25, 3000, Gender::Female, Device::Mobile);
    consumer.timespan = 7;
    consumer.mailing_frequency = 1;
    let rule = PersonalizationRule::for_consumer(&consumer);
    let decision = decide(&consumer, &monday_email(5), &rule);
    // -1.6 + 0.1 (frequency) + 2.4 (timespan) + 0.9 (mobile)
    assert!((decision.logit - 1.8).abs() < 1e-12, "logit {}", decision.logit);
    assert!(decision.opens);
}

#[test]
fn sending_day_influence_enters_logit() {
    let consumer = neutral_consumer();
    let wednesday = EmailTemplate::new(3, 5, 2);
    let decision = decide(&consumer, &wednesday, &PersonalizationRule::NONE);
    assert!((decision.logit - (-2.1)).abs() < 1e-12);
}

#[test]
fn buyer_on_mobile_who_opened_before_opens() {
    let mut consumer = Consumer::new(3, 30, 3000, Gender::Female, Device::Mobile);
    consumer.record_purchase(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    consumer.prior_email_opening = true;
    let rule = PersonalizationRule::for_consumer(&consumer);
    let decision = decide(&consumer, &monday_email(5), &rule);
    // -1.6 + 0.2 (personalization) + 0.7 (prior opening) + 0.9 (mobile)
    assert!((decision.logit - 0.2).abs() < 1e-9);
    assert!(decision.opens);
}

#[test]
fn personalization_label_matches_serialized_form() {
    for p in [Personalization::None, Personalization::ProductBased] {
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, format!("\"{}\"", p.label()));
    }
    assert_eq!(
        serde_json::to_string(&Personalization::ProductBased).unwrap(),
        "\"product-based\""
    );
}
