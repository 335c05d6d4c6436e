//! Matching, expansion and config round-trip properties.

use approx::assert_relative_eq;
use midiosc_rules::{
    expand_float, expand_int, parse_config, render_config, FieldSpec, MessageTemplate, RawEvent,
    Rule, RuleSet, Settings,
};
use proptest::prelude::*;

fn event(bytes: &[u8]) -> RawEvent {
    RawEvent::new(bytes, 0).unwrap()
}

#[test]
fn test_noteon_class_ignores_channel() {
    let rule = Rule::new(&[FieldSpec::parse("NOTEON", 0).unwrap()]).unwrap();
    assert!(!rule.matches(&event(&[0x91, 0x3c, 0x7f])));

    let rule = Rule::any_length(&[FieldSpec::parse("NOTEON", 0).unwrap()]).unwrap();
    assert!(rule.matches(&event(&[0x91, 0x3c, 0x7f])));
    assert!(rule.matches(&event(&[0x9f, 0x00, 0x00])));
    assert!(!rule.matches(&event(&[0x81, 0x3c, 0x7f])));
}

#[test]
fn test_table_driven_matching() {
    let cases: &[(&str, &[u8], bool)] = &[
        ("CC 7", &[0xb0, 0x07, 0x40], false),
        ("CC 7 ANY", &[0xb0, 0x07, 0x40], true),
        ("CC 7 ANY", &[0xb3, 0x07, 0x00], true),
        ("CC 7 ANY", &[0xb0, 0x08, 0x40], false),
        ("0xb0/0xff 7 ANY", &[0xb1, 0x07, 0x40], false),
        ("0xf8", &[0xf8], true),
        ("0xf8", &[0xf9], false),
        ("ANY *", &[0xfe], true),
        ("ANY *", &[0x90, 0x3c, 0x7f], true),
        ("ANY ANY", &[0xfe], false),
        ("NOTE ANY ANY", &[0x83, 0x01, 0x02], true),
        ("NOTE ANY ANY", &[0x9a, 0x01, 0x02], true),
        ("NOTE ANY ANY", &[0xa0, 0x01, 0x02], false),
        ("PGM ANY", &[0xc5, 0x10], true),
        ("Pitch ANY 0x40/0x40", &[0xe0, 0x00, 0x7f], true),
        ("Pitch ANY 0x40/0x40", &[0xe0, 0x00, 0x3f], false),
    ];

    for (filter, bytes, expected) in cases {
        let text = format!("[rule]\n{}\n", filter);
        let parsed = parse_config(&text).unwrap();
        assert!(parsed.diagnostics.is_empty(), "{filter}: {:?}", parsed.diagnostics);
        let rule = parsed.rules.get(0).unwrap();
        assert_eq!(rule.matches(&event(bytes)), *expected, "{filter} vs {bytes:02x?}");
    }
}

#[test]
fn test_all_matching_rules_fire_in_order() {
    let parsed = parse_config(
        "[rule]\nCC ANY ANY\n[rule]\nNOTEON ANY ANY\n[rule]\nANY *\n[rule]\n0xb0 1 ANY\n",
    )
    .unwrap();
    let hits: Vec<usize> = parsed
        .rules
        .matching(&event(&[0xb0, 0x01, 0x10]))
        .map(|(index, _)| index)
        .collect();
    assert_eq!(hits, vec![0, 2, 3]);
}

#[test]
fn test_float_remap_half_scale() {
    let ev = event(&[0xb0, 64, 0]);
    let value = expand_float("%1 [0,1]", &ev).unwrap();
    assert_relative_eq!(value, 0.503_937, epsilon = 1e-5);
}

#[test]
fn test_negative_float_targets() {
    let ev = event(&[0xb0, 0x07, 0x7f]);
    assert_relative_eq!(expand_float("%2 [-60,6]", &ev).unwrap(), 6.0);
    let ev = event(&[0xb0, 0x07, 0x00]);
    assert_relative_eq!(expand_float("%2 [-60,6]", &ev).unwrap(), -60.0);
}

fn field_spec() -> impl Strategy<Value = FieldSpec> {
    (any::<u8>(), any::<u8>()).prop_map(|(match_, mask)| FieldSpec::new(match_ & mask, mask))
}

fn param(kind: char) -> BoxedStrategy<String> {
    match kind {
        's' => "[a-zA-Z0-9 /%_.-]{0,12}".boxed(),
        'i' => prop_oneof![
            any::<i32>().prop_map(|v| v.to_string()),
            "%[012cs]( \\[-?[0-9]{1,3},-?[0-9]{1,3}\\])?",
        ]
        .boxed(),
        _ => prop_oneof![
            (-1000.0f32..1000.0).prop_map(|v| v.to_string()),
            "%[012cs]( \\[-?[0-9]{1,2}\\.[0-9],[0-9]{1,2}\\])?",
        ]
        .boxed(),
    }
}

fn template() -> impl Strategy<Value = MessageTemplate> {
    ("/[a-z]{1,8}(/[a-z0-9_]{1,8}){0,2}", "[ifs]{0,4}")
        .prop_flat_map(|(address, descriptor)| {
            let params: Vec<_> = descriptor.chars().map(param).collect();
            (Just(address), Just(descriptor), params)
        })
        .prop_map(|(address, descriptor, params)| {
            MessageTemplate::new(address, descriptor, params).unwrap()
        })
}

fn rule() -> impl Strategy<Value = Rule> {
    (
        prop::collection::vec(field_spec(), 1..=3),
        any::<bool>(),
        prop::collection::vec(template(), 0..4),
    )
        .prop_map(|(fields, any_length, templates)| {
            let rule = if any_length {
                Rule::any_length(&fields)
            } else {
                Rule::new(&fields)
            };
            templates
                .into_iter()
                .fold(rule.unwrap(), |rule, t| rule.with_template(t))
        })
}

proptest! {
    #[test]
    fn prop_match_is_masked_equality(
        fields in prop::collection::vec(field_spec(), 1..=3),
        bytes in prop::collection::vec(any::<u8>(), 1..=3),
    ) {
        let rule = Rule::new(&fields).unwrap();
        let ev = event(&bytes);
        let expected = fields.len() == bytes.len()
            && bytes.iter().zip(&fields).all(|(b, f)| b & f.mask == f.match_);
        prop_assert_eq!(rule.matches(&ev), expected);
    }

    #[test]
    fn prop_int_remap_stays_within_target(
        value in 0u8..128,
        t0 in -1000i32..1000,
        t1 in -1000i32..1000,
        s0 in 0i64..127,
        span in 1i64..128,
    ) {
        let s1 = (s0 + span).min(127);
        prop_assume!(s0 < s1);
        let ev = event(&[0xb0, value, 0]);
        let out = expand_int(&format!("%1 [{t0},{t1}] [{s0},{s1}]"), &ev).unwrap();
        prop_assert!(out >= t0.min(t1) && out <= t0.max(t1));
        if i64::from(value) <= s0 {
            prop_assert_eq!(out, t0);
        }
        if i64::from(value) >= s1 {
            prop_assert_eq!(out, t1);
        }
    }

    #[test]
    fn prop_config_round_trip(rules in prop::collection::vec(rule(), 0..5)) {
        let rules: RuleSet = rules.into_iter().collect();
        let text = render_config(&Settings::default(), &rules);
        let parsed = parse_config(&text).unwrap();
        prop_assert!(parsed.diagnostics.is_empty(), "{:?}\n{}", parsed.diagnostics, text);
        prop_assert_eq!(parsed.rules, rules);
    }
}
