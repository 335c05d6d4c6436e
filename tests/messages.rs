//! Message construction against arbitrary events.

use approx::assert_relative_eq;
use midiosc::{build_message, Error, OscType};
use midiosc_rules::{MessageTemplate, RawEvent};
use proptest::prelude::*;

#[test]
fn test_pitch_bend_to_float() {
    let template = MessageTemplate::new("/bend", "cf", ["0", "%2 [-1,1]"]).unwrap();
    let event = RawEvent::new(&[0xe0, 0x00, 0x40], 0).unwrap();
    assert!(matches!(build_message(&template, &event), Err(Error::Expand { index: 0, .. })));

    let template = MessageTemplate::new("/bend", "f", ["%2 [-1,1]"]).unwrap();
    let message = build_message(&template, &event).unwrap();
    match message.args.as_slice() {
        [OscType::Float(v)] => assert_relative_eq!(*v, -1.0 + 64.0 * 2.0 / 127.0, epsilon = 1e-6),
        other => panic!("unexpected args {:?}", other),
    }
}

proptest! {
    #[test]
    fn prop_arguments_follow_descriptor(
        bytes in prop::collection::vec(any::<u8>(), 1..=3),
        lo in -100.0f32..0.0,
        hi in 1.0f32..100.0,
    ) {
        let template = MessageTemplate::new(
            "/probe",
            "ifs",
            ["%c".to_string(), format!("%1 [{lo},{hi}]"), "%0".to_string()],
        )
        .unwrap();
        let event = RawEvent::new(&bytes, 0).unwrap();
        let message = build_message(&template, &event).unwrap();

        prop_assert_eq!(message.addr.as_str(), "/probe");
        prop_assert_eq!(&message.args[0], &OscType::Int(i32::from(bytes[0] & 0x0f)));
        match &message.args[1] {
            OscType::Float(v) => prop_assert!(*v >= lo && *v <= hi),
            other => prop_assert!(false, "expected float, got {:?}", other),
        }
        prop_assert_eq!(&message.args[2], &OscType::String("%0".into()));
    }
}
