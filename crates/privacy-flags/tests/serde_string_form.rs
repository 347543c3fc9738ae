use privacy_flags::PrivacyFlags;

#[test]
fn serializes_as_the_canonical_string() {
    let flags = PrivacyFlags::STATUS_ANY | PrivacyFlags::MEMBER_MEM;
    let json = serde_json::to_string(&flags).expect("serialize");
    assert_eq!(json, "\"S-m--\"");
}

#[test]
fn deserializes_from_a_flag_string() {
    let flags: PrivacyFlags = serde_json::from_str("\"SOMAr\"").expect("deserialize");
    assert!(flags.contains(PrivacyFlags::STATUS_ANY | PrivacyFlags::REMOVE_MEM));
    assert_eq!(flags.to_string(), "SOMAr");
}

#[test]
fn rejects_strings_with_unknown_characters() {
    let result = serde_json::from_str::<PrivacyFlags>("\"SOMAx\"");
    let message = result.expect_err("parse must fail").to_string();
    assert!(message.contains("invalid privacy flag character 'x'"));
}
