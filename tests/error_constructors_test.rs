use foxflow::error::FoxflowError;

#[test]
fn error_constructors_group_1() {
    assert!(matches!(
        FoxflowError::config("x"),
        FoxflowError::Config { .. }
    ));
    assert!(matches!(
        FoxflowError::validation("f", "m"),
        FoxflowError::Validation { .. }
    ));
    assert!(matches!(FoxflowError::io("x"), FoxflowError::Io { .. }));
}

#[test]
fn error_constructors_group_2() {
    let ser = FoxflowError::Serialization {
        message: "s".into(),
    };
    assert!(matches!(ser, FoxflowError::Serialization { .. }));
    assert!(matches!(
        FoxflowError::api(40257, "x"),
        FoxflowError::Api { errno: 40257, .. }
    ));
    assert!(matches!(FoxflowError::parse("x"), FoxflowError::Parse { .. }));
    assert!(matches!(
        FoxflowError::generic("x"),
        FoxflowError::Generic { .. }
    ));
}

#[test]
fn api_error_message_carries_errno() {
    let err = FoxflowError::api(41930, "rate limited");
    assert_eq!(err.to_string(), "API error 41930: rate limited");
}

#[test]
fn conversions_keep_their_category() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(FoxflowError::from(io), FoxflowError::Io { .. }));

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(
        FoxflowError::from(json),
        FoxflowError::Serialization { .. }
    ));
}
