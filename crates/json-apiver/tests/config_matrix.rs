//! `CodecOptions` loaded from TOML, and how each option changes codec behavior.

use json_apiver::{
    ApiVersion, Codec, CodecOptions, FieldSpec, Reason, RecordSchema, TypeDesc, Value,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ServiceConfig {
    version: ApiVersion,
    #[serde(default)]
    codec: CodecOptions,
}

fn schema() -> TypeDesc {
    TypeDesc::record(
        RecordSchema::new(
            "Obj",
            [
                FieldSpec::new("foo", TypeDesc::i64()),
                FieldSpec::new("late", TypeDesc::i64()).since(ApiVersion::new(1, 4)),
            ],
        )
        .expect("valid schema"),
    )
}

#[test]
fn empty_table_uses_defaults() {
    let config: ServiceConfig = toml::from_str(r#"version = "1.2""#).unwrap();
    assert_eq!(config.version, ApiVersion::new(1, 2));
    assert_eq!(config.codec, CodecOptions::default());
}

#[test]
fn full_table_is_read() {
    let config: ServiceConfig = toml::from_str(
        r#"
        version = "v2.10"

        [codec]
        reject_unknown_fields = true
        strict_versioned_fields = false
        indent = "  "
        "#,
    )
    .unwrap();
    assert_eq!(config.version, ApiVersion::new(2, 10));
    assert_eq!(
        config.codec,
        CodecOptions::default()
            .reject_unknown_fields(true)
            .strict_versioned_fields(false)
            .indent("  ")
    );
}

#[test]
fn bad_version_is_a_config_error() {
    let err = toml::from_str::<ServiceConfig>(r#"version = "one.two""#).unwrap_err();
    assert!(err.to_string().contains("one.two"), "{err}");
}

#[test]
fn strict_default_rejects_required_versioned_field() {
    let err = Codec::new(schema()).unwrap_err();
    assert!(err.is_internal());
    assert!(matches!(err.reason(), Reason::RequiredVersionedField { .. }));
}

#[test]
fn loaded_options_drive_the_codec() {
    let config: ServiceConfig = toml::from_str(
        r#"
        version = "1.3"

        [codec]
        reject_unknown_fields = true
        strict_versioned_fields = false
        indent = "  "
        "#,
    )
    .unwrap();
    let codec = Codec::with_options(schema(), config.codec).unwrap();

    let mut target = Value::zero(codec.schema());
    let err = codec
        .decode(br#"{"foo": 1, "late": 2}"#, &mut target, config.version)
        .unwrap_err();
    assert_eq!(err.reason(), &Reason::UnknownField("late".into()));

    codec
        .decode(br#"{"foo": 1}"#, &mut target, config.version)
        .unwrap();
    let out = codec.encode(&target, config.version).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"foo\": 1\n}");
}
