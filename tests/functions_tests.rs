// tests/functions_tests.rs

use chrono::{NaiveDate, NaiveDateTime};
use gql_lang::{
    CastFunction, CastOutput, GeoPt, GqlError, Key, KeyId, PathElement, TermFunction, Value,
};

fn int(n: i64) -> Value {
    Value::Integer(n)
}

fn text(s: &str) -> Value {
    Value::String(s.to_string())
}

fn timestamp(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Value {
    let ts: NaiveDateTime = NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap();
    Value::Timestamp(ts)
}

fn apply(function: CastFunction, values: &[Value]) -> Result<Value, GqlError> {
    match function.apply(values, None)? {
        CastOutput::Value(value) => Ok(value),
        CastOutput::List(values) => panic!("unexpected list output: {:?}", values),
    }
}

fn assert_bad(function: CastFunction, values: &[Value]) {
    let err = function.apply(values, None).unwrap_err();
    assert!(err.is_bad_query(), "{} {:?} gave {:?}", function, values, err);
}

// ============================================================================
// Name lookup
// ============================================================================

#[test]
fn test_from_name() {
    let test_cases = vec![
        ("KEY", CastFunction::Key),
        ("key", CastFunction::Key),
        ("Date", CastFunction::Date),
        ("DATETIME", CastFunction::DateTime),
        ("time", CastFunction::Time),
        ("GeoPt", CastFunction::GeoPt),
        ("USER", CastFunction::User),
    ];

    for (input, expected) in test_cases {
        assert_eq!(CastFunction::from_name(input), Some(expected), "Failed for input: {}", input);
    }
    assert_eq!(CastFunction::from_name("list"), None);
    assert_eq!(CastFunction::from_name("nop"), None);
    assert_eq!(CastFunction::from_name("lookup"), None);
}

// ============================================================================
// nop / user
// ============================================================================

#[test]
fn test_nop_not_callable() {
    assert_eq!(
        TermFunction::Nop.call(&[text("any arg")], None),
        Err(GqlError::NotImplemented("nop"))
    );
}

#[test]
fn test_user_not_implemented() {
    assert_eq!(
        CastFunction::User.apply(&[text("test@example.com")], None),
        Err(GqlError::NotImplemented("user"))
    );
    assert_eq!(
        TermFunction::Cast(CastFunction::User).call(&[text("x")], None),
        Err(GqlError::NotImplemented("user"))
    );
}

// ============================================================================
// list
// ============================================================================

#[test]
fn test_list() {
    let output = CastFunction::List
        .apply(&[int(1), text("a"), Value::Null], None)
        .unwrap();
    assert_eq!(output, CastOutput::List(vec![int(1), text("a"), Value::Null]));
}

#[test]
fn test_empty_list() {
    assert_bad(CastFunction::List, &[]);
}

// ============================================================================
// key
// ============================================================================

#[test]
fn test_key() {
    let value = apply(CastFunction::Key, &[text("parent"), text("c"), text("child"), int(42)]).unwrap();
    let expected = Key {
        namespace: None,
        path: vec![
            PathElement {
                kind: "parent".to_string(),
                id: KeyId::Name("c".to_string()),
            },
            PathElement {
                kind: "child".to_string(),
                id: KeyId::Id(42),
            },
        ],
    };
    assert_eq!(value, Value::Key(expected));
    assert_eq!(value.to_string(), "Key('parent', 'c', 'child', 42)");
}

#[test]
fn test_key_takes_namespace() {
    let output = CastFunction::Key
        .apply(&[text("Kind"), int(1)], Some("test-namespace"))
        .unwrap();
    let CastOutput::Value(Value::Key(key)) = output else {
        panic!("expected a key");
    };
    assert_eq!(key.namespace.as_deref(), Some("test-namespace"));
    assert_eq!(key.to_string(), "Key('Kind', 1, namespace='test-namespace')");
}

#[test]
fn test_key_errors() {
    assert_bad(CastFunction::Key, &[]);
    assert_bad(CastFunction::Key, &[text("Kind")]);
    assert_bad(CastFunction::Key, &[int(100), int(200), int(300)]);
    assert_bad(CastFunction::Key, &[text("Kind"), int(1), text("Other")]);
    assert_bad(CastFunction::Key, &[int(1), int(1)]);
    assert_bad(CastFunction::Key, &[text(""), int(1)]);
    assert_bad(CastFunction::Key, &[text("Kind"), int(0)]);
    assert_bad(CastFunction::Key, &[text("Kind"), int(-3)]);
    assert_bad(CastFunction::Key, &[text("Kind"), text("")]);
    assert_bad(CastFunction::Key, &[text("Kind"), Value::Float(1.0)]);
}

// ============================================================================
// date / datetime / time
// ============================================================================

#[test]
fn test_date() {
    let expected = timestamp(2020, 3, 26, 0, 0, 0);
    assert_eq!(apply(CastFunction::Date, &[text("2020-03-26")]).unwrap(), expected);
    assert_eq!(
        apply(CastFunction::Date, &[int(2020), int(3), int(26)]).unwrap(),
        expected
    );
}

#[test]
fn test_date_errors() {
    assert_bad(CastFunction::Date, &[text("2020-13-01")]);
    assert_bad(CastFunction::Date, &[text("26/03/2020")]);
    assert_bad(CastFunction::Date, &[int(2020)]);
    assert_bad(CastFunction::Date, &[int(2020), int(3)]);
    assert_bad(CastFunction::Date, &[int(2020), int(2), int(30)]);
    assert_bad(CastFunction::Date, &[int(2020), text("3"), int(26)]);
    assert_bad(CastFunction::Date, &[]);
    assert_bad(CastFunction::Date, &[int(100), int(200), int(300)]);
    assert_bad(CastFunction::Date, &[int(1), int(2), int(3), int(4)]);

    let err = CastFunction::Date.apply(&[int(2020)], None).unwrap_err();
    assert!(err.to_string().contains("Invalid argument for date function"));
}

#[test]
fn test_datetime() {
    let expected = timestamp(2020, 3, 26, 12, 45, 5);
    assert_eq!(
        apply(CastFunction::DateTime, &[text("2020-03-26 12:45:05")]).unwrap(),
        expected
    );
    assert_eq!(
        apply(
            CastFunction::DateTime,
            &[int(2020), int(3), int(26), int(12), int(45), int(5)]
        )
        .unwrap(),
        expected
    );
}

#[test]
fn test_datetime_errors() {
    assert_bad(CastFunction::DateTime, &[text("2020-03-26")]);
    assert_bad(CastFunction::DateTime, &[int(2020), int(3), int(26)]);
    assert_bad(
        CastFunction::DateTime,
        &[int(2020), int(3), int(26), int(24), int(0), int(0)],
    );
}

#[test]
fn test_time() {
    assert_eq!(
        apply(CastFunction::Time, &[text("12:45:05")]).unwrap(),
        timestamp(1970, 1, 1, 12, 45, 5)
    );
    assert_eq!(
        apply(CastFunction::Time, &[int(12), int(45), int(5)]).unwrap(),
        timestamp(1970, 1, 1, 12, 45, 5)
    );
    assert_eq!(
        apply(CastFunction::Time, &[int(12), int(45)]).unwrap(),
        timestamp(1970, 1, 1, 12, 45, 0)
    );
    assert_eq!(
        apply(CastFunction::Time, &[int(12)]).unwrap(),
        timestamp(1970, 1, 1, 12, 0, 0)
    );
}

#[test]
fn test_time_errors() {
    assert_bad(CastFunction::Time, &[text("25:00:00")]);
    assert_bad(CastFunction::Time, &[Value::Float(12.5)]);
    assert_bad(CastFunction::Time, &[int(12), int(60)]);
    assert_bad(CastFunction::Time, &[int(1), int(2), int(3), int(4)]);
    assert_bad(CastFunction::Time, &[]);
}

// ============================================================================
// geopt
// ============================================================================

#[test]
fn test_geopt() {
    let value = apply(CastFunction::GeoPt, &[Value::Float(48.85), int(2)]).unwrap();
    assert_eq!(value, Value::GeoPt(GeoPt { lat: 48.85, lon: 2.0 }));
    assert_eq!(value.to_string(), "GeoPt(48.85, 2.0)");
}

#[test]
fn test_geopt_errors() {
    assert_bad(CastFunction::GeoPt, &[Value::Float(1.0)]);
    assert_bad(
        CastFunction::GeoPt,
        &[Value::Float(20.67), Value::Float(-100.32), Value::Float(1.5)],
    );
    assert_bad(CastFunction::GeoPt, &[text("1.0"), Value::Float(1.0)]);
    assert_bad(CastFunction::GeoPt, &[Value::Float(91.0), Value::Float(0.0)]);
    assert_bad(CastFunction::GeoPt, &[Value::Float(0.0), Value::Float(-180.5)]);
}
