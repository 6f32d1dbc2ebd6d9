//! Universal properties that hold across rendering and translation.

use pretty_assertions::assert_eq;
use tsql_render::{render, translate, Bindings, Dialect, Scalar, Value};

#[test]
fn identity_under_canonical_dialect() {
    let samples = [
        "SELECT * FROM orders WHERE id = 1",
        "-- a comment\nCREATE TABLE t (id INT, name VARCHAR(50))",
        "UPDATE t SET x = 'it''s fine' WHERE y = 2",
    ];
    for s in samples {
        assert_eq!(translate(s, Dialect::SqlServer, None).unwrap(), s);
    }
}

#[test]
fn render_idempotence_on_plain_sql() {
    let samples = [
        "SELECT * FROM orders",
        "INSERT INTO t (a, b) VALUES (1, 2)",
        "-- nothing templated here at all",
    ];
    for s in samples {
        assert_eq!(render(s, &Bindings::new()).unwrap(), s);
    }
}

#[test]
fn default_override() {
    let tmpl = "{DEFAULT @x=7} @x";
    assert_eq!(render(tmpl, &Bindings::new()).unwrap(), " 7");

    let mut bindings = Bindings::new();
    bindings.insert("x".to_string(), Value::int(42));
    assert_eq!(render(tmpl, &bindings).unwrap(), " 42");
}

#[test]
fn string_protection_across_translation() {
    let sql = "SELECT ISNULL(a, 'ISNULL(should, not change)') FROM t";
    let out = translate(sql, Dialect::Oracle, None).unwrap();
    assert!(out.contains("'ISNULL(should, not change)'"));
}

#[test]
fn round_trip_on_simple_temp_tables() {
    let sql = "SELECT * FROM #t";
    assert_eq!(translate(sql, Dialect::SqlServer, None).unwrap(), sql);
}

#[test]
fn boolean_algebra_selects_then_branch_iff_truthy() {
    let cases = [
        (Value::bool(true), "then"),
        (Value::bool(false), "else"),
        (Value::int(0), "else"),
        (Value::int(1), "then"),
        (Value::str("FALSE"), "else"),
        (Value::str("anything else"), "then"),
    ];
    for (value, expected) in cases {
        let mut bindings = Bindings::new();
        bindings.insert("x".to_string(), value);
        let out = render("{@x} ? {then} : {else}", &bindings).unwrap();
        assert_eq!(out, expected);
    }
}

#[test]
fn renders_a_template_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("query.sql.tmpl");
    std::fs::write(&path, "{DEFAULT @limit=10} SELECT TOP (@limit) * FROM @table").unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut bindings = Bindings::new();
    bindings.insert("table".to_string(), Value::str("orders"));
    let out = render(&text, &bindings).unwrap();
    assert_eq!(out, " SELECT TOP (10) * FROM orders");
}

#[test]
fn sequence_binding_comma_joins_with_quoted_strings() {
    let mut bindings = Bindings::new();
    bindings.insert(
        "names".to_string(),
        Value::seq(vec![Scalar::Str("a".to_string()), Scalar::Str("b".to_string())]),
    );
    let out = render("WHERE name IN (@names)", &bindings).unwrap();
    assert_eq!(out, "WHERE name IN ('a','b')");
}

#[test]
fn empty_sequence_binding_in_a_guard_is_false() {
    let mut bindings = Bindings::new();
    bindings.insert("ids".to_string(), Value::seq(vec![]));
    let out = render("{@x IN (@ids)} ? {matched} : {empty}", &bindings).unwrap();
    assert_eq!(out, "empty");
}
