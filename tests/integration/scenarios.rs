//! Concrete end-to-end rendering and translation scenarios.

use pretty_assertions::assert_eq;
use tsql_render::{render, translate, Bindings, Dialect, Scalar, Value};

#[test]
fn scenario_1_scalar_substitution() {
    let mut bindings = Bindings::new();
    bindings.insert("x".to_string(), Value::str("my_table"));
    bindings.insert("a".to_string(), Value::int(123));
    let out = render("SELECT * FROM @x WHERE id=@a", &bindings).unwrap();
    assert_eq!(out, "SELECT * FROM my_table WHERE id=123");
}

#[test]
fn scenario_2_sequence_substitution() {
    let mut bindings = Bindings::new();
    bindings.insert(
        "a".to_string(),
        Value::seq(vec![Scalar::Int(1), Scalar::Int(2), Scalar::Int(3)]),
    );
    let out = render("SELECT * FROM table WHERE id IN (@a)", &bindings).unwrap();
    assert_eq!(out, "SELECT * FROM table WHERE id IN (1,2,3)");
}

#[test]
fn scenario_3_default_with_no_override() {
    let out = render("{DEFAULT @a=1} SELECT @a", &Bindings::new()).unwrap();
    assert_eq!(out, " SELECT 1");
}

#[test]
fn scenario_4_conditional_block() {
    let mut bindings = Bindings::new();
    bindings.insert("x".to_string(), Value::int(2));
    let out = render("SELECT * FROM t {@x IN (1,2,3)} ? {WHERE id=@x}", &bindings).unwrap();
    assert_eq!(out, "SELECT * FROM t WHERE id=2");
}

#[test]
fn scenario_5_datediff_translates_for_oracle() {
    let out = translate("SELECT DATEDIFF(dd,a,b) FROM table", Dialect::Oracle, None).unwrap();
    assert!(!out.contains("DATEDIFF"));
    assert!(out.contains("b - a"));
}

#[test]
fn scenario_6_temp_table_emulation_with_schema() {
    let out = translate(
        "SELECT * FROM #children",
        Dialect::Oracle,
        Some("temp_schema"),
    )
    .unwrap();
    let prefix = "SELECT * FROM temp_schema.children_";
    assert!(out.starts_with(prefix), "got: {out}");
    let salt = &out[prefix.len()..];
    assert!(salt.len() >= 4);
    assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn scenario_7_mpp_distribute_hint() {
    let sql = "--HINT DISTRIBUTE_ON_KEY(person_id)\nSELECT * INTO one_table FROM other_table";
    let out = translate(sql, Dialect::Pdw, None).unwrap();
    assert!(out.contains("DISTRIBUTION = HASH(person_id)"));
}
