//! End-to-end tests for the public parse/evaluate API.
//!
//! These tests play the role of a host application: they define their own
//! record type, expose its fields through `Resolve`, and filter collections
//! with a parsed expression.

use std::collections::HashMap;

use exprcalc_rs::{
    eval, evaluate, parse, Error, EvalError, HostValue, ParseError, Resolve, ResolveError, Value,
};
use serde_json::json;

#[derive(Debug, Clone)]
struct Order {
    id: u32,
    status: &'static str,
    total: f32,
    express: bool,
    items: Vec<&'static str>,
}

impl Resolve for Order {
    fn resolve(&self, name: &str) -> Result<HostValue, ResolveError> {
        match name {
            "id" => Ok(self.id.into()),
            "status" => Ok(self.status.into()),
            "total" => Ok(self.total.into()),
            "express" => Ok(self.express.into()),
            "items" => Ok(HostValue::opaque("list")),
            "item_count" => Ok(self.items.len().into()),
            _ => Err(format!("order has no field `{name}`").into()),
        }
    }
}

fn orders() -> Vec<Order> {
    vec![
        Order {
            id: 1,
            status: "shipped",
            total: 120.5,
            express: true,
            items: vec!["book", "pen"],
        },
        Order {
            id: 2,
            status: "pending",
            total: 15.0,
            express: false,
            items: vec!["pen"],
        },
        Order {
            id: 3,
            status: "pending",
            total: 300.0,
            express: true,
            items: vec!["desk", "chair", "lamp"],
        },
        Order {
            id: 4,
            status: "cancelled",
            total: 0.0,
            express: false,
            items: vec![],
        },
    ]
}

/// Returns the ids of the orders matching `filter`.
fn matching_ids(filter: &str) -> Vec<u32> {
    let expr = parse(filter).expect("filter should parse");
    orders()
        .iter()
        .filter(|order| {
            matches!(
                evaluate(&expr, Some(*order)),
                Ok(Some(Value::Boolean(true)))
            )
        })
        .map(|order| order.id)
        .collect()
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_e2e_filter_by_status() {
    assert_eq!(matching_ids("status == 'pending'"), vec![2, 3]);
}

#[test]
fn test_e2e_filter_combined_conditions() {
    assert_eq!(
        matching_ids("status == 'pending' AND total >= 100 OR express AND item_count == 2"),
        vec![1, 3]
    );
}

#[test]
fn test_e2e_filter_grouping() {
    assert_eq!(
        matching_ids("(status == 'shipped' OR status == 'pending') AND express == false"),
        vec![2]
    );
}

#[test]
fn test_e2e_filter_bare_boolean_field() {
    assert_eq!(matching_ids("express"), vec![1, 3]);
    assert_eq!(matching_ids("express == FALSE"), vec![2, 4]);
}

#[test]
fn test_e2e_filter_string_ordering() {
    assert_eq!(matching_ids("status < 'p'"), vec![4]);
}

// ============================================================================
// Errors surfaced to the host
// ============================================================================

#[test]
fn test_e2e_unknown_field_is_identifier_error() {
    let order = orders().remove(0);
    let err = eval("weight > 3", Some(&order)).unwrap_err();
    let Error::Eval(EvalError::Identifier { name, source, .. }) = err else {
        panic!("expected identifier error");
    };
    assert_eq!(name, "weight");
    assert_eq!(source.to_string(), "order has no field `weight`");
}

#[test]
fn test_e2e_list_field_fails_in_comparison() {
    let order = orders().remove(0);
    let err = eval("items == 'book'", Some(&order)).unwrap_err();
    assert!(matches!(err, Error::Eval(EvalError::Type { .. })));
}

#[test]
fn test_e2e_list_field_skipped_by_short_circuit() {
    let order = orders().remove(0);
    assert_eq!(
        eval("express OR items == 'book'", Some(&order)).unwrap(),
        Some(Value::Boolean(true))
    );
}

#[test]
fn test_e2e_parse_error_reports_position() {
    let err = eval("status == 'pending' AND", None).unwrap_err();
    assert!(matches!(err, Error::Parse(ParseError::Syntax(_))));
    assert_eq!(err.position().column, 24);
    assert!(err.to_string().contains("1:24"));
}

// ============================================================================
// JSON-backed context
// ============================================================================

#[test]
fn test_e2e_json_object_context() {
    let serde_json::Value::Object(record) = json!({
        "name": "widget",
        "price": 9.99,
        "in_stock": true,
        "tags": ["a", "b"],
    }) else {
        unreachable!()
    };

    assert_eq!(
        eval("name == 'widget' AND price < 10 AND in_stock", Some(&record)).unwrap(),
        Some(Value::Boolean(true))
    );
    assert!(eval("tags == 'a'", Some(&record)).is_err());
}

#[test]
fn test_e2e_hashmap_of_json_values() {
    let vars: HashMap<String, serde_json::Value> =
        serde_json::from_str(r#"{"level": 3, "mode": "debug"}"#).unwrap();
    assert_eq!(
        eval("level > 2 AND mode != 'release'", Some(&vars)).unwrap(),
        Some(Value::Boolean(true))
    );
}

#[test]
fn test_e2e_result_serializes_as_plain_json() {
    let value = eval("1.5", None).unwrap();
    assert_eq!(serde_json::to_string(&value).unwrap(), "1.5");
    let none = eval("", None).unwrap();
    assert_eq!(serde_json::to_string(&none).unwrap(), "null");
}
