// tests/lowering_tests.rs

use std::cell::RefCell;

use gql_lang::{
    CastFunction, Deferred, FilterNode, GqlError, Operator, Parameter, ParsedQuery,
    PropertyResolver, PropertyType, QuerySpec, Schema, Value, to_json,
};

fn lower(query: &str) -> QuerySpec {
    lower_with(query, &Schema::new())
}

fn lower_with(query: &str, schema: &Schema) -> QuerySpec {
    ParsedQuery::parse(query, None)
        .unwrap()
        .get_query(schema)
        .unwrap()
}

fn lower_err(query: &str, schema: &Schema) -> GqlError {
    ParsedQuery::parse(query, None)
        .unwrap()
        .get_query(schema)
        .unwrap_err()
}

// ============================================================================
// Query shape
// ============================================================================

#[test]
fn test_simple_filter() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 = 'xxx'");
    assert_eq!(query.kind(), Some("SomeKind"));
    assert_eq!(
        query.filters(),
        Some(&FilterNode::comparison("prop1", Operator::Equal, Value::String("xxx".into())))
    );
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=FilterNode('prop1', '=', 'xxx'))"
    );
}

#[test]
fn test_full_query() {
    let gql = ParsedQuery::parse(
        "SELECT prop1, prop2 FROM SomeKind WHERE prop3 > 5 AND prop2 = 'xxx' \
         ORDER BY prop4, prop1 DESC LIMIT 10 OFFSET 5 HINT ORDER_FIRST",
        Some("test-namespace"),
    )
    .unwrap();
    let query = gql.get_query(&Schema::new()).unwrap();

    assert_eq!(
        query.to_string(),
        "Query(namespace='test-namespace', kind='SomeKind', \
         filters=AND(FilterNode('prop2', '=', 'xxx'), FilterNode('prop3', '>', 5)), \
         order_by=[PropertyOrder(name='prop4', reverse=false), PropertyOrder(name='prop1', reverse=true)], \
         limit=10, offset=5, projection=['prop1', 'prop2'], hint=ORDER_FIRST)"
    );
}

#[test]
fn test_no_filters() {
    let query = lower("SELECT * FROM SomeKind");
    assert_eq!(query.filters(), None);
    assert_eq!(query.ancestor(), None);
    assert_eq!(query.to_string(), "Query(kind='SomeKind')");
}

#[test]
fn test_kindless() {
    let query = lower("SELECT * WHERE prop1 = 1");
    assert_eq!(query.kind(), None);
    assert_eq!(query.to_string(), "Query(filters=FilterNode('prop1', '=', 1))");
}

#[test]
fn test_keys_only() {
    let query = lower("SELECT __key__ FROM SomeKind");
    assert!(query.keys_only());
    assert!(query.projection().is_empty());
    assert_eq!(query.to_string(), "Query(kind='SomeKind', keys_only=true)");
}

#[test]
fn test_distinct_on_projection() {
    let query = lower("SELECT DISTINCT prop1, prop2 FROM SomeKind");
    assert_eq!(
        query.distinct_on(),
        Some(&["prop1".to_string(), "prop2".to_string()][..])
    );
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', projection=['prop1', 'prop2'], distinct_on=['prop1', 'prop2'])"
    );
}

#[test]
fn test_limit_with_offset() {
    let query = lower("SELECT * FROM SomeKind LIMIT 5, 10");
    assert_eq!(query.limit(), Some(10));
    assert_eq!(query.offset(), 5);
}

#[test]
fn test_terms_under_one_key_are_anded() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 = 1 AND prop1 = 2");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=AND(FilterNode('prop1', '=', 1), FilterNode('prop1', '=', 2)))"
    );
}

#[test]
fn test_not_equal_stays_single_leaf() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 != 1");
    assert_eq!(
        query.filters(),
        Some(&FilterNode::comparison("prop1", Operator::NotEqual, Value::Integer(1)))
    );
}

#[test]
fn test_null_and_booleans() {
    let query = lower("SELECT * FROM SomeKind WHERE a = NULL AND b = TRUE AND c = 1.5");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=AND(FilterNode('a', '=', null), \
         FilterNode('b', '=', true), FilterNode('c', '=', 1.5)))"
    );
}

// ============================================================================
// IN lists
// ============================================================================

#[test]
fn test_in_list_expands_to_or() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 IN (1, 2)");
    assert_eq!(
        query.filters(),
        FilterNode::or(vec![
            FilterNode::comparison("prop1", Operator::Equal, Value::Integer(1)),
            FilterNode::comparison("prop1", Operator::Equal, Value::Integer(2)),
        ])
        .as_ref()
    );
}

#[test]
fn test_single_element_in_list() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 IN ('a')");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=FilterNode('prop1', '=', 'a'))"
    );
}

#[test]
fn test_in_list_of_casts() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 IN (DATE('2020-01-01'), DATE(2021, 6, 30))");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=OR(\
         FilterNode('prop1', '=', datetime('2020-01-01 00:00:00')), \
         FilterNode('prop1', '=', datetime('2021-06-30 00:00:00'))))"
    );
}

#[test]
fn test_in_list_with_other_filters() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 IN (1, 2) AND prop2 = 'x'");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=AND(\
         OR(FilterNode('prop1', '=', 1), FilterNode('prop1', '=', 2)), \
         FilterNode('prop2', '=', 'x')))"
    );
}

// ============================================================================
// Casts
// ============================================================================

#[test]
fn test_date_cast_evaluated() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 >= DATE(2020, 3, 26)");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=FilterNode('prop1', '>=', datetime('2020-03-26 00:00:00')))"
    );
}

#[test]
fn test_key_cast_takes_namespace() {
    let query = ParsedQuery::parse(
        "SELECT * FROM SomeKind WHERE ref = KEY('parent', 'c', 'child', 42)",
        Some("ns"),
    )
    .unwrap()
    .get_query(&Schema::new())
    .unwrap();
    assert_eq!(
        query.to_string(),
        "Query(namespace='ns', kind='SomeKind', \
         filters=FilterNode('ref', '=', Key('parent', 'c', 'child', 42, namespace='ns')))"
    );
}

#[test]
fn test_geopt_cast() {
    let query = lower("SELECT * FROM SomeKind WHERE location = GEOPT(48.85, 2.35)");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=FilterNode('location', '=', GeoPt(48.85, 2.35)))"
    );
}

#[test]
fn test_invalid_cast_arguments() {
    let schema = Schema::new();
    assert!(lower_err("SELECT * FROM SomeKind WHERE prop1 = DATE('yesterday')", &schema).is_bad_query());
    assert!(lower_err("SELECT * FROM SomeKind WHERE prop1 = DATE(2020)", &schema).is_bad_query());
    assert!(lower_err("SELECT * FROM SomeKind WHERE prop1 = KEY('Kind')", &schema).is_bad_query());
    assert!(lower_err("SELECT * FROM SomeKind WHERE prop1 = GEOPT(100, 0)", &schema).is_bad_query());
}

#[test]
fn test_user_cast_not_implemented() {
    let err = lower_err(
        "SELECT * FROM SomeKind WHERE prop = USER('test@example.com')",
        &Schema::new(),
    );
    assert_eq!(err, GqlError::NotImplemented("user"));
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_parameter_node() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 = :1 AND prop2 = :ref");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=AND(ParameterNode('prop1', '=', Parameter(1)), \
         ParameterNode('prop2', '=', Parameter('ref'))))"
    );
}

#[test]
fn test_parameterized_date() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 = DATE(:1)");
    assert_eq!(
        query.filters(),
        Some(&FilterNode::Parameter {
            property: "prop1".to_string(),
            op: Operator::Equal,
            value: Deferred::Function {
                function: CastFunction::Date,
                args: vec![Deferred::Parameter {
                    parameter: Parameter::Positional(1),
                }],
            },
        })
    );
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=ParameterNode('prop1', '=', \
         ParameterizedFunction('date', [Parameter(1)])))"
    );
}

#[test]
fn test_parameterized_in_list() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 IN (:1, 2, DATE('2020-01-01'))");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=ParameterNode('prop1', 'in', \
         ParameterizedFunction('list', [Parameter(1), 2, datetime('2020-01-01 00:00:00')])))"
    );
}

#[test]
fn test_in_parameter() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 IN :values");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=ParameterNode('prop1', 'in', Parameter('values')))"
    );
}

#[test]
fn test_parameterized_in_list_with_parameterized_cast() {
    let query = lower("SELECT * FROM SomeKind WHERE prop1 IN (1, KEY(:k))");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=ParameterNode('prop1', 'in', \
         ParameterizedFunction('list', [1, ParameterizedFunction('key', [Parameter('k')])])))"
    );
}

// ============================================================================
// Ancestor
// ============================================================================

#[test]
fn test_ancestor_key() {
    let query = lower("SELECT * FROM SomeKind WHERE ANCESTOR IS KEY('parent', 'c') AND prop1 = 1");
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', ancestor=Key('parent', 'c'), filters=FilterNode('prop1', '=', 1))"
    );
}

#[test]
fn test_ancestor_parameter() {
    let query = lower("SELECT * FROM SomeKind WHERE ANCESTOR IS :1");
    assert_eq!(
        query.ancestor(),
        Some(&Deferred::Parameter {
            parameter: Parameter::Positional(1)
        })
    );
    assert_eq!(query.filters(), None);
}

#[test]
fn test_ancestor_requires_key() {
    let schema = Schema::new();
    assert!(lower_err("SELECT * FROM SomeKind WHERE ANCESTOR IS 'abc'", &schema).is_bad_query());
    assert!(lower_err("SELECT * FROM SomeKind WHERE ANCESTOR IS DATE('2020-01-01')", &schema)
        .is_bad_query());
}

// ============================================================================
// Schema coercion
// ============================================================================

#[test]
fn test_integer_widened_for_float_property() {
    let schema = Schema::new().with_kind("SomeKind", [("prop1", PropertyType::Float)]);
    let query = lower_with("SELECT * FROM SomeKind WHERE prop1 = 2", &schema);
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=FilterNode('prop1', '=', 2.0))"
    );

    let query = lower_with("SELECT * FROM SomeKind WHERE prop1 IN (1, 2)", &schema);
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=OR(FilterNode('prop1', '=', 1.0), FilterNode('prop1', '=', 2.0)))"
    );
}

#[test]
fn test_string_parsed_for_timestamp_property() {
    let schema = Schema::new().with_kind("SomeKind", [("created", PropertyType::Timestamp)]);

    let query = lower_with("SELECT * FROM SomeKind WHERE created > '2020-03-26 12:45:05'", &schema);
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=FilterNode('created', '>', datetime('2020-03-26 12:45:05')))"
    );

    let query = lower_with("SELECT * FROM SomeKind WHERE created > '2020-03-26'", &schema);
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=FilterNode('created', '>', datetime('2020-03-26 00:00:00')))"
    );

    assert!(lower_err("SELECT * FROM SomeKind WHERE created > 'soon'", &schema).is_bad_query());
}

#[test]
fn test_string_parsed_for_time_property() {
    let schema = Schema::new().with_kind("SomeKind", [("opens", PropertyType::TimeOfDay)]);
    let query = lower_with("SELECT * FROM SomeKind WHERE opens = '09:30:00'", &schema);
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=FilterNode('opens', '=', datetime('1970-01-01 09:30:00')))"
    );
}

#[test]
fn test_casts_are_not_coerced() {
    let schema = Schema::new().with_kind("SomeKind", [("prop1", PropertyType::Float)]);
    let query = lower_with("SELECT * FROM SomeKind WHERE prop1 = DATE('2020-01-01')", &schema);
    assert_eq!(
        query.to_string(),
        "Query(kind='SomeKind', filters=FilterNode('prop1', '=', datetime('2020-01-01 00:00:00')))"
    );
}

#[test]
fn test_other_kinds_untouched() {
    let schema = Schema::new().with_kind("OtherKind", [("prop1", PropertyType::Float)]);
    let query = lower_with("SELECT * FROM SomeKind WHERE prop1 = 2", &schema);
    assert_eq!(
        query.filters(),
        Some(&FilterNode::comparison("prop1", Operator::Equal, Value::Integer(2)))
    );
}

struct CountingResolver {
    asked: RefCell<Vec<(Option<String>, String)>>,
}

impl PropertyResolver for CountingResolver {
    fn property_type(&self, kind: Option<&str>, property: &str) -> PropertyType {
        self.asked
            .borrow_mut()
            .push((kind.map(str::to_string), property.to_string()));
        PropertyType::Unknown
    }
}

#[test]
fn test_resolver_asked_once_per_property() {
    let resolver = CountingResolver {
        asked: RefCell::new(vec![]),
    };
    let gql = ParsedQuery::parse(
        "SELECT * FROM SomeKind WHERE prop1 = 1 AND prop1 = 2 AND prop1 > 0 \
         AND prop2 IN (1, 2, 3) AND ANCESTOR IS :1",
        None,
    )
    .unwrap();
    gql.get_query(&resolver).unwrap();

    assert_eq!(
        resolver.asked.into_inner(),
        vec![
            (Some("SomeKind".to_string()), "prop1".to_string()),
            (Some("SomeKind".to_string()), "prop2".to_string()),
        ]
    );
}

#[test]
fn test_range_on_one_property_resolves_once() {
    let resolver = CountingResolver {
        asked: RefCell::new(vec![]),
    };
    let gql = ParsedQuery::parse("SELECT * FROM SomeKind WHERE p > 1 AND p < 5", None).unwrap();
    let query = gql.get_query(&resolver).unwrap();

    let repr = query.to_string();
    assert!(repr.contains("FilterNode('p', '>', 1)"), "{}", repr);
    assert!(repr.contains("FilterNode('p', '<', 5)"), "{}", repr);
    assert_eq!(
        resolver.asked.into_inner(),
        vec![(Some("SomeKind".to_string()), "p".to_string())]
    );
}

// ============================================================================
// Determinism and output
// ============================================================================

#[test]
fn test_lowering_is_deterministic() {
    let text = "SELECT * FROM SomeKind WHERE z = 1 AND a IN (3, 1) AND m > :p ORDER BY a";
    let first = lower(text);
    let second = lower(text);
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(
        first.to_string(),
        "Query(kind='SomeKind', filters=AND(OR(FilterNode('a', '=', 3), FilterNode('a', '=', 1)), \
         ParameterNode('m', '>', Parameter('p')), FilterNode('z', '=', 1)), \
         order_by=[PropertyOrder(name='a', reverse=false)])"
    );
}

#[test]
fn test_json_output() {
    let query = lower("SELECT prop1 FROM SomeKind WHERE prop1 = DATE(:1) LIMIT 3");
    let json = to_json(&query).unwrap();

    assert!(json.contains(r#""kind":"SomeKind""#), "{}", json);
    assert!(json.contains(r#""limit":3"#), "{}", json);
    assert!(json.contains(r#""type":"parameter""#), "{}", json);
    assert!(json.contains(r#""function":"date""#), "{}", json);
    assert!(json.contains(r#""op":"=""#), "{}", json);
}
