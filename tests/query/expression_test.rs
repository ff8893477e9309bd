use insta::assert_snapshot;
use odata_orm::query::{Expression, Field, FilterValue};

#[test]
fn test_and_or_wrap_operands() {
    let pairs = [
        ("Name eq 'Foo'", "Id gt 5"),
        ("(A eq 1) or (B eq 2)", "C ne null"),
        ("", "X eq true"),
    ];

    for (a, b) in pairs {
        let a = Expression::new(a);
        let b = Expression::new(b);
        assert_eq!(a.and(&b).to_string(), format!("({}) and ({})", a, b));
        assert_eq!(a.or(&b).to_string(), format!("({}) or ({})", a, b));
    }
}

#[test]
fn test_nested_grouping() {
    let name = Field::new("Name");
    let qty = Field::new("Qty");
    let active = Field::new("Active");

    let expr = name
        .equals("Foo")
        .or(&name.equals("Bar"))
        .and(&qty.greater_or_equal(10).and(&active.equals(true)));

    assert_snapshot!(
        expr.to_string(),
        @"((Name eq 'Foo') or (Name eq 'Bar')) and ((Qty ge 10) and (Active eq true))"
    );
}

#[test]
fn test_value_formatting() {
    let field = Field::new("field");
    assert_eq!(field.equals("x").to_string(), "field eq 'x'");
    assert_eq!(field.equals(5).to_string(), "field eq 5");
    assert_eq!(field.equals(-3i64).to_string(), "field eq -3");
    assert_eq!(field.equals(2.5).to_string(), "field eq 2.5");
    assert_eq!(field.equals(false).to_string(), "field eq false");
    assert_eq!(field.equals(String::from("y")).to_string(), "field eq 'y'");
}

#[test]
fn test_all_operators() {
    let field = Field::new("CreatedOn");
    let rendered: Vec<String> = [
        field.equals(1),
        field.not_equals(1),
        field.greater_than(1),
        field.greater_or_equal(1),
        field.less_than(1),
        field.less_or_equal(1),
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    assert_eq!(
        rendered,
        vec![
            "CreatedOn eq 1",
            "CreatedOn ne 1",
            "CreatedOn gt 1",
            "CreatedOn ge 1",
            "CreatedOn lt 1",
            "CreatedOn le 1",
        ]
    );
}

#[test]
fn test_filter_value_display() {
    assert_eq!(FilterValue::from("it's").to_string(), "'it''s'");
    assert_eq!(FilterValue::Null.to_string(), "null");
}
