//! End-to-end tests for the schema-to-SQL compiler pipeline.

use bqflatten::schema::{Field, FieldMode, FieldType, TableRef};
use bqflatten::view_generator::{compile, ReservedWords, ViewGeneratorError};

fn table() -> TableRef {
    TableRef::new("acme", "sales", "orders")
}

fn scalar(name: &str) -> Field {
    Field {
        name: name.to_string(),
        field_type: FieldType::String,
        mode: FieldMode::Nullable,
        fields: vec![],
    }
}

fn repeated_scalar(name: &str) -> Field {
    Field {
        mode: FieldMode::Repeated,
        ..scalar(name)
    }
}

fn nullable_record(name: &str, children: Vec<Field>) -> Field {
    Field {
        name: name.to_string(),
        field_type: FieldType::Record,
        mode: FieldMode::Nullable,
        fields: children,
    }
}

fn repeated_record(name: &str, children: Vec<Field>) -> Field {
    Field {
        mode: FieldMode::Repeated,
        ..nullable_record(name, children)
    }
}

fn compile_default(fields: &[Field]) -> Result<Vec<bqflatten::view_generator::CompiledView>, ViewGeneratorError> {
    compile(fields, &table(), "order_id", &ReservedWords::bigquery())
}

#[test]
fn test_flat_schema_yields_single_root_view() {
    let fields = vec![scalar("order_id"), scalar("name"), scalar("qty")];
    let views = compile_default(&fields).unwrap();

    assert_eq!(views.len(), 1);
    assert_eq!(views[0].view_name, "vw_orders");
    assert_eq!(
        views[0].sql,
        "SELECT order_id, a.name AS name, a.qty AS qty FROM `acme.sales.orders` AS a"
    );
}

#[test]
fn test_nullable_record_uses_dot_access_and_no_unnest() {
    let fields = vec![
        scalar("order_id"),
        nullable_record("R", vec![scalar("x"), scalar("y")]),
    ];
    let views = compile_default(&fields).unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].view_name, "vw_orders");
    assert_eq!(views[1].view_name, "vw_orders_R");
    assert_eq!(
        views[1].sql,
        "SELECT order_id, a.R.x AS R_x, a.R.y AS R_y FROM `acme.sales.orders` AS a"
    );
}

#[test]
fn test_key_only_root_still_yields_root_view() {
    // A root level holding nothing but the key and a record must still emit a
    // key-only root view; the root group always exists.
    let fields = vec![scalar("order_id"), repeated_record("R", vec![scalar("z")])];
    let views = compile_default(&fields).unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].view_name, "vw_orders");
    assert_eq!(views[0].sql, "SELECT order_id FROM `acme.sales.orders` AS a");
    assert_eq!(views[1].view_name, "vw_orders_R");
}

#[test]
fn test_repeated_record_yields_unnest_view() {
    let fields = vec![
        scalar("order_id"),
        scalar("name"),
        repeated_record("R", vec![scalar("z")]),
    ];
    let views = compile_default(&fields).unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].view_name, "vw_orders");
    assert_eq!(
        views[0].sql,
        "SELECT order_id, a.name AS name FROM `acme.sales.orders` AS a"
    );
    assert_eq!(views[1].view_name, "vw_orders_R");
    assert_eq!(
        views[1].sql,
        "SELECT order_id, b.z AS R_z FROM `acme.sales.orders` AS a, UNNEST(R) AS b"
    );
}

#[test]
fn test_doubly_nested_repeated_records_chain_aliases() {
    let fields = vec![
        scalar("order_id"),
        scalar("sku"),
        repeated_record(
            "R",
            vec![scalar("r1"), repeated_record("S", vec![scalar("w")])],
        ),
    ];
    let views = compile_default(&fields).unwrap();

    assert_eq!(views.len(), 3);
    assert_eq!(views[1].view_name, "vw_orders_R");
    assert_eq!(
        views[1].sql,
        "SELECT order_id, b.r1 AS R_r1 FROM `acme.sales.orders` AS a, UNNEST(R) AS b"
    );
    // The second UNNEST references the previous alias plus the local name,
    // never the full root-relative path.
    assert_eq!(views[2].view_name, "vw_orders_R_S");
    assert_eq!(
        views[2].sql,
        "SELECT order_id, c.w AS R_S_w FROM `acme.sales.orders` AS a, UNNEST(R) AS b, UNNEST(b.S) AS c"
    );
}

#[test]
fn test_nullable_record_inside_repeated_record() {
    let fields = vec![
        scalar("order_id"),
        repeated_record("R", vec![nullable_record("N", vec![scalar("m")])]),
    ];
    let views = compile_default(&fields).unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(views[1].view_name, "vw_orders_R_N");
    assert_eq!(
        views[1].sql,
        "SELECT order_id, b.N.m AS R_N_m FROM `acme.sales.orders` AS a, UNNEST(R) AS b"
    );
}

#[test]
fn test_repeated_scalar_projects_count_in_current_group() {
    let fields = vec![scalar("order_id"), scalar("name"), repeated_scalar("tags")];
    let views = compile_default(&fields).unwrap();

    assert_eq!(views.len(), 1);
    assert_eq!(
        views[0].sql,
        "SELECT order_id, a.name AS name, ARRAY_LENGTH(a.tags) AS tags_count \
         FROM `acme.sales.orders` AS a"
    );
}

#[test]
fn test_reserved_field_name_is_backtick_quoted() {
    let fields = vec![scalar("order_id"), scalar("from")];
    let views = compile_default(&fields).unwrap();

    assert!(views[0].sql.contains("a.`from` AS `from`"));
}

#[test]
fn test_reserved_primary_key_is_backtick_quoted() {
    let fields = vec![scalar("select"), scalar("name")];
    let views = compile(&fields, &table(), "select", &ReservedWords::bigquery()).unwrap();

    assert!(views[0].sql.starts_with("SELECT `select`, "));
}

#[test]
fn test_primary_key_is_filtered_at_every_level() {
    let fields = vec![
        scalar("order_id"),
        repeated_record("R", vec![scalar("order_id"), scalar("z")]),
    ];
    let views = compile_default(&fields).unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(
        views[1].sql,
        "SELECT order_id, b.z AS R_z FROM `acme.sales.orders` AS a, UNNEST(R) AS b"
    );
}

#[test]
fn test_root_fields_after_a_record_stay_in_root_group() {
    let fields = vec![
        scalar("order_id"),
        scalar("x"),
        repeated_record("R", vec![scalar("z")]),
        scalar("y"),
    ];
    let views = compile_default(&fields).unwrap();

    assert_eq!(views.len(), 2);
    assert_eq!(views[0].view_name, "vw_orders");
    assert_eq!(
        views[0].sql,
        "SELECT order_id, a.x AS x, a.y AS y FROM `acme.sales.orders` AS a"
    );
}

#[test]
fn test_compile_is_deterministic() {
    let fields = vec![
        scalar("order_id"),
        scalar("name"),
        repeated_scalar("tags"),
        nullable_record("addr", vec![scalar("city")]),
        repeated_record("R", vec![scalar("z")]),
    ];
    let first = compile_default(&fields).unwrap();
    let second = compile_default(&fields).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_column_alias_collision_is_rejected() {
    // `tags` projects as `tags_count`, colliding with the literal field.
    let fields = vec![scalar("order_id"), repeated_scalar("tags"), scalar("tags_count")];
    let err = compile_default(&fields).unwrap_err();

    match err {
        ViewGeneratorError::NameCollision { identifier, .. } => {
            assert_eq!(identifier, "tags_count");
        }
        other => panic!("expected NameCollision, got {:?}", other),
    }
}

#[test]
fn test_view_name_collision_is_rejected() {
    // orders.A.B and orders.A_B both derive vw_orders_A_B.
    let fields = vec![
        scalar("order_id"),
        nullable_record("A", vec![nullable_record("B", vec![scalar("x")])]),
        nullable_record("A_B", vec![scalar("y")]),
    ];
    let err = compile_default(&fields).unwrap_err();

    match err {
        ViewGeneratorError::NameCollision { identifier, .. } => {
            assert_eq!(identifier, "vw_orders_A_B");
        }
        other => panic!("expected NameCollision, got {:?}", other),
    }
}

#[test]
fn test_record_without_children_is_unsupported() {
    let fields = vec![scalar("order_id"), nullable_record("empty", vec![])];
    let err = compile_default(&fields).unwrap_err();

    match err {
        ViewGeneratorError::UnsupportedFieldShape { path, .. } => {
            assert_eq!(path, "orders.empty");
        }
        other => panic!("expected UnsupportedFieldShape, got {:?}", other),
    }
}

#[test]
fn test_unknown_field_type_is_unsupported() {
    let fields = vec![
        scalar("order_id"),
        repeated_record(
            "R",
            vec![Field {
                field_type: FieldType::Unknown,
                ..scalar("mystery")
            }],
        ),
    ];
    let err = compile_default(&fields).unwrap_err();

    match err {
        ViewGeneratorError::UnsupportedFieldShape { path, .. } => {
            assert_eq!(path, "orders.R[].mystery");
        }
        other => panic!("expected UnsupportedFieldShape, got {:?}", other),
    }
}

#[test]
fn test_unnest_chain_deeper_than_alphabet_is_rejected() {
    // 26 nested repeated records plus the root exhaust the alias symbols.
    let mut innermost = repeated_record("r26", vec![scalar("leaf")]);
    for depth in (1..26).rev() {
        innermost = repeated_record(&format!("r{}", depth), vec![innermost]);
    }
    let fields = vec![scalar("order_id"), innermost];
    let err = compile_default(&fields).unwrap_err();

    assert!(matches!(err, ViewGeneratorError::SchemaError(_)));
}
