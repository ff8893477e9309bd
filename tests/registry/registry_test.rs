use odata_orm::config::Settings;
use odata_orm::query::Format;
use odata_orm::transport::{Method, MockTransport, Response};
use odata_orm::{FetchResult, OrmError, ServiceRegistry};
use serde_json::json;

const DEMO: &str = include_str!("../fixtures/demo_metadata.xml");

const OTHER: &str = r#"<edmx:Edmx xmlns:edmx="http://schemas.microsoft.com/ado/2007/06/edmx">
  <edmx:DataServices>
    <Schema Namespace="other" xmlns="http://schemas.microsoft.com/ado/2008/09/edm">
      <EntityType Name="Sprockets">
        <Property Name="Teeth" Type="Edm.Int32"/>
      </EntityType>
      <EntityContainer Name="other_Entities">
        <EntitySet Name="Sprockets" EntityType="other.Sprockets"/>
      </EntityContainer>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;

fn demo_registry() -> ServiceRegistry<MockTransport> {
    let transport = MockTransport::new().with_get("/odata/v2/$metadata", Response::ok(DEMO));
    let mut registry = ServiceRegistry::new(transport);
    registry.register("demo", "/odata/v2").unwrap();
    registry
}

#[test]
fn test_register_fetches_metadata() {
    let registry = demo_registry();

    let request = registry.transport().last_request().unwrap();
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.path, "/odata/v2/$metadata");
    assert!(request.params.is_empty());

    assert_eq!(registry.service("demo").unwrap().endpoint, "/odata/v2");
    assert_eq!(
        registry.list_entities("demo").unwrap(),
        vec!["Gadgets", "Widgets"]
    );
}

#[test]
fn test_get_object_scenario() {
    let mut registry = demo_registry();
    let mut obj = registry.get_object("Widgets", Some("demo")).unwrap();

    assert_eq!(obj.entity_name(), "Widgets");
    assert_eq!(obj.service_name(), Some("demo"));
    assert_eq!(obj.get("Id").unwrap(), None);
    assert_eq!(obj.get("Name").unwrap(), None);

    obj.set("Name", "Foo").unwrap();
    assert!(obj.is_dirty());
    assert_eq!(obj.get("Name").unwrap(), Some(&json!("Foo")));
    assert!(matches!(
        obj.get("Missing"),
        Err(OrmError::UnknownField { .. })
    ));
}

#[test]
fn test_get_object_errors() {
    let mut registry = demo_registry();

    assert!(matches!(
        registry.get_object("Widgets", Some("nope")),
        Err(OrmError::UnknownService(ref name)) if name == "nope"
    ));
    assert!(matches!(
        registry.get_object("Sprockets", Some("demo")),
        Err(OrmError::UnknownEntity(_))
    ));
    assert!(matches!(
        registry.get_object("Sprockets", None),
        Err(OrmError::UnknownEntity(_))
    ));
}

#[test]
fn test_get_object_searches_all_services() {
    let transport = MockTransport::new()
        .with_get("/odata/v2/$metadata", Response::ok(DEMO))
        .with_get("/other/$metadata", Response::ok(OTHER));
    let mut registry = ServiceRegistry::new(transport);
    registry.register("demo", "/odata/v2").unwrap();
    registry.register_with("other", "/other/", false).unwrap();

    let obj = registry.get_object("Sprockets", None).unwrap();
    assert_eq!(obj.service_name(), Some("other"));
    assert_eq!(registry.service("other").unwrap().endpoint, "/other");
}

#[test]
fn test_fetch_records() {
    let mut registry = demo_registry();
    registry.transport().route(
        Method::Get,
        "/odata/v2/Widgets",
        Response::ok(
            json!({"d": {"results": [{"Id": "1", "Name": "A"}, {"Id": "2", "Name": "B"}]}})
                .to_string(),
        ),
    );

    let mut query = registry.get_object("Widgets", Some("demo")).unwrap();
    let name = query.field("Name").unwrap();
    query.filter(name.not_equals("C")).top(2);

    let records = registry.fetch(&query).unwrap().into_records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("Id").unwrap(), Some(&json!("1")));
    assert_eq!(records[0].get("Name").unwrap(), Some(&json!("A")));
    assert_eq!(records[1].get("Id").unwrap(), Some(&json!("2")));
    assert_eq!(records[1].get("Name").unwrap(), Some(&json!("B")));
    assert!(records.iter().all(|r| !r.is_dirty()));

    let request = registry.transport().last_request().unwrap();
    assert_eq!(request.params["$filter"], "Name ne 'C'");
    assert_eq!(request.params["$top"], "2");
}

#[test]
fn test_fetch_rejects_unknown_field() {
    let mut registry = demo_registry();
    registry.transport().route(
        Method::Get,
        "/odata/v2/Widgets",
        Response::ok(
            json!({"d": {"results": [{"Id": "1", "Name": "A", "Bogus": "x"}]}}).to_string(),
        ),
    );

    let query = registry.get_object("Widgets", Some("demo")).unwrap();
    assert!(matches!(
        registry.fetch(&query),
        Err(OrmError::UnknownField { ref field, .. }) if field == "Bogus"
    ));
}

#[test]
fn test_count_sends_no_other_parameters() {
    let mut registry = demo_registry();
    registry
        .transport()
        .route(Method::Get, "/odata/v2/Widgets/$count", Response::ok("42\n"));

    let mut query = registry.get_object("Widgets", Some("demo")).unwrap();
    let id = query.field("Id").unwrap();
    query
        .filter(id.equals("1"))
        .top(5)
        .skip(1)
        .select(["Name"])
        .unwrap()
        .count();

    let result = registry.fetch(&query).unwrap();
    assert_eq!(result.count(), Some(42));

    let request = registry.transport().last_request().unwrap();
    assert_eq!(request.path, "/odata/v2/Widgets/$count");
    for key in ["$filter", "$select", "$top", "$skip"] {
        assert!(!request.params.contains_key(key));
    }
}

#[test]
fn test_count_failure_is_an_error() {
    let mut registry = demo_registry();
    registry
        .transport()
        .route(Method::Get, "/odata/v2/Widgets/$count", Response::new(500, "boom"));

    let mut query = registry.get_object("Widgets", Some("demo")).unwrap();
    query.count();

    let err = registry.fetch(&query).unwrap_err();
    assert!(matches!(err, OrmError::HttpStatus { status: 500, .. }));
    assert!(err.is_transport());
}

#[test]
fn test_count_body_must_be_integer() {
    let mut registry = demo_registry();
    registry
        .transport()
        .route(Method::Get, "/odata/v2/Widgets/$count", Response::ok("many"));

    let mut query = registry.get_object("Widgets", Some("demo")).unwrap();
    query.count();

    assert!(matches!(
        registry.fetch(&query),
        Err(OrmError::ResponseDecode(_))
    ));
}

#[test]
fn test_failed_list_yields_no_records() {
    let mut registry = demo_registry();
    registry
        .transport()
        .route(Method::Get, "/odata/v2/Widgets", Response::new(403, "forbidden"));

    let query = registry.get_object("Widgets", Some("demo")).unwrap();
    assert!(registry.fetch(&query).unwrap().into_records().is_empty());
}

#[test]
fn test_malformed_list_body() {
    let mut registry = demo_registry();
    registry
        .transport()
        .route(Method::Get, "/odata/v2/Widgets", Response::ok("<html/>"));

    let query = registry.get_object("Widgets", Some("demo")).unwrap();
    assert!(matches!(
        registry.fetch(&query),
        Err(OrmError::ResponseDecode(_))
    ));
}

#[test]
fn test_xml_format_returns_raw_body() {
    let mut registry = demo_registry();
    registry
        .transport()
        .route(Method::Get, "/odata/v2/Widgets", Response::ok("<feed/>"));

    let mut query = registry.get_object("Widgets", Some("demo")).unwrap();
    query.format("xml").unwrap();
    assert_eq!(query.parameters().format, Some(Format::Xml));

    match registry.fetch(&query).unwrap() {
        FetchResult::Raw(body) => assert_eq!(body, b"<feed/>"),
        other => panic!("expected raw body, got {:?}", other),
    }
    let request = registry.transport().last_request().unwrap();
    assert_eq!(request.params["$format"], "xml");
}

#[test]
fn test_failed_reregistration_keeps_previous_state() {
    let mut registry = demo_registry();

    registry
        .transport()
        .route(Method::Get, "/odata/v2/$metadata", Response::ok("<broken"));
    assert!(matches!(
        registry.register("demo", "/odata/v2"),
        Err(OrmError::SchemaParse(_))
    ));

    registry
        .transport()
        .route(Method::Get, "/odata/v3/$metadata", Response::new(503, ""));
    assert!(matches!(
        registry.register("demo", "/odata/v3"),
        Err(OrmError::HttpStatus { status: 503, .. })
    ));

    assert_eq!(registry.service("demo").unwrap().endpoint, "/odata/v2");
    assert!(registry.get_object("Widgets", Some("demo")).is_ok());
}

#[test]
fn test_reregistration_replaces_store() {
    let mut registry = demo_registry();
    registry
        .transport()
        .route(Method::Get, "/other/$metadata", Response::ok(OTHER));

    registry.register("demo", "/other").unwrap();

    assert_eq!(registry.service("demo").unwrap().endpoint, "/other");
    assert_eq!(registry.list_entities("demo").unwrap(), vec!["Sprockets"]);
    assert!(registry.get_object("Widgets", Some("demo")).is_err());
}

#[test]
fn test_deregister() {
    let mut registry = demo_registry();
    let obj = registry.get_object("Widgets", Some("demo")).unwrap();

    assert!(registry.deregister("demo"));
    assert!(!registry.deregister("demo"));
    assert!(matches!(
        registry.fetch(&obj),
        Err(OrmError::UnknownService(_))
    ));
    // Objects keep their schema after the service is gone.
    assert!(obj.get("Name").is_ok());
}

#[test]
fn test_register_all_from_settings() {
    let settings: Settings = toml::from_str(
        r#"
[services.demo]
endpoint = "/odata/v2"

[services.other]
endpoint = "/other"
lazy_load = false
"#,
    )
    .unwrap();

    let transport = MockTransport::new()
        .with_get("/odata/v2/$metadata", Response::ok(DEMO))
        .with_get("/other/$metadata", Response::ok(OTHER));
    let mut registry = ServiceRegistry::new(transport);
    registry.register_all(&settings).unwrap();

    let names: Vec<_> = registry.service_names().collect();
    assert_eq!(names, vec!["demo", "other"]);
    assert_eq!(
        registry.service("demo").unwrap().store.is_compressed("Widgets"),
        Some(true)
    );
    assert_eq!(
        registry.service("other").unwrap().store.is_compressed("Sprockets"),
        Some(false)
    );
}

#[test]
fn test_register_transport_failure() {
    let transport = MockTransport::new();
    transport.route_error(Method::Get, "/odata/v2/$metadata", "connection refused");
    let mut registry = ServiceRegistry::new(transport);

    let err = registry.register("demo", "/odata/v2").unwrap_err();
    assert!(matches!(
        err,
        OrmError::Transport { ref endpoint, .. } if endpoint == "/odata/v2/$metadata"
    ));
    assert!(err.is_transport());
    assert!(registry.service("demo").is_err());
}

#[test]
fn test_transport_failure_keeps_previous_registration() {
    let mut registry = demo_registry();
    registry
        .transport()
        .route_error(Method::Get, "/odata/v2/$metadata", "connection reset");

    assert!(matches!(
        registry.register_with("demo", "/odata/v2", false),
        Err(OrmError::Transport { .. })
    ));
    let service = registry.service("demo").unwrap();
    assert_eq!(service.endpoint, "/odata/v2");
    assert_eq!(service.store.is_compressed("Widgets"), Some(true));
    assert!(registry.get_object("Widgets", Some("demo")).is_ok());
}

#[test]
fn test_fetch_transport_failure() {
    let mut registry = demo_registry();
    registry
        .transport()
        .route_error(Method::Get, "/odata/v2/Widgets", "timed out");
    registry
        .transport()
        .route_error(Method::Get, "/odata/v2/Widgets/$count", "timed out");

    let mut query = registry.get_object("Widgets", Some("demo")).unwrap();
    let err = registry.fetch(&query).unwrap_err();
    assert!(matches!(
        err,
        OrmError::Transport { ref endpoint, .. } if endpoint == "/odata/v2/Widgets"
    ));
    assert!(err.to_string().contains("/odata/v2/Widgets"));

    query.count();
    assert!(matches!(
        registry.fetch(&query),
        Err(OrmError::Transport { ref endpoint, .. }) if endpoint == "/odata/v2/Widgets/$count"
    ));
}
