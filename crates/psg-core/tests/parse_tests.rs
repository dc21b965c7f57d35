use std::path::Path;

use psg_core::error::ParseError;
use psg_core::ir::HttpMethod;
use psg_core::parse::{self, SpecModel};

const SHOP: &str = include_str!("fixtures/shop.yaml");

#[test]
fn parses_shop_document() {
    let spec = parse::from_yaml(SHOP).unwrap();
    assert_eq!(spec.openapi, "3.1.0");
    assert_eq!(spec.info.title, "Shop");
    assert_eq!(spec.tags.len(), 2);
    assert_eq!(spec.paths.len(), 5);

    let components = spec.components.as_ref().unwrap();
    assert_eq!(components.schemas.len(), 7);
    assert!(components.parameters.contains_key("RequestId"));
    assert!(components.request_bodies.contains_key("NewOrder"));
}

#[test]
fn operations_come_in_document_order() {
    let spec = parse::from_yaml(SHOP).unwrap();
    let model = SpecModel::new(&spec);
    let labels: Vec<(HttpMethod, &str)> = model.operations().map(|e| (e.method, e.path)).collect();
    assert_eq!(
        labels,
        vec![
            (HttpMethod::Get, "/orders"),
            (HttpMethod::Post, "/orders"),
            (HttpMethod::Get, "/orders/{orderId}"),
            (HttpMethod::Delete, "/orders/{orderId}"),
            (HttpMethod::Get, "/orders/{orderId}/invoice"),
            (HttpMethod::Get, "/products"),
            (HttpMethod::Get, "/health"),
        ]
    );
}

#[test]
fn path_level_parameters_are_resolved() {
    let spec = parse::from_yaml(SHOP).unwrap();
    let model = SpecModel::new(&spec);
    let list = model.operations().next().unwrap();
    let names: Vec<&str> = model
        .effective_parameters(&list)
        .unwrap()
        .iter()
        .map(|p| p.name.as_str())
        .collect();
    assert_eq!(names, vec!["X-Request-Id", "status", "page_size", "session"]);
}

#[test]
fn rejects_swagger_documents() {
    let doc = "openapi: \"2.0\"\ninfo:\n  title: Old\n  version: \"1\"\npaths: {}\n";
    let err = parse::from_yaml(doc).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedVersion(ref v) if v == "2.0"));
}

#[test]
fn reports_malformed_yaml() {
    let err = parse::from_yaml("openapi: [").unwrap_err();
    assert!(matches!(err, ParseError::Yaml(_)));
}

#[test]
fn picks_format_from_extension() {
    let json = r#"{
        "openapi": "3.0.0",
        "info": {"title": "Tiny", "version": "0.1.0"},
        "paths": {
            "/ping": {
                "get": {
                    "operationId": "ping",
                    "responses": {"204": {"description": "pong"}}
                }
            }
        }
    }"#;
    let spec = parse::from_path_contents(Path::new("tiny.json"), json).unwrap();
    assert_eq!(spec.info.title, "Tiny");
    assert_eq!(spec.paths.len(), 1);

    let err = parse::from_path_contents(Path::new("tiny.yaml"), "openapi: [").unwrap_err();
    assert!(matches!(err, ParseError::Yaml(_)));
}
