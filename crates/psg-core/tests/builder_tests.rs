use std::fs;

use psg_core::error::{BuildError, EmitError, ResolveError};
use psg_core::ir::{ClientIndex, ParamLocation, Resource, StatusClass, TypeRef, TypeShape};
use psg_core::parse;
use psg_core::parse::spec::OpenApiSpec;
use psg_core::{Builder, BuilderConfig, GeneratedFile, SdkEmitter};

const SHOP: &str = include_str!("fixtures/shop.yaml");
const CUSTOMERS: &str = include_str!("fixtures/customers.yaml");
const PAYMENTS: &str = include_str!("fixtures/payments.yaml");
const DANGLING: &str = include_str!("fixtures/dangling.yaml");

fn config() -> BuilderConfig {
    BuilderConfig::new("unused", "shop_sdk", "shop-sdk", "Shop")
}

fn resources(spec: &OpenApiSpec) -> Vec<Resource> {
    let config = config();
    let builder = Builder::load(spec, &config).expect("should index");
    builder.resources().expect("should build resources")
}

fn type_names(types: &[psg_core::ir::TypeDef]) -> Vec<&str> {
    types.iter().map(|t| t.type_name()).collect()
}

#[test]
fn resources_follow_first_seen_tag_order() {
    let spec = parse::from_yaml(SHOP).unwrap();
    let resources = resources(&spec);
    let tags: Vec<&str> = resources.iter().map(|r| r.tag.name.as_str()).collect();
    assert_eq!(tags, vec!["Orders", "Products", "default"]);

    let orders = &resources[0];
    assert_eq!(orders.package, "orders");
    assert_eq!(orders.service, "Orders");
    assert_eq!(
        orders.tag.description.as_deref(),
        Some("Place and track orders.")
    );
}

#[test]
fn every_operation_becomes_exactly_one_method() {
    let spec = parse::from_yaml(SHOP).unwrap();
    let resources = resources(&spec);

    let mut ids: Vec<&str> = resources
        .iter()
        .flat_map(|r| r.methods.iter().map(|m| m.operation_id.as_str()))
        .collect();
    assert_eq!(ids.len(), 7);
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 7);

    let orders: Vec<&str> = resources[0]
        .methods
        .iter()
        .map(|m| m.name.snake_case.as_str())
        .collect();
    assert_eq!(
        orders,
        vec![
            "list_orders",
            "create_order",
            "get_order",
            "cancel_order",
            "get_invoice"
        ]
    );
}

#[test]
fn component_types_are_ordered_and_hoisted() {
    let spec = parse::from_yaml(SHOP).unwrap();
    let resources = resources(&spec);
    let orders = &resources[0];

    assert_eq!(
        type_names(&orders.types),
        vec![
            "OrderStatus",
            "Order",
            "OrderShipping",
            "Resource",
            "OrderLine",
            "Product",
            "Money",
            "MoneyVariant2",
            "Error"
        ]
    );
    assert_eq!(
        type_names(&orders.inner_types),
        vec![
            "CreateOrderBodyLinesItem",
            "CreateOrderBody",
            "ListOrdersParams",
            "CreateOrderParams",
            "ListOrdersResponse",
            "CreateOrderClientError"
        ]
    );
    assert_eq!(orders.type_names, vec!["Error", "Order", "OrderStatus"]);

    let products = &resources[1];
    assert_eq!(
        type_names(&products.types),
        vec!["Product", "Money", "MoneyVariant2"]
    );
    assert_eq!(products.type_names, vec!["Product"]);
}

#[test]
fn all_of_merges_base_fields_first() {
    let spec = parse::from_yaml(SHOP).unwrap();
    let resources = resources(&spec);
    let order = resources[0].find_type("Order").unwrap();

    let TypeShape::Object(ref fields) = order.shape else {
        panic!("Order should be an object");
    };
    let names: Vec<&str> = fields.iter().map(|f| f.original_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["id", "createdAt", "status", "lines", "shipping", "parent"]
    );
    let required: Vec<bool> = fields.iter().map(|f| f.required).collect();
    assert_eq!(required, vec![true, false, true, true, false, false]);
    assert_eq!(fields[4].type_ref, TypeRef::named("OrderShipping"));
}

#[test]
fn resources_are_closed_over_their_references() {
    let spec = parse::from_yaml(SHOP).unwrap();
    for resource in resources(&spec) {
        assert!(
            resource.dangling_references().is_empty(),
            "{} references undefined types",
            resource.tag.name
        );
    }
}

#[test]
fn building_is_deterministic() {
    let spec = parse::from_yaml(SHOP).unwrap();
    let first = serde_json::to_string(&resources(&spec)).unwrap();
    let second = serde_json::to_string(&resources(&spec)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn parameters_merge_path_level_and_drop_cookies() {
    let spec = parse::from_yaml(SHOP).unwrap();
    let resources = resources(&spec);
    let list = &resources[0].methods[0];

    let names: Vec<&str> = list
        .parameters
        .iter()
        .map(|p| p.original_name.as_str())
        .collect();
    assert_eq!(names, vec!["X-Request-Id", "status", "page_size"]);
    assert_eq!(list.parameters_in(ParamLocation::Header).count(), 1);
    assert_eq!(list.params_type.as_deref(), Some("ListOrdersParams"));

    let get = &resources[0].methods[2];
    assert_eq!(get.operation_id, "getOrder");
    assert!(get.params_type.is_none());
    assert!(get.parameters[0].required);
}

#[test]
fn responses_are_keyed_by_status_class() {
    let spec = parse::from_yaml(SHOP).unwrap();
    let resources = resources(&spec);
    let create = &resources[0].methods[1];

    let classes: Vec<StatusClass> = create.responses.keys().copied().collect();
    assert_eq!(
        classes,
        vec![
            StatusClass::Success,
            StatusClass::ClientError,
            StatusClass::Default
        ]
    );
    assert_eq!(
        create.responses[&StatusClass::Default].type_ref,
        Some(TypeRef::named("Error"))
    );
    assert!(create.body.as_ref().unwrap().required);

    let cancel = &resources[0].methods[3];
    assert!(cancel.deprecated);
    assert_eq!(cancel.success().unwrap().type_ref, None);

    let invoice = &resources[0].methods[4];
    assert_eq!(
        invoice.success().unwrap().content_type.as_deref(),
        Some("application/pdf")
    );
}

#[test]
fn client_index_lists_non_empty_resources_by_name() {
    let spec = parse::from_yaml(SHOP).unwrap();
    let config = config();
    let builder = Builder::load(&spec, &config).unwrap();
    let resources = builder.resources().unwrap();
    let index = builder.client_index(&resources);

    let names: Vec<&str> = index.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Default", "Orders", "Products"]);
    assert_eq!(index.version, "2.3.0");
    assert_eq!(index.base_url.as_deref(), Some("https://shop.example.com"));
}

#[test]
fn undeclared_tag_falls_back_to_literal_name() {
    let spec = parse::from_yaml(PAYMENTS).unwrap();
    let resources = resources(&spec);
    assert_eq!(resources.len(), 1);

    let payments = &resources[0];
    assert_eq!(payments.tag.name, "payments");
    assert!(payments.tag.description.is_none());
    assert_eq!(payments.package, "payments");
    assert_eq!(payments.methods[0].name.snake_case, "create_payment");
    assert_eq!(
        type_names(&payments.types),
        vec!["PaymentRequest", "Payment", "PaymentStatus"]
    );
}

#[test]
fn inline_body_becomes_named_type() {
    let spec = parse::from_yaml(CUSTOMERS).unwrap();
    let resources = resources(&spec);
    let customers = &resources[0];

    assert_eq!(type_names(&customers.types), vec!["Customer"]);
    assert_eq!(type_names(&customers.inner_types), vec!["GetCustomerBody"]);

    let method = &customers.methods[0];
    assert_eq!(
        method.body.as_ref().unwrap().type_ref,
        TypeRef::named("GetCustomerBody")
    );
    assert_eq!(
        method.success().unwrap().type_ref,
        Some(TypeRef::named("Customer"))
    );
}

#[test]
fn dangling_reference_aborts_indexing() {
    let spec = parse::from_yaml(DANGLING).unwrap();
    let config = config();
    let err = Builder::load(&spec, &config).err().expect("should fail");
    assert!(matches!(
        err,
        BuildError::Index {
            source: ResolveError::RefTargetNotFound(_),
            ..
        }
    ));
}

#[test]
fn empty_tag_is_rejected() {
    let spec = parse::from_yaml(CUSTOMERS).unwrap();
    let config = config();
    let builder = Builder::load(&spec, &config).unwrap();
    let err = builder.build_resource(&builder.tag("")).unwrap_err();
    assert!(matches!(
        err,
        BuildError::Resource {
            source: ResolveError::EmptyResourceTag,
            ..
        }
    ));
}

#[test]
fn tags_sharing_a_package_are_rejected() {
    let doc = r#"
openapi: 3.0.3
info:
  title: Checkout
  version: "1"
paths:
  /checkout/sessions:
    post:
      operationId: createSession
      tags: [Checkout Sessions]
      responses:
        '204':
          description: created
  /checkout/sessions/{id}:
    get:
      operationId: getSession
      tags: [checkout-sessions]
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
      responses:
        '204':
          description: ok
"#;
    let spec = parse::from_yaml(doc).unwrap();
    let config = config();
    let err = Builder::load(&spec, &config).err().expect("should fail");
    let reason = std::error::Error::source(&err).map(ToString::to_string);
    insta::assert_snapshot!(
        reason.unwrap_or_default(),
        @r#"tags "Checkout Sessions" and "checkout-sessions" both map to package checkout_sessions"#
    );
    match err {
        BuildError::Resource {
            tag,
            source: ResolveError::DuplicatePackage {
                package, other, ..
            },
        } => {
            assert_eq!(tag, "checkout-sessions");
            assert_eq!(other, "Checkout Sessions");
            assert_eq!(package, "checkout_sessions");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Writes one line per type or method so the pipeline can be checked
/// without a real target language.
struct ListingEmitter;

impl SdkEmitter for ListingEmitter {
    fn types_file(
        &self,
        resource: &Resource,
        _config: &BuilderConfig,
    ) -> Result<GeneratedFile, EmitError> {
        let content: String = resource
            .types
            .iter()
            .map(|t| format!("{}\n", t.type_name()))
            .collect();
        Ok(GeneratedFile::generated(
            format!("{}/types.txt", resource.package),
            content,
        ))
    }

    fn resource_files(
        &self,
        resource: &Resource,
        _config: &BuilderConfig,
    ) -> Result<Vec<GeneratedFile>, EmitError> {
        let content: String = resource
            .methods
            .iter()
            .map(|m| format!("{}\n", m.name.snake_case))
            .collect();
        Ok(vec![GeneratedFile::generated(
            format!("{}/methods.txt", resource.package),
            content,
        )])
    }

    fn client_file(
        &self,
        index: &ClientIndex,
        _config: &BuilderConfig,
    ) -> Result<GeneratedFile, EmitError> {
        let content: String = index
            .resources
            .iter()
            .map(|r| format!("{}\n", r.package))
            .collect();
        Ok(GeneratedFile::generated("client.txt", content))
    }

    fn package_files(
        &self,
        index: &ClientIndex,
        _config: &BuilderConfig,
    ) -> Result<Vec<GeneratedFile>, EmitError> {
        Ok(vec![GeneratedFile::scaffold(
            "manifest.txt",
            format!("{} {}\n", index.title, index.version),
        )])
    }
}

#[test]
fn build_writes_resources_then_aggregates() {
    let dir = tempfile::tempdir().unwrap();
    let spec = parse::from_yaml(SHOP).unwrap();
    let config = BuilderConfig::new(dir.path(), "shop_sdk", "shop-sdk", "Shop");
    let builder = Builder::load(&spec, &config).unwrap();

    let report = builder.build(&ListingEmitter).unwrap();
    assert_eq!(report.resources, vec!["Orders", "Products", "default"]);
    assert_eq!(report.written.len(), 8);
    assert!(report.skipped.is_empty());
    assert_eq!(
        report.written.last().unwrap(),
        &dir.path().join("manifest.txt")
    );

    assert_eq!(
        fs::read_to_string(dir.path().join("client.txt")).unwrap(),
        "default\norders\nproducts\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("default/methods.txt")).unwrap(),
        "health\n"
    );
}

#[test]
fn scaffold_files_survive_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let spec = parse::from_yaml(CUSTOMERS).unwrap();
    let manifest = dir.path().join("manifest.txt");

    let config = BuilderConfig::new(dir.path(), "c", "c", "C");
    Builder::load(&spec, &config)
        .unwrap()
        .build(&ListingEmitter)
        .unwrap();
    fs::write(&manifest, "edited\n").unwrap();

    let report = Builder::load(&spec, &config)
        .unwrap()
        .build(&ListingEmitter)
        .unwrap();
    assert_eq!(report.skipped, vec![manifest.clone()]);
    assert_eq!(fs::read_to_string(&manifest).unwrap(), "edited\n");

    let forced = config.clone().with_force(true);
    let report = Builder::load(&spec, &forced)
        .unwrap()
        .build(&ListingEmitter)
        .unwrap();
    assert!(report.skipped.is_empty());
    assert_eq!(
        fs::read_to_string(&manifest).unwrap(),
        "Customers API 2024-01-01\n"
    );
}
