//! Data handed to the templates.
//!
//! Every template renders from one of the `*Context` structs below and from
//! nothing else. A template set written against a given [`CONTRACT_VERSION`]
//! works with any IR change that keeps these structs stable.

use std::collections::{BTreeSet, HashMap, HashSet};

use heck::ToSnakeCase;
use psg_core::BuilderConfig;
use psg_core::ir::{ClientIndex, Method, ParamLocation, Resource, TypeDef, TypeRef, TypeShape};
use serde::Serialize;

use crate::type_mapper::{
    enum_member_name, field_annotation, forward_type_ref, optional_annotation, python_identifier,
    string_literal, type_ref_to_python,
};

pub const CONTRACT_VERSION: u32 = 1;

/// Argument names the generated methods use themselves.
const RESERVED_ARGS: &[&str] = &["self", "body", "params", "response"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Model,
    Enum,
    Alias,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldContext {
    pub name: String,
    pub annotation: String,
    pub required: bool,
    /// Quoted wire name when it differs from `name`.
    pub alias: Option<String>,
    /// Right-hand side of the field declaration, if any.
    pub default: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumMemberContext {
    pub name: String,
    /// Quoted value.
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeContext {
    pub kind: TypeKind,
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldContext>,
    pub members: Vec<EnumMemberContext>,
    pub target: Option<String>,
    /// Bound with `TypeAliasType`: the target mentions itself or an alias
    /// defined after it.
    pub recursive: bool,
}

/// `{package}/types.py`
#[derive(Debug, Clone, Serialize)]
pub struct TypesFileContext {
    pub contract_version: u32,
    pub module: String,
    pub package: String,
    pub tag: String,
    pub types: Vec<TypeContext>,
    /// Models to rebuild once every name in the file is bound.
    pub models: Vec<String>,
    pub alias_types: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArgContext {
    pub name: String,
    pub annotation: String,
    /// Defaults to `None`.
    pub optional: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BodyContext {
    /// Type used to encode the body.
    pub annotation: String,
    /// httpx keyword carrying the body: `json`, `data`, `files` or `content`.
    pub kwarg: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParamsContext {
    pub annotation: String,
    /// Python tuple literal of the wire names sent as headers.
    pub header_keys: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReturnContext {
    pub annotation: String,
    /// `json`, `text`, `bytes` or `none`.
    pub mode: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodContext {
    pub name: String,
    pub operation_id: String,
    pub http_method: String,
    /// Python expression producing the request path.
    pub path: String,
    /// Summary and description, blank-line separated.
    pub doc: Option<String>,
    pub deprecated: bool,
    pub path_args: Vec<ArgContext>,
    pub keyword_args: Vec<ArgContext>,
    pub body: Option<BodyContext>,
    pub params: Option<ParamsContext>,
    pub returns: ReturnContext,
}

/// `{package}/resource.py` and `{package}/__init__.py`
#[derive(Debug, Clone, Serialize)]
pub struct ResourceContext {
    pub contract_version: u32,
    pub module: String,
    pub package: String,
    pub tag: String,
    pub description: Option<String>,
    pub class_name: String,
    pub type_imports: Vec<String>,
    pub types: Vec<TypeContext>,
    pub models: Vec<String>,
    pub alias_types: bool,
    pub methods: Vec<MethodContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientResourceContext {
    pub accessor: String,
    pub package: String,
    pub class_name: String,
    pub description: Option<String>,
}

/// `client.py`
#[derive(Debug, Clone, Serialize)]
pub struct ClientContext {
    pub contract_version: u32,
    pub module: String,
    pub client_class: String,
    pub title: String,
    /// Quoted API version.
    pub version: String,
    /// Quoted default base URL.
    pub base_url: String,
    pub resources: Vec<ClientResourceContext>,
}

/// `pyproject.toml` and the root `__init__.py`
#[derive(Debug, Clone, Serialize)]
pub struct PackageContext {
    pub contract_version: u32,
    pub module: String,
    /// Module as a path inside the wheel (`acme.sdk` → `acme/sdk`).
    pub module_path: String,
    pub package_name: String,
    pub client_class: String,
    pub title: String,
    pub version: String,
}

impl TypesFileContext {
    pub fn new(resource: &Resource, config: &BuilderConfig) -> Self {
        let types = types_context(&resource.types);
        Self {
            contract_version: CONTRACT_VERSION,
            module: config.module.clone(),
            package: package_module(&resource.package),
            tag: resource.tag.name.clone(),
            models: model_names(&types),
            alias_types: types.iter().any(|t| t.recursive),
            types,
        }
    }
}

impl ResourceContext {
    pub fn new(resource: &Resource, config: &BuilderConfig) -> Self {
        let types = types_context(&resource.inner_types);
        Self {
            contract_version: CONTRACT_VERSION,
            module: config.module.clone(),
            package: package_module(&resource.package),
            tag: resource.tag.name.clone(),
            description: resource.tag.description.clone(),
            class_name: resource_class(&resource.service),
            type_imports: resource.type_names.clone(),
            models: model_names(&types),
            alias_types: types.iter().any(|t| t.recursive),
            types,
            methods: resource.methods.iter().map(method_context).collect(),
        }
    }
}

impl ClientContext {
    pub fn new(index: &ClientIndex, config: &BuilderConfig) -> Self {
        Self {
            contract_version: CONTRACT_VERSION,
            module: config.module.clone(),
            client_class: client_class(config),
            title: index.title.clone(),
            version: string_literal(&index.version),
            base_url: string_literal(index.base_url.as_deref().unwrap_or_default()),
            resources: index
                .resources
                .iter()
                .map(|r| ClientResourceContext {
                    accessor: python_identifier(&r.name.to_snake_case()),
                    package: package_module(&r.package),
                    class_name: resource_class(&r.name),
                    description: r.description.clone(),
                })
                .collect(),
        }
    }
}

impl PackageContext {
    pub fn new(index: &ClientIndex, config: &BuilderConfig) -> Self {
        Self {
            contract_version: CONTRACT_VERSION,
            module: config.module.clone(),
            module_path: config.module.replace('.', "/"),
            package_name: config.package_name.clone(),
            client_class: client_class(config),
            title: index.title.clone(),
            version: index.version.clone(),
        }
    }
}

pub fn resource_class(service: &str) -> String {
    python_identifier(&format!("{service}Resource"))
}

/// Directory and import name of a resource package.
pub fn package_module(package: &str) -> String {
    python_identifier(package)
}

fn client_class(config: &BuilderConfig) -> String {
    psg_core::builder::naming::normalize_name(&config.name).pascal_case
}

fn model_names(types: &[TypeContext]) -> Vec<String> {
    types
        .iter()
        .filter(|t| matches!(t.kind, TypeKind::Model))
        .map(|t| t.name.clone())
        .collect()
}

/// Classes first, in definition order, then aliases. An alias is evaluated
/// at import time, so aliases are ordered after the aliases they mention.
fn types_context(defs: &[TypeDef]) -> Vec<TypeContext> {
    let aliases: HashMap<&str, &TypeDef> = defs
        .iter()
        .filter(|d| matches!(d.shape, TypeShape::Alias(_)))
        .map(|d| (d.type_name(), d))
        .collect();

    let mut out: Vec<TypeContext> = defs
        .iter()
        .filter(|d| !matches!(d.shape, TypeShape::Alias(_)))
        .map(type_context)
        .collect();

    let mut placed = HashSet::new();
    let mut bound = HashSet::new();
    for def in defs.iter().filter(|d| matches!(d.shape, TypeShape::Alias(_))) {
        place_alias(def, &aliases, &mut placed, &mut bound, &mut out);
    }
    out
}

/// Aliases in a reference cycle, or referring to themselves, cannot all be
/// bound before use; those become `TypeAliasType`s with quoted names.
fn place_alias<'d>(
    def: &'d TypeDef,
    aliases: &HashMap<&str, &'d TypeDef>,
    placed: &mut HashSet<&'d str>,
    bound: &mut HashSet<&'d str>,
    out: &mut Vec<TypeContext>,
) {
    if !placed.insert(def.type_name()) {
        return;
    }
    for name in def.references() {
        if let Some(dep) = aliases.get(name.as_str()) {
            place_alias(dep, aliases, placed, bound, out);
        }
    }

    let mut ctx = type_context(def);
    let pending = |name: &str| aliases.contains_key(name) && !bound.contains(name);
    if let TypeShape::Alias(target) = &def.shape {
        if def.references().iter().any(|n| pending(n.as_str())) {
            ctx.target = Some(forward_type_ref(target, &pending));
            ctx.recursive = true;
        }
    }
    bound.insert(def.type_name());
    out.push(ctx);
}

fn type_context(def: &TypeDef) -> TypeContext {
    let mut ctx = TypeContext {
        kind: TypeKind::Alias,
        name: def.type_name().to_string(),
        description: def.description.clone(),
        fields: Vec::new(),
        members: Vec::new(),
        target: None,
        recursive: false,
    };
    match &def.shape {
        TypeShape::Object(fields) => {
            ctx.kind = TypeKind::Model;
            let mut used = HashSet::new();
            ctx.fields = fields
                .iter()
                .map(|f| {
                    let name = unique(python_identifier(&f.name.snake_case), &mut used);
                    let alias = (name != f.original_name).then(|| string_literal(&f.original_name));
                    FieldContext {
                        default: field_default(alias.as_deref(), f.required),
                        alias,
                        annotation: field_annotation(&f.type_ref, f.required),
                        required: f.required,
                        description: f.description.clone(),
                        name,
                    }
                })
                .collect();
        }
        TypeShape::Enum(values) => {
            ctx.kind = TypeKind::Enum;
            let mut used = HashSet::new();
            ctx.members = values
                .iter()
                .map(|v| EnumMemberContext {
                    name: unique(enum_member_name(v), &mut used),
                    value: string_literal(v),
                })
                .collect();
        }
        TypeShape::Alias(target) => {
            ctx.target = Some(type_ref_to_python(target));
        }
    }
    ctx
}

fn field_default(alias: Option<&str>, required: bool) -> Option<String> {
    match (alias, required) {
        (Some(alias), true) => Some(format!("pydantic.Field(alias={alias})")),
        (Some(alias), false) => Some(format!("pydantic.Field(default=None, alias={alias})")),
        (None, true) => None,
        (None, false) => Some("None".to_string()),
    }
}

fn unique(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }
    let mut i = 2;
    loop {
        let candidate = format!("{name}_{i}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        i += 1;
    }
}

fn method_context(method: &Method) -> MethodContext {
    let mut used: HashSet<String> = RESERVED_ARGS.iter().map(|s| s.to_string()).collect();
    let mut placeholders = HashMap::new();

    let path_args: Vec<ArgContext> = method
        .parameters_in(ParamLocation::Path)
        .map(|p| {
            let name = unique(python_identifier(&p.name.snake_case), &mut used);
            placeholders.insert(p.original_name.as_str(), name.clone());
            ArgContext {
                name,
                annotation: type_ref_to_python(&p.type_ref),
                optional: false,
            }
        })
        .collect();

    let mut keyword_args = Vec::new();
    let body = method.body.as_ref().map(|body| {
        keyword_args.push(ArgContext {
            name: "body".to_string(),
            annotation: if body.required {
                type_ref_to_python(&body.type_ref)
            } else {
                optional_annotation(&body.type_ref)
            },
            optional: !body.required,
        });
        BodyContext {
            annotation: type_ref_to_python(&body.type_ref),
            kwarg: body_kwarg(&body.content_type, &body.type_ref).to_string(),
            content_type: body.content_type.clone(),
        }
    });

    let params = method.params_type.as_ref().map(|params_type| {
        let required = method
            .parameters
            .iter()
            .any(|p| p.location != ParamLocation::Path && p.required);
        keyword_args.push(ArgContext {
            name: "params".to_string(),
            annotation: if required {
                params_type.clone()
            } else {
                format!("{params_type} | None")
            },
            optional: !required,
        });
        let headers: BTreeSet<&str> = method
            .parameters_in(ParamLocation::Header)
            .map(|p| p.original_name.as_str())
            .collect();
        ParamsContext {
            annotation: params_type.clone(),
            header_keys: tuple_literal(headers.into_iter()),
        }
    });

    MethodContext {
        name: python_identifier(&method.name.snake_case),
        operation_id: method.operation_id.clone(),
        http_method: method.http_method.as_str().to_string(),
        path: path_expression(&method.path, &placeholders),
        doc: method_doc(method),
        deprecated: method.deprecated,
        path_args,
        keyword_args,
        body,
        params,
        returns: return_context(method),
    }
}

fn method_doc(method: &Method) -> Option<String> {
    let parts: Vec<&str> = [method.summary.as_deref(), method.description.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

fn body_kwarg(content_type: &str, type_ref: &TypeRef) -> &'static str {
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("json") {
        "json"
    } else if ct == "application/x-www-form-urlencoded" {
        "data"
    } else if ct.starts_with("multipart/") {
        "files"
    } else if matches!(type_ref, TypeRef::Named(_) | TypeRef::Array(_) | TypeRef::Map(_)) {
        "json"
    } else {
        "content"
    }
}

fn return_context(method: &Method) -> ReturnContext {
    let none = || ReturnContext {
        annotation: "None".to_string(),
        mode: "none".to_string(),
    };
    let Some(success) = method.success() else {
        return none();
    };
    let (Some(type_ref), Some(content_type)) = (&success.type_ref, &success.content_type) else {
        return none();
    };

    let ct = content_type.to_ascii_lowercase();
    let (annotation, mode) = if ct.contains("json") {
        (type_ref_to_python(type_ref), "json")
    } else if ct.starts_with("text/") {
        ("str".to_string(), "text")
    } else {
        ("bytes".to_string(), "bytes")
    };
    ReturnContext {
        annotation,
        mode: mode.to_string(),
    }
}

/// Quoted path, as an f-string when it has placeholders. Placeholders with
/// no matching parameter are kept literally.
fn path_expression(path: &str, placeholders: &HashMap<&str, String>) -> String {
    let mut out = String::with_capacity(path.len() + 8);
    let mut interpolated = false;
    let mut rest = path;

    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&escape_path(&rest[..start]));
        let key = &rest[start + 1..start + len];
        match placeholders.get(key) {
            Some(arg) => {
                out.push_str(&format!("{{_path({arg})}}"));
                interpolated = true;
            }
            None => out.push_str(&format!("{{{{{key}}}}}")),
        }
        rest = &rest[start + len + 1..];
    }
    out.push_str(&escape_path(rest));

    if interpolated {
        format!("f\"{out}\"")
    } else {
        // Doubled braces only mean something inside an f-string.
        format!("\"{}\"", out.replace("{{", "{").replace("}}", "}"))
    }
}

fn escape_path(segment: &str) -> String {
    segment.replace('\\', "\\\\").replace('"', "\\\"")
}

fn tuple_literal<'s>(items: impl Iterator<Item = &'s str>) -> String {
    let items: Vec<String> = items.map(string_literal).collect();
    match items.len() {
        0 => "()".to_string(),
        1 => format!("({},)", items[0]),
        _ => format!("({})", items.join(", ")),
    }
}
