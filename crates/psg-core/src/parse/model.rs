use super::components::Components;
use super::content::{RequestBody, RequestBodyOrRef, Response, ResponseOrRef};
use super::operation::{Operation, PathItem};
use super::parameter::{Parameter, ParameterOrRef};
use super::schema::SchemaOrRef;
use super::spec::{OpenApiSpec, Tag};
use crate::error::ResolveError;
use crate::ir::HttpMethod;

/// Read-only view over a parsed document.
///
/// Unlike a full `$ref` expansion, the model keeps references intact so that
/// named component schemas stay named all the way to emission. Lookups
/// borrow from the document and fail on dangling references.
#[derive(Debug, Clone, Copy)]
pub struct SpecModel<'a> {
    spec: &'a OpenApiSpec,
}

/// One operation together with where it was declared.
#[derive(Debug, Clone, Copy)]
pub struct OperationEntry<'a> {
    pub path: &'a str,
    pub method: HttpMethod,
    pub item: &'a PathItem,
    pub operation: &'a Operation,
}

impl OperationEntry<'_> {
    /// `GET /pets/{id}` style label used in logs and error messages.
    pub fn label(&self) -> String {
        match &self.operation.operation_id {
            Some(id) => format!("{id} ({} {})", self.method.as_str(), self.path),
            None => format!("{} {}", self.method.as_str(), self.path),
        }
    }
}

impl<'a> SpecModel<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &'a OpenApiSpec {
        self.spec
    }

    pub fn declared_tags(&self) -> &'a [Tag] {
        &self.spec.tags
    }

    /// Every operation in document order: paths first, then verbs.
    pub fn operations(&self) -> impl Iterator<Item = OperationEntry<'a>> + use<'a> {
        let spec = self.spec;
        spec.paths.iter().flat_map(|(path, item)| {
            item.operations().map(move |(method, operation)| OperationEntry {
                path: path.as_str(),
                method,
                item,
                operation,
            })
        })
    }

    fn components(&self) -> Option<&'a Components> {
        self.spec.components.as_ref()
    }

    /// Resolve `#/components/schemas/{name}` to its canonical name and definition.
    pub fn resolve_schema_ref(
        &self,
        ref_path: &str,
    ) -> Result<(&'a str, &'a SchemaOrRef), ResolveError> {
        let name = parse_ref_name(ref_path, "schemas")?;
        self.components()
            .and_then(|c| c.schemas.get_key_value(name))
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.to_string()))
    }

    /// Look up a component schema by its canonical name.
    pub fn component_schema(&self, name: &str) -> Result<&'a SchemaOrRef, ResolveError> {
        self.components()
            .and_then(|c| c.schemas.get(name))
            .ok_or_else(|| {
                ResolveError::RefTargetNotFound(format!("#/components/schemas/{name}"))
            })
    }

    pub fn parameter(&self, param: &'a ParameterOrRef) -> Result<&'a Parameter, ResolveError> {
        let mut current = param;
        // Component entries may themselves be references; bound the chain.
        for _ in 0..MAX_REF_HOPS {
            match current {
                ParameterOrRef::Parameter(p) => return Ok(p),
                ParameterOrRef::Ref { ref_path } => {
                    let name = parse_ref_name(ref_path, "parameters")?;
                    current = self
                        .components()
                        .and_then(|c| c.parameters.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
        Err(circular(param_ref_path(param)))
    }

    pub fn request_body(
        &self,
        body: &'a RequestBodyOrRef,
    ) -> Result<&'a RequestBody, ResolveError> {
        let mut current = body;
        for _ in 0..MAX_REF_HOPS {
            match current {
                RequestBodyOrRef::RequestBody(b) => return Ok(b),
                RequestBodyOrRef::Ref { ref_path } => {
                    let name = parse_ref_name(ref_path, "requestBodies")?;
                    current = self
                        .components()
                        .and_then(|c| c.request_bodies.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
        Err(circular(match body {
            RequestBodyOrRef::Ref { ref_path } => ref_path.as_str(),
            RequestBodyOrRef::RequestBody(_) => "requestBody",
        }))
    }

    pub fn response(&self, response: &'a ResponseOrRef) -> Result<&'a Response, ResolveError> {
        let mut current = response;
        for _ in 0..MAX_REF_HOPS {
            match current {
                ResponseOrRef::Response(r) => return Ok(r),
                ResponseOrRef::Ref { ref_path } => {
                    let name = parse_ref_name(ref_path, "responses")?;
                    current = self
                        .components()
                        .and_then(|c| c.responses.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
        Err(circular(match response {
            ResponseOrRef::Ref { ref_path } => ref_path.as_str(),
            ResponseOrRef::Response(_) => "response",
        }))
    }

    /// Path-level parameters followed by operation parameters. An operation
    /// parameter replaces a path-level one with the same name and location.
    pub fn effective_parameters(
        &self,
        entry: &OperationEntry<'a>,
    ) -> Result<Vec<&'a Parameter>, ResolveError> {
        let mut params: Vec<&'a Parameter> = Vec::new();
        for p in &entry.item.parameters {
            params.push(self.parameter(p)?);
        }
        for p in &entry.operation.parameters {
            let param = self.parameter(p)?;
            match params
                .iter()
                .position(|e| e.name == param.name && e.location == param.location)
            {
                Some(i) => params[i] = param,
                None => params.push(param),
            }
        }
        Ok(params)
    }
}

const MAX_REF_HOPS: usize = 16;

fn circular(ref_path: &str) -> ResolveError {
    ResolveError::InvalidRefFormat(format!("reference chain too deep: {ref_path}"))
}

fn param_ref_path(param: &ParameterOrRef) -> &str {
    match param {
        ParameterOrRef::Ref { ref_path } => ref_path,
        ParameterOrRef::Parameter(p) => &p.name,
    }
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name.
fn parse_ref_name<'r>(ref_path: &'r str, expected_section: &str) -> Result<&'r str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const DOC: &str = r##"
openapi: 3.0.3
info:
  title: Shop
  version: "1.0"
paths:
  /items/{id}:
    parameters:
      - $ref: '#/components/parameters/ItemId'
      - name: verbose
        in: query
        schema:
          type: boolean
    get:
      operationId: getItem
      parameters:
        - name: verbose
          in: query
          required: true
          schema:
            type: boolean
      responses:
        '200':
          $ref: '#/components/responses/ItemResponse'
components:
  parameters:
    ItemId:
      name: id
      in: path
      required: true
      schema:
        type: string
  responses:
    ItemResponse:
      description: ok
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Item'
  schemas:
    Item:
      type: object
"##;

    #[test]
    fn parse_ref_name_checks_section() {
        assert_eq!(
            parse_ref_name("#/components/schemas/Pet", "schemas").unwrap(),
            "Pet"
        );
        assert!(parse_ref_name("#/components/responses/Pet", "schemas").is_err());
        assert!(parse_ref_name("other.yaml#/Pet", "schemas").is_err());
    }

    #[test]
    fn resolves_component_references() {
        let spec = parse::from_yaml(DOC).unwrap();
        let model = SpecModel::new(&spec);

        let (name, _) = model
            .resolve_schema_ref("#/components/schemas/Item")
            .unwrap();
        assert_eq!(name, "Item");
        assert!(matches!(
            model.resolve_schema_ref("#/components/schemas/Missing"),
            Err(ResolveError::RefTargetNotFound(_))
        ));

        let entry = model.operations().next().unwrap();
        let response = model
            .response(&entry.operation.responses["200"])
            .unwrap();
        assert_eq!(response.description.as_deref(), Some("ok"));
    }

    #[test]
    fn operation_parameters_override_path_parameters() {
        let spec = parse::from_yaml(DOC).unwrap();
        let model = SpecModel::new(&spec);
        let entry = model.operations().next().unwrap();

        let params = model.effective_parameters(&entry).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "id");
        assert_eq!(params[1].name, "verbose");
        assert!(params[1].required);
    }
}
