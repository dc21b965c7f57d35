use std::collections::HashSet;

use heck::ToPascalCase;
use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::ir::{
    Field, Method, MethodResponse, NormalizedName, ParamLocation, Parameter, RequestBody,
    StatusClass, TypeDef, TypeRef, TypeShape,
};
use crate::parse::content::{MediaType, preferred_media};
use crate::parse::parameter::ParameterLocation;
use crate::parse::{OperationEntry, SpecModel};

use super::naming::{normalize_name, synthesize_operation_id};
use super::types::TypeBuilder;

/// Output of compiling one tag's operations.
#[derive(Debug, Clone, Default)]
pub struct CompiledPaths {
    pub body_types: Vec<TypeDef>,
    pub param_types: Vec<TypeDef>,
    pub response_types: Vec<TypeDef>,
    pub methods: Vec<Method>,
}

impl CompiledPaths {
    /// Every hoisted type, bodies first, then parameter sets, then responses.
    pub fn inner_types(&self) -> Vec<TypeDef> {
        self.body_types
            .iter()
            .chain(&self.param_types)
            .chain(&self.response_types)
            .cloned()
            .collect()
    }
}

/// Parameters of one operation plus the name of its grouped params type.
#[derive(Debug, Clone, Default)]
pub struct OperationParams {
    pub parameters: Vec<Parameter>,
    pub params_type: Option<String>,
}

/// Turns a tag's operations into methods, hoisting anonymous schemas found
/// in bodies, parameter sets and responses into named types.
pub struct PathToMethodCompiler<'t, 'a> {
    model: SpecModel<'a>,
    types: &'t mut TypeBuilder<'a>,
    operations: &'t [OperationEntry<'a>],
    names: Vec<(String, NormalizedName)>,
}

impl<'t, 'a> PathToMethodCompiler<'t, 'a> {
    /// Fails if two operations map onto the same method name.
    pub fn new(
        model: SpecModel<'a>,
        types: &'t mut TypeBuilder<'a>,
        operations: &'t [OperationEntry<'a>],
    ) -> Result<Self, ResolveError> {
        let mut names = Vec::with_capacity(operations.len());
        let mut seen = HashSet::new();

        for entry in operations {
            let operation_id = match entry.operation.operation_id {
                Some(ref id) if !id.trim().is_empty() => id.clone(),
                _ => {
                    let id = synthesize_operation_id(entry.method, entry.path);
                    log::debug!("synthesized operation id {id} for {}", entry.label());
                    id
                }
            };
            let name = normalize_name(&operation_id);
            if !seen.insert(name.snake_case.clone()) {
                return Err(ResolveError::DuplicateMethod {
                    method: name.snake_case,
                    path: entry.label(),
                });
            }
            names.push((operation_id, name));
        }

        Ok(Self {
            model,
            types,
            operations,
            names,
        })
    }

    fn stem(&self, index: usize) -> &str {
        &self.names[index].1.pascal_case
    }

    /// Request bodies, one slot per operation. Inline object bodies are
    /// hoisted as `{OperationId}Body`.
    pub fn paths_to_body_types(
        &mut self,
    ) -> Result<(Vec<Option<RequestBody>>, Vec<TypeDef>), ResolveError> {
        let operations = self.operations;
        let mut bodies = Vec::with_capacity(operations.len());

        for (i, entry) in operations.iter().enumerate() {
            let Some(ref body_or_ref) = entry.operation.request_body else {
                bodies.push(None);
                continue;
            };
            let body = self.model.request_body(body_or_ref)?;
            let Some((content_type, media)) = preferred_media(&body.content) else {
                bodies.push(None);
                continue;
            };
            let ctx = format!("{}Body", self.stem(i));
            let type_ref = self.media_type(&ctx, media)?;
            bodies.push(Some(RequestBody {
                type_ref,
                required: body.required,
                content_type: content_type.to_string(),
                description: body.description.clone(),
            }));
        }

        Ok((bodies, self.types.take_hoisted()))
    }

    /// Parameters, one slot per operation. Query and header parameters are
    /// also grouped into an `{OperationId}Params` object.
    pub fn paths_to_param_types(
        &mut self,
    ) -> Result<(Vec<OperationParams>, Vec<TypeDef>), ResolveError> {
        let operations = self.operations;
        let mut all = Vec::with_capacity(operations.len());

        for (i, entry) in operations.iter().enumerate() {
            let stem = self.stem(i).to_string();
            let mut parameters = Vec::new();

            for param in self.model.effective_parameters(entry)? {
                let location = match param.location {
                    ParameterLocation::Path => ParamLocation::Path,
                    ParameterLocation::Query => ParamLocation::Query,
                    ParameterLocation::Header => ParamLocation::Header,
                    ParameterLocation::Cookie => {
                        log::warn!(
                            "dropping cookie parameter {:?} of {}",
                            param.name,
                            entry.label()
                        );
                        continue;
                    }
                };
                let type_ref = match param.schema {
                    Some(ref schema) => {
                        let ctx = format!("{stem}{}", param.name.to_pascal_case());
                        self.types.type_ref(&ctx, schema)?
                    }
                    None => TypeRef::Any,
                };
                parameters.push(Parameter {
                    name: normalize_name(&param.name),
                    original_name: param.name.clone(),
                    location,
                    type_ref,
                    required: param.required || location == ParamLocation::Path,
                    description: param.description.clone(),
                });
            }

            let fields: Vec<Field> = parameters
                .iter()
                .filter(|p| p.location != ParamLocation::Path)
                .map(|p| Field {
                    name: p.name.clone(),
                    original_name: p.original_name.clone(),
                    type_ref: p.type_ref.clone(),
                    required: p.required,
                    description: p.description.clone(),
                })
                .collect();
            let params_type = if fields.is_empty() {
                None
            } else {
                Some(self.types.hoist(
                    &format!("{stem}Params"),
                    None,
                    TypeShape::Object(fields),
                ))
            };

            all.push(OperationParams {
                parameters,
                params_type,
            });
        }

        Ok((all, self.types.take_hoisted()))
    }

    /// Responses by status class, one map per operation. Inline object
    /// schemas are hoisted as `{OperationId}{Suffix}`; the first response of
    /// each class wins.
    pub fn paths_to_response_types(
        &mut self,
    ) -> Result<(Vec<IndexMap<StatusClass, MethodResponse>>, Vec<TypeDef>), ResolveError> {
        let operations = self.operations;
        let mut all = Vec::with_capacity(operations.len());

        for (i, entry) in operations.iter().enumerate() {
            let mut responses = IndexMap::new();

            for (status, response_or_ref) in &entry.operation.responses {
                let Some(class) = StatusClass::parse(status) else {
                    log::debug!("ignoring response {status} of {}", entry.label());
                    continue;
                };
                if responses.contains_key(&class) {
                    continue;
                }
                let response = self.model.response(response_or_ref)?;
                let (type_ref, content_type) = match preferred_media(&response.content) {
                    Some((content_type, media)) => {
                        let ctx = format!("{}{}", self.stem(i), class.type_suffix());
                        (
                            Some(self.media_type(&ctx, media)?),
                            Some(content_type.to_string()),
                        )
                    }
                    None => (None, None),
                };
                responses.insert(
                    class,
                    MethodResponse {
                        status: status.clone(),
                        type_ref,
                        content_type,
                        description: response.description.clone(),
                    },
                );
            }

            all.push(responses);
        }

        Ok((all, self.types.take_hoisted()))
    }

    /// One method per operation, in document order.
    pub fn paths_to_methods(
        &self,
        bodies: Vec<Option<RequestBody>>,
        params: Vec<OperationParams>,
        responses: Vec<IndexMap<StatusClass, MethodResponse>>,
    ) -> Vec<Method> {
        self.operations
            .iter()
            .zip(&self.names)
            .zip(bodies.into_iter().zip(params).zip(responses))
            .map(|((entry, (operation_id, name)), ((body, params), responses))| Method {
                name: name.clone(),
                operation_id: operation_id.clone(),
                http_method: entry.method,
                path: entry.path.to_string(),
                summary: entry.operation.summary.clone(),
                description: entry.operation.description.clone(),
                deprecated: entry.operation.deprecated.unwrap_or(false),
                parameters: params.parameters,
                params_type: params.params_type,
                body,
                responses,
            })
            .collect()
    }

    pub fn compile(mut self) -> Result<CompiledPaths, ResolveError> {
        let (bodies, body_types) = self.paths_to_body_types()?;
        let (params, param_types) = self.paths_to_param_types()?;
        let (responses, response_types) = self.paths_to_response_types()?;
        let methods = self.paths_to_methods(bodies, params, responses);
        Ok(CompiledPaths {
            body_types,
            param_types,
            response_types,
            methods,
        })
    }

    fn media_type(&mut self, ctx: &str, media: &'a MediaType) -> Result<TypeRef, ResolveError> {
        match media.schema {
            Some(ref schema) => self.types.type_ref(ctx, schema),
            None => Ok(TypeRef::Any),
        }
    }
}
