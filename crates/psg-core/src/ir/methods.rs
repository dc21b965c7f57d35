use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

use super::types::{NormalizedName, TypeRef};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

/// Where a parameter travels. Cookie parameters are not carried into the IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: NormalizedName,
    pub original_name: String,
    pub location: ParamLocation,
    pub type_ref: TypeRef,
    pub required: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBody {
    pub type_ref: TypeRef,
    pub required: bool,
    pub content_type: String,
    pub description: Option<String>,
}

/// Response status class. Exact codes and `2XX`-style ranges collapse onto
/// the same class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    ServerError,
    Default,
}

impl StatusClass {
    /// Classify a response key (`"200"`, `"4XX"`, `"default"`). Informational
    /// and malformed keys yield `None`.
    pub fn parse(status: &str) -> Option<Self> {
        if status.eq_ignore_ascii_case("default") {
            return Some(StatusClass::Default);
        }
        match status.chars().next()? {
            '2' => Some(StatusClass::Success),
            '3' => Some(StatusClass::Redirect),
            '4' => Some(StatusClass::ClientError),
            '5' => Some(StatusClass::ServerError),
            _ => None,
        }
    }

    /// Suffix appended to the operation name for hoisted response types.
    pub fn type_suffix(&self) -> &'static str {
        match self {
            StatusClass::Success => "Response",
            StatusClass::Redirect => "Redirect",
            StatusClass::ClientError => "ClientError",
            StatusClass::ServerError => "ServerError",
            StatusClass::Default => "DefaultResponse",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodResponse {
    /// The status key as written in the document.
    pub status: String,
    /// `None` when the response has no body.
    pub type_ref: Option<TypeRef>,
    pub content_type: Option<String>,
    pub description: Option<String>,
}

/// A callable SDK operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub name: NormalizedName,
    /// The document's operationId, or the one synthesized from verb and path.
    pub operation_id: String,
    pub http_method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub parameters: Vec<Parameter>,
    /// Name of the `{OperationId}Params` type grouping query and header parameters.
    pub params_type: Option<String>,
    pub body: Option<RequestBody>,
    pub responses: IndexMap<StatusClass, MethodResponse>,
}

impl Method {
    pub fn parameters_in(&self, location: ParamLocation) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(move |p| p.location == location)
    }

    /// The success response, if the operation declares one.
    pub fn success(&self) -> Option<&MethodResponse> {
        self.responses.get(&StatusClass::Success)
    }

    /// Named types referenced by parameters, the params type, body and responses.
    pub fn references(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for p in &self.parameters {
            p.type_ref.collect_named(&mut out);
        }
        if let Some(ref params) = self.params_type {
            out.insert(params.clone());
        }
        if let Some(ref body) = self.body {
            body.type_ref.collect_named(&mut out);
        }
        for resp in self.responses.values() {
            if let Some(ref t) = resp.type_ref {
                t.collect_named(&mut out);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_keys() {
        assert_eq!(StatusClass::parse("200"), Some(StatusClass::Success));
        assert_eq!(StatusClass::parse("2XX"), Some(StatusClass::Success));
        assert_eq!(StatusClass::parse("302"), Some(StatusClass::Redirect));
        assert_eq!(StatusClass::parse("404"), Some(StatusClass::ClientError));
        assert_eq!(StatusClass::parse("503"), Some(StatusClass::ServerError));
        assert_eq!(StatusClass::parse("default"), Some(StatusClass::Default));
        assert_eq!(StatusClass::parse("101"), None);
        assert_eq!(StatusClass::parse(""), None);
    }
}
