//! Request artifact emission

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::GeneratorConfig;
use crate::generation::cache::GenerationCache;
use crate::generation::sanitizers::doc_text;
use crate::generation::utils::{request_type_name, resource_group_name, type_name, variable_name};
use crate::generation::{
    DispatchEntry, Endpoint, GenerationError, GroupAccessor, Parameter, ParameterGroups,
    ParameterLocation, PathSegment, RequestArtifact, RequestParameter, Schema, SchemaRegistry,
};

pub struct RequestEmitter<'a> {
    config: &'a GeneratorConfig,
    registry: &'a SchemaRegistry,
}

impl<'a> RequestEmitter<'a> {
    pub fn new(config: &'a GeneratorConfig, registry: &'a SchemaRegistry) -> Self {
        Self { config, registry }
    }

    /// Builds the request artifact for one endpoint.
    ///
    /// `response_dtos` maps status codes to the response DTOs already emitted
    /// for this endpoint.
    pub fn emit_request(
        &self,
        endpoint: &Endpoint,
        response_dtos: &IndexMap<u16, String>,
        cache: &mut GenerationCache,
    ) -> Result<RequestArtifact, GenerationError> {
        let resource_group = resource_group_name(
            endpoint
                .collection
                .as_deref()
                .unwrap_or(&self.config.fallback_resource_name),
        );
        let type_name = cache.unique_name(&request_type_name(&endpoint.name));

        let mut variables = VariableNames::default();
        let parameters = ParameterGroups {
            path: self.place(endpoint, &endpoint.path_parameters, &[], &mut variables)?,
            body: self.place(
                endpoint,
                &endpoint.body_parameters,
                &self.config.ignored_body_params,
                &mut variables,
            )?,
            query: self.place(
                endpoint,
                &endpoint.query_parameters,
                &self.config.ignored_query_params,
                &mut variables,
            )?,
            header: self.place(
                endpoint,
                &endpoint.header_parameters,
                &self.config.ignored_header_params,
                &mut variables,
            )?,
        };

        let path_segments = path_segments(endpoint, &parameters.path);
        let path_template = path_template(&path_segments);
        let accessors = accessors(&parameters);
        let response_dispatch = self.dispatch(endpoint, response_dtos)?;

        let mut response_types: Vec<String> = Vec::new();
        for entry in &response_dispatch {
            if !response_types.contains(&entry.dto_type_name) {
                response_types.push(entry.dto_type_name.clone());
            }
        }

        debug!(
            endpoint = %endpoint.name,
            request = %type_name,
            template = %path_template,
            dispatch = response_dispatch.len(),
            "Emitted request"
        );

        Ok(RequestArtifact {
            type_name,
            namespace: self.config.request_namespace(&resource_group),
            resource_group,
            http_method: endpoint.method,
            body_capable: endpoint.method.requires_body(),
            path_segments,
            path_template,
            parameters,
            accessors,
            response_dispatch,
            response_types,
            doc_title: doc_text(Some(&endpoint.name)),
            doc_description: doc_text(endpoint.description.as_deref()),
        })
    }

    fn place(
        &self,
        endpoint: &Endpoint,
        params: &[Parameter],
        ignored: &[String],
        variables: &mut VariableNames,
    ) -> Result<Vec<RequestParameter>, GenerationError> {
        let mut placed = Vec::with_capacity(params.len());
        for param in params {
            if ignored.iter().any(|name| name == &param.name) {
                debug!(parameter = %param.name, "Parameter is on an ignore-list");
                continue;
            }
            self.check_parameter_type(endpoint, param)?;

            placed.push(RequestParameter {
                name: param.name.clone(),
                variable_name: variables.claim(&param.name),
                ty: param.ty.clone(),
                required: param.required,
                nullable: !param.required,
                default: param.default.clone(),
                description: doc_text(param.description.as_deref()),
            });
        }
        Ok(placed)
    }

    /// Every DTO a parameter type names must be a registry schema
    fn check_parameter_type(&self, endpoint: &Endpoint, param: &Parameter) -> Result<(), GenerationError> {
        for target in param.ty.named_types() {
            let known = self.registry.iter().any(|(name, _)| type_name(name) == target);
            if !known {
                return Err(GenerationError::UnresolvedParameterReference {
                    endpoint: endpoint.name.clone(),
                    parameter: param.name.clone(),
                    target: target.to_string(),
                });
            }
        }
        Ok(())
    }

    fn dispatch(
        &self,
        endpoint: &Endpoint,
        response_dtos: &IndexMap<u16, String>,
    ) -> Result<Vec<DispatchEntry>, GenerationError> {
        let mut entries = Vec::new();

        for (&status, response) in &endpoint.response {
            if status == 204 {
                continue;
            }

            let selected = response.select_media(&self.config.preferred_media_types);
            let dto_type_name = match selected {
                Some((_, Schema::Reference(reference))) => {
                    if self.registry.resolve(reference).is_none() {
                        return Err(GenerationError::UnresolvedReference {
                            endpoint: endpoint.name.clone(),
                            status,
                            target: reference.target.clone(),
                        });
                    }
                    type_name(&reference.target)
                }
                _ => match response_dtos.get(&status) {
                    Some(name) => name.clone(),
                    None => {
                        debug!(endpoint = %endpoint.name, status, "No response type, status left out of dispatch");
                        continue;
                    }
                },
            };

            entries.push(DispatchEntry {
                status,
                dto_type_name,
            });
        }

        Ok(entries)
    }
}

/// Variable names handed out within one request artifact
#[derive(Debug, Default)]
struct VariableNames {
    used: HashSet<String>,
}

impl VariableNames {
    fn claim(&mut self, wire_name: &str) -> String {
        let base = variable_name(wire_name);
        let mut name = base.clone();
        let mut n = 2;
        while !self.used.insert(name.clone()) {
            name = format!("{base}{n}");
            n += 1;
        }
        if name != base {
            warn!(
                parameter = %wire_name,
                variable = %name,
                "Parameter variable name already used in this request"
            );
        }
        name
    }
}

fn path_segments(endpoint: &Endpoint, path_params: &[RequestParameter]) -> Vec<PathSegment> {
    endpoint
        .path_segments
        .iter()
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.strip_prefix(':') {
            Some(slot) => {
                let bound = path_params
                    .iter()
                    .find(|p| p.name == slot)
                    .or_else(|| {
                        path_params
                            .iter()
                            .find(|p| variable_name(&p.name) == variable_name(slot))
                    });
                match bound {
                    Some(param) => PathSegment::Slot(param.variable_name.clone()),
                    None => {
                        warn!(
                            endpoint = %endpoint.name,
                            slot = %slot,
                            "Path placeholder has no matching path parameter"
                        );
                        PathSegment::Slot(variable_name(slot))
                    }
                }
            }
            None => PathSegment::Literal(segment.clone()),
        })
        .collect()
}

fn path_template(segments: &[PathSegment]) -> String {
    let joined = segments
        .iter()
        .map(|segment| match segment {
            PathSegment::Literal(text) => text.clone(),
            PathSegment::Slot(variable) => format!("{{{variable}}}"),
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}

fn accessors(parameters: &ParameterGroups) -> Vec<GroupAccessor> {
    [
        ParameterLocation::Body,
        ParameterLocation::Query,
        ParameterLocation::Header,
    ]
    .into_iter()
    .filter_map(|location| {
        let group = parameters.group(location);
        let method_name = location.accessor_name()?;
        if group.is_empty() {
            return None;
        }
        Some(GroupAccessor {
            location,
            method_name: method_name.to_string(),
            entries: group
                .iter()
                .map(|p| (p.name.clone(), p.variable_name.clone()))
                .collect(),
        })
    })
    .collect()
}
