pub mod grouping;
pub mod methods;
pub mod naming;
pub mod tags;
pub mod types;

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::PathBuf;

use crate::config::BuilderConfig;
use crate::error::{BuildError, ResolveError};
use crate::ir::{ClientIndex, Resource, Tag, TypeDef};
use crate::parse::SpecModel;
use crate::parse::spec::OpenApiSpec;
use crate::writer::{WriteOutcome, write_file};
use crate::{GeneratedFile, SdkEmitter};

use grouping::SchemaIndex;
use methods::PathToMethodCompiler;
use naming::normalize_name;
use tags::TagResolver;
use types::{TypeBuilder, schemas_to_types};

/// Summary of a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Tags of the resources generated, in index order.
    pub resources: Vec<String>,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Drives one generation run: index the document, build one [`Resource`]
/// per tag, write per-resource files, then write the aggregate client files.
///
/// The model, tag resolver, index and configuration are read-only for the
/// whole run.
pub struct Builder<'a> {
    config: &'a BuilderConfig,
    model: SpecModel<'a>,
    tags: TagResolver,
    index: SchemaIndex<'a>,
}

impl<'a> Builder<'a> {
    pub fn load(spec: &'a OpenApiSpec, config: &'a BuilderConfig) -> Result<Self, BuildError> {
        let model = SpecModel::new(spec);
        let tags = TagResolver::new(model.declared_tags());
        let index = SchemaIndex::build(&model, &tags)?;
        check_packages(&index)?;
        log::debug!("indexed {} tags", index.len());
        Ok(Self {
            config,
            model,
            tags,
            index,
        })
    }

    pub fn config(&self) -> &BuilderConfig {
        self.config
    }

    pub fn index(&self) -> &SchemaIndex<'a> {
        &self.index
    }

    /// Canonical descriptor for a tag name.
    pub fn tag(&self, name: &str) -> Tag {
        self.tags.resolve(name)
    }

    /// Build the IR for one tag.
    pub fn build_resource(&self, tag: &Tag) -> Result<Resource, BuildError> {
        let err = |source| BuildError::Resource {
            tag: tag.name.clone(),
            source,
        };
        if tag.name.trim().is_empty() {
            return Err(err(ResolveError::EmptyResourceTag));
        }

        let schemas = self.index.schemas_for(&tag.name);
        let operations = self.index.paths_for(&tag.name);

        let mut types = TypeBuilder::new(self.model, schemas);
        let component_types = schemas_to_types(&mut types, schemas).map_err(err)?;
        let compiled = PathToMethodCompiler::new(self.model, &mut types, operations)
            .and_then(PathToMethodCompiler::compile)
            .map_err(err)?;

        let name = normalize_name(&tag.name);
        let mut resource = Resource {
            tag: tag.clone(),
            package: name.snake_case,
            service: name.pascal_case,
            types: component_types,
            inner_types: compiled.inner_types(),
            methods: compiled.methods,
            type_names: Vec::new(),
        };
        resource.type_names = imported_type_names(&resource);

        if let Some(missing) = resource.dangling_references().into_iter().next() {
            return Err(err(ResolveError::DanglingType(missing)));
        }

        log::info!(
            "{}: {} types, {} inner types, {} methods",
            resource.package,
            resource.types.len(),
            resource.inner_types.len(),
            resource.methods.len()
        );
        Ok(resource)
    }

    /// Build every resource, in first-seen tag order.
    pub fn resources(&self) -> Result<Vec<Resource>, BuildError> {
        self.index
            .tags()
            .map(|tag| self.build_resource(tag))
            .collect()
    }

    pub fn client_index(&self, resources: &[Resource]) -> ClientIndex {
        let spec = self.model.spec();
        ClientIndex::new(
            spec.info.title.clone(),
            spec.info.version.clone(),
            spec.servers.first().map(|s| s.url.clone()),
            resources,
        )
    }

    /// Write the resource's component types file.
    pub fn generate_resource_types(
        &self,
        emitter: &dyn SdkEmitter,
        resource: &Resource,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        let file = emitter
            .types_file(resource, self.config)
            .map_err(|source| BuildError::Emit {
                target: format!("types for {}", resource.tag.name),
                source,
            })?;
        self.write(&file, report)
    }

    /// Write the resource module, creating its directory if needed.
    pub fn generate_resource(
        &self,
        emitter: &dyn SdkEmitter,
        resource: &Resource,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        let dir = self.config.out.join(&resource.package);
        fs::create_dir_all(&dir).map_err(|source| BuildError::Io {
            path: dir.clone(),
            source,
        })?;

        let files = emitter
            .resource_files(resource, self.config)
            .map_err(|source| BuildError::Emit {
                target: format!("resource {}", resource.tag.name),
                source,
            })?;
        for file in &files {
            self.write(file, report)?;
        }
        Ok(())
    }

    pub fn write_client_file(
        &self,
        emitter: &dyn SdkEmitter,
        index: &ClientIndex,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        let file = emitter
            .client_file(index, self.config)
            .map_err(|source| BuildError::Emit {
                target: "client".to_string(),
                source,
            })?;
        self.write(&file, report)
    }

    pub fn write_client_package(
        &self,
        emitter: &dyn SdkEmitter,
        index: &ClientIndex,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        let files = emitter
            .package_files(index, self.config)
            .map_err(|source| BuildError::Emit {
                target: "package".to_string(),
                source,
            })?;
        for file in &files {
            self.write(file, report)?;
        }
        Ok(())
    }

    /// Run the whole pipeline. Aggregate files are written only after every
    /// resource was written.
    pub fn build(&self, emitter: &dyn SdkEmitter) -> Result<BuildReport, BuildError> {
        let resources = self.resources()?;
        let mut report = BuildReport::default();

        for resource in &resources {
            self.generate_resource_types(emitter, resource, &mut report)?;
            self.generate_resource(emitter, resource, &mut report)?;
            report.resources.push(resource.tag.name.clone());
        }

        let index = self.client_index(&resources);
        self.write_client_file(emitter, &index, &mut report)?;
        self.write_client_package(emitter, &index, &mut report)?;

        log::info!(
            "generated {} resources ({} files written, {} skipped)",
            report.resources.len(),
            report.written.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn write(&self, file: &GeneratedFile, report: &mut BuildReport) -> Result<(), BuildError> {
        match write_file(&self.config.out, file, self.config.force)? {
            WriteOutcome::Written(path) => report.written.push(path),
            WriteOutcome::Skipped(path) => report.skipped.push(path),
        }
        Ok(())
    }
}

/// Every tag must own its package directory.
fn check_packages(index: &SchemaIndex<'_>) -> Result<(), BuildError> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    for tag in index.tags() {
        let package = normalize_name(&tag.name).snake_case;
        if let Some(other) = owners.insert(package.clone(), &tag.name) {
            return Err(BuildError::Resource {
                tag: tag.name.clone(),
                source: ResolveError::DuplicatePackage {
                    package,
                    tag: tag.name.clone(),
                    other: other.to_string(),
                },
            });
        }
    }
    Ok(())
}

/// Component type names the resource module uses, sorted.
fn imported_type_names(resource: &Resource) -> Vec<String> {
    let components: BTreeSet<&str> = resource.types.iter().map(TypeDef::type_name).collect();
    let mut used = BTreeSet::new();
    for method in &resource.methods {
        used.extend(method.references());
    }
    for def in &resource.inner_types {
        used.extend(def.references());
    }
    used.into_iter()
        .filter(|name| components.contains(name.as_str()))
        .collect()
}
