//! Top-level compilation of a page.
//!
//! Stages run in a fixed order and never backtrack:
//!
//! `control flow -> element refs (page files only) -> text nodes -> property/event
//! extraction -> script scan (comments, variables, imports) -> bind properties
//! -> bind events -> import expansion -> reactive compile`
//!
//! Every recoverable failure becomes a [`Diagnostic`] and the pipeline keeps
//! going with whatever data is still valid.

use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, debug_span, warn};

use crate::binder::{bind_events, bind_properties, VariableTable};
use crate::cache::{CompiledComponent, ComponentCache, Dependency};
use crate::config::CompilerConfig;
use crate::diagnostics::{Accumulated, Diagnostic, Diagnostics};
use crate::error::{HostError, TemplateError, IMPORT_CYCLE, UNRESOLVED_IMPORT};
use crate::imports::{inline_component, ComponentResolver, FsComponentResolver, ImportStack};
use crate::lexer::{
    find_nodes, find_prop_nodes, strip_comments, EventNode, ImportNode, LexNode, PropNode, VarNode,
};
use crate::models::{Component, ComponentImport, ReactiveVariable};
use crate::normalize::{DefaultNormalizer, Normalizer};
use crate::page::{mask_scripts, unmask_scripts, Page, ScriptKind};
use crate::reactivity::{CompiledUnit, ModelEmitter, ReactiveModel, ReactivityCompiler};

/// Everything a host needs after compiling one entry file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutput {
    pub page: Page,
    pub model: ReactiveModel,
    pub errors: Vec<Diagnostic>,
}

impl CompileOutput {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Output of the script scan stage
#[derive(Debug, Default)]
pub struct ScriptScan {
    pub variables: VariableTable,
    pub imports: Vec<ComponentImport>,
}

pub struct Compiler {
    config: CompilerConfig,
    normalizer: Box<dyn Normalizer>,
    resolver: Box<dyn ComponentResolver>,
    reactivity: Box<dyn ReactivityCompiler>,
    cache: ComponentCache,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        let cache = match &config.cache_dir {
            Some(dir) => ComponentCache::persistent(dir.clone()),
            None => ComponentCache::in_memory(),
        };

        Self {
            normalizer: Box::new(DefaultNormalizer::new(&config)),
            resolver: Box::new(FsComponentResolver),
            reactivity: Box::new(ModelEmitter),
            cache,
            config,
        }
    }

    pub fn with_normalizer(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    pub fn with_resolver(mut self, resolver: impl ComponentResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_reactivity(mut self, reactivity: impl ReactivityCompiler + 'static) -> Self {
        self.reactivity = Box::new(reactivity);
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile one page. Diagnostics start empty for every call.
    pub fn compile_page(&self, file_path: &str, page: Page) -> CompileOutput {
        let mut diagnostics = Diagnostics::new();
        let mut stack = ImportStack::new();
        stack.push(self.resolver.identity(Path::new(file_path)));

        let (unit, _) = self.compile_unit(file_path, page, &mut stack, &mut diagnostics);
        diagnostics.report();

        CompileOutput {
            page: unit.page,
            model: unit.model,
            errors: diagnostics.into_vec(),
        }
    }

    pub fn compile_source(&self, file_path: &str, source: &str) -> CompileOutput {
        self.compile_page(file_path, Page::from_source(source, &self.config))
    }

    /// Compile an entry file from disk. A missing entry file is fatal.
    pub fn compile_file(&self, path: &Path) -> Result<CompileOutput, HostError> {
        let source = fs::read_to_string(path).map_err(|source| HostError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.compile_source(&path.to_string_lossy(), &source))
    }

    /// Also returns every component inlined into the unit, transitively
    fn compile_unit(
        &self,
        file_path: &str,
        page: Page,
        stack: &mut ImportStack,
        diagnostics: &mut Diagnostics,
    ) -> (CompiledUnit, Vec<Dependency>) {
        let span = debug_span!("compile_unit", file = file_path);
        let _enter = span.enter();

        let mut page = self.normalize(file_path, page);

        let property_nodes: Vec<LexNode<PropNode>> =
            find_prop_nodes::<PropNode>(&page.html_content, &self.config.property_prefix).collect();
        let event_nodes: Vec<LexNode<EventNode>> =
            find_prop_nodes::<EventNode>(&page.html_content, &self.config.event_prefix).collect();
        debug!(
            properties = property_nodes.len(),
            events = event_nodes.len(),
            "extracted bindings"
        );

        let ScriptScan {
            mut variables,
            imports,
        } = self.scan_scripts(&mut page).merge_into(diagnostics, file_path);

        diagnostics.extend(file_path, bind_properties(&mut variables, property_nodes));
        diagnostics.extend(file_path, bind_events(&mut variables, event_nodes));

        let (components, dependencies) =
            self.expand_imports(file_path, &mut page, imports, stack, diagnostics);

        let mut unit = self
            .reactivity
            .compile_reactivity(file_path, page, variables);
        unit.model.components = components;
        (unit, dependencies)
    }

    /// Run the normalizer over the markup. Script elements are masked first
    /// so their bodies, and the selectors captured for them, stay intact.
    fn normalize(&self, file_path: &str, mut page: Page) -> Page {
        let (mut html, scripts) = mask_scripts(&page.html_content);

        html = self.normalizer.expand_control_flow(file_path, &html);

        if self.config.is_page_extension(Path::new(file_path)) {
            html = self.normalizer.expand_element_refs(&html);
        }

        // Mustache shorthands become bindable elements, so this has to run
        // before any property or event extraction.
        html = self.normalizer.expand_text_nodes(&html);

        let (restored, lost) = unmask_scripts(&html, &scripts);
        for index in lost {
            warn!(file = file_path, index, "normalizer dropped a script element");
        }
        page.html_content = restored;
        page
    }

    /// Extract variables and imports from compiler-only scripts.
    ///
    /// Each consumed compiler-only element is replaced in the markup by its
    /// import statements, so import expansion inlines components where the
    /// statement was written. Runtime and mixed blocks are left alone.
    pub fn scan_scripts(&self, page: &mut Page) -> Accumulated<ScriptScan> {
        let config = &self.config;
        let mut scan = ScriptScan::default();
        let mut errors = Vec::new();

        for block in &page.java_script {
            match block.kind {
                ScriptKind::CompilerOnly => {}
                ScriptKind::Mixed => {
                    debug!("skipping mixed compiler/runtime script block");
                    continue;
                }
                ScriptKind::Runtime => continue,
            }

            let no_comments = strip_comments(&block.content, config);

            for node in find_nodes::<VarNode>(
                &no_comments,
                &config.variable_token,
                &config.statement_end_token,
            ) {
                match ReactiveVariable::from_node(node) {
                    Ok(variable) => {
                        scan.variables.insert(variable);
                    }
                    Err(e) => errors.push(e),
                }
            }

            let mut statements = Vec::new();
            for node in find_nodes::<ImportNode>(
                &no_comments,
                &config.import_prefix,
                &config.statement_end_token,
            ) {
                match ComponentImport::from_node(node) {
                    Ok(import) => {
                        statements.push(import.node.selector.clone());
                        scan.imports.push(import);
                    }
                    Err(e) => errors.push(e),
                }
            }

            page.html_content = page
                .html_content
                .replacen(&block.selector, &statements.join("\n"), 1);
        }

        Accumulated::with_errors(scan, errors)
    }

    fn expand_imports(
        &self,
        file_path: &str,
        page: &mut Page,
        imports: Vec<ComponentImport>,
        stack: &mut ImportStack,
        diagnostics: &mut Diagnostics,
    ) -> (Vec<ReactiveModel>, Vec<Dependency>) {
        let mut models = Vec::new();
        let mut dependencies = Vec::new();

        for import in imports {
            let component = match self.resolver.resolve(&import, Path::new(file_path)) {
                Ok(component) => component,
                Err(e) => {
                    diagnostics.push(
                        file_path,
                        TemplateError::UnresolvedImport {
                            path: import.path.clone(),
                            reason: e.to_string(),
                        },
                    );
                    continue;
                }
            };

            if stack.contains(&component.source_path) {
                diagnostics.push(
                    file_path,
                    TemplateError::ImportCycle {
                        chain: stack.cycle_chain(&component.source_path),
                    },
                );
                continue;
            }

            let dependency = Dependency::new(component.source_path.clone(), &component.content);
            let compiled = self.compile_component(component, stack, diagnostics);
            if !inline_component(page, &import, &compiled.html) {
                diagnostics.push(
                    file_path,
                    TemplateError::UnresolvedImport {
                        path: import.path.clone(),
                        reason: "import statement is no longer present in the markup".to_string(),
                    },
                );
                continue;
            }

            dependencies.push(dependency);
            dependencies.extend(compiled.dependencies);
            models.push(compiled.model);
        }

        (models, dependencies)
    }

    /// Whether every nested component still has the source it was compiled from
    fn dependencies_current(&self, dependencies: &[Dependency]) -> bool {
        dependencies.iter().all(|dependency| {
            self.resolver
                .read(&dependency.path)
                .map(|source| ComponentCache::compute_hash(&source) == dependency.hash)
                .unwrap_or(false)
        })
    }

    /// Compile a resolved component depth-first, or reuse a cached result
    fn compile_component(
        &self,
        component: Component,
        stack: &mut ImportStack,
        diagnostics: &mut Diagnostics,
    ) -> CompiledComponent {
        let Component {
            source_path,
            content,
        } = component;

        if let Some(cached) = self.cache.get(&source_path, &content) {
            if self.dependencies_current(&cached.dependencies) {
                diagnostics.append(cached.diagnostics.clone());
                return cached;
            }
            debug!("nested component changed under {}", source_path.display());
        }

        let component_path = source_path.to_string_lossy().to_string();
        let mut local = Diagnostics::new();

        stack.push(source_path.clone());
        let (unit, dependencies) = self.compile_unit(
            &component_path,
            Page::from_source(&content, &self.config),
            stack,
            &mut local,
        );
        stack.pop();

        let compiled = CompiledComponent {
            html: unit.page.html_content,
            model: unit.model,
            diagnostics: local.into_vec(),
            dependencies,
        };

        // Cycles depend on the importer and missing imports may appear later
        if !compiled
            .diagnostics
            .iter()
            .any(|d| d.code == IMPORT_CYCLE || d.code == UNRESOLVED_IMPORT)
        {
            self.cache.set(&source_path, &content, compiled.clone());
        }

        diagnostics.append(compiled.diagnostics.clone());
        compiled
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}
