//! # Reactive Template Compiler
//!
//! Compiles an HTML page with embedded compiler-only script into a resolved
//! reactive model: the variables the page declares, the DOM properties that
//! read them and the events that mutate them, with imported components
//! inlined.
//!
//! ## Binding Invariants
//!
//! 1. **Declared Before Bound**: every property and event binds to a variable
//!    declared in a compiler-only script of the same unit. Bindings never reach
//!    across pages or into an importing page.
//!
//! 2. **Fixed Stage Order**: normalization, extraction, script scan, property
//!    binding, event binding, import expansion, reactive compile. No stage
//!    revisits an earlier one.
//!
//! 3. **Errors Accumulate**: a malformed or unresolved construct produces one
//!    diagnostic tagged with its file path and the unit keeps compiling. Only a
//!    missing entry file or an invalid config is fatal.
//!
//! 4. **Imports Inline In Place**: a component replaces its own import
//!    statement exactly once. An unresolved import leaves its statement in the
//!    markup; a cyclic import is reported and left unexpanded.
//!
//! 5. **Mixed Scripts Are Skipped**: a block marked both compiler and runtime
//!    is ignored without a diagnostic.

#[cfg(feature = "napi")]
mod native;

mod batch;
mod binder;
mod cache;
mod compiler;
mod config;
mod diagnostics;
mod error;
mod imports;
mod lexer;
mod models;
mod normalize;
mod page;
mod reactivity;


#[cfg(feature = "napi")]
pub use native::{compile_page_native, discover_pages_native};

pub use batch::{discover_pages, BatchOutput, PageResult};
pub use binder::{bind_events, bind_properties, VariableTable};
pub use cache::{CompiledComponent, ComponentCache, Dependency};
pub use compiler::{CompileOutput, Compiler, ScriptScan};
pub use config::CompilerConfig;
pub use diagnostics::{Accumulated, Diagnostic, Diagnostics};
pub use error::{
    BindingKind, HostError, ResolveError, TemplateError, HOST_ERROR, IMPORT_CYCLE, MALFORMED_BINDING,
    UNRESOLVED_BINDING, UNRESOLVED_IMPORT,
};
pub use imports::{ComponentResolver, FsComponentResolver, ImportStack, InMemoryResolver};
pub use lexer::{
    find_nodes, find_prop_nodes, strip_comments, BlockCommentNode, EventNode, ImportNode, LexNode,
    LineCommentNode, NodeKind, PropNode, VarNode,
};
pub use models::{
    Component, ComponentImport, ReactiveEvent, ReactiveProperty, ReactiveVariable, VariableId,
};
pub use normalize::{DefaultNormalizer, Normalizer};
pub use page::{mask_scripts, unmask_scripts, Page, ScriptBlock, ScriptKind};
pub use reactivity::{CompiledUnit, ModelEmitter, ReactiveModel, ReactivityCompiler};
