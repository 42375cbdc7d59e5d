//! Schema Builders
//!
//! Generates a mock factory and a fluent builder class for every named schema
//! a host discovers, as one TypeScript module.
//!
//! ## Pipeline
//!
//! ```text
//! add_schema(name, payload)*        intake, in discovery order
//!         │
//!         ▼
//! Schema::from_value                closed tagged model
//!         │
//!         ▼
//! ReferenceGraph::check_acyclic     reject reference cycles up front
//!         │
//!         ▼
//! Resolver::resolve_entry           inline $ref targets
//!         │
//!         ▼
//! CanonicalSchema::new              enum / or-union / allOf rewriting + fingerprint
//!         │
//!         ▼
//! codegen::emit                     shared constant table + builder classes
//!         │
//!         ▼
//! FileSink::create_file → add       exactly one generated file
//! ```

pub mod canonical;
pub mod codegen;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod graph;
pub mod plugin;
pub mod resolve;
pub mod schema;

pub use canonical::{canonicalize, CanonicalSchema};
pub use codegen::{emit, BuilderOptions, BuilderShape, BuilderSpec, GeneratedOutput};
pub use config::{BuildersConfig, PluginConfig};
pub use error::{BuilderError, Result};
pub use fingerprint::Fingerprint;
pub use graph::{Diagnostics, ReferenceGraph};
pub use plugin::{FileSink, GeneratedFile, GenerationReport, MemorySink, SchemaCollector};
pub use resolve::{resolve, Resolver};
pub use schema::{Schema, SchemaKind};
