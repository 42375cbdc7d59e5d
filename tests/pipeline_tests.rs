//! Pipeline Tests
//!
//! Runs whole documents through intake, resolution, canonicalization and
//! emission, and checks the generated module.

use serde_json::{json, Value};

use schema_builders::graph::{load_openapi, DiagnosticCode};
use schema_builders::{
    BuilderError, BuilderOptions, GeneratedFile, GenerationReport, MemorySink, PluginConfig, SchemaCollector,
};

fn fixture(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

fn collect(document: &Value) -> SchemaCollector {
    let mut collector = SchemaCollector::new();
    collector.extend(load_openapi(document).unwrap());
    collector
}

fn run(collector: SchemaCollector) -> (GeneratedFile, GenerationReport) {
    let mut sink = MemorySink::new();
    let report = collector
        .finalize(&PluginConfig::default(), &BuilderOptions::default(), &mut sink)
        .unwrap();
    let mut files = sink.into_files();
    assert_eq!(files.len(), 1, "exactly one file per run");
    (files.remove(0), report)
}

// =============================================================================
// OpenAPI Document
// =============================================================================

#[test]
fn test_petstore_builders() {
    let (file, report) = run(collect(&fixture(include_str!("fixtures/petstore.json"))));
    let code = file.content();

    assert_eq!(file.id, "hey-api-builders");
    assert_eq!(file.path, "builders");
    assert_eq!(report.schema_count, 4);
    assert_eq!(report.builder_count, 4);

    for class in ["PetBuilder", "PetStatusBuilder", "OwnerBuilder", "CustomerBuilder"] {
        assert!(code.contains(&format!("export class {} {{", class)), "missing {}", class);
        assert!(code.contains(&format!("export function create{0}(): {0} {{", class)));
    }

    assert!(code.contains("  withId(value: types.Pet[\"id\"]): this {\n"));
    assert!(code.contains("  withOwner(value: types.Pet[\"owner\"]): this {\n"));
    assert!(code.contains("  withFirstName(value: types.Customer[\"first_name\"]): this {\n"));
    assert!(!code.contains("withTags"));
}

#[test]
fn test_references_are_inlined() {
    let (file, _) = run(collect(&fixture(include_str!("fixtures/petstore.json"))));
    let code = file.content();

    assert!(!code.contains("$ref"));
    assert!(code.contains("\"enum\": [\n          \"available\",\n          \"pending\",\n          \"sold\"\n        ]"));
}

#[test]
fn test_identical_schemas_share_a_constant() {
    let (file, report) = run(collect(&fixture(include_str!("fixtures/petstore.json"))));
    let code = file.content();

    // Owner and Customer canonicalize to the same tree
    assert_eq!(report.constant_count, 3);
    assert!(!code.contains("\"CustomerSchema\""));
    assert_eq!(code.matches("generateMock(schemas[\"OwnerSchema\"]").count(), 2);
}

#[test]
fn test_bracketed_property_is_reported() {
    let (_, report) = run(collect(&fixture(include_str!("fixtures/petstore.json"))));

    let skipped: Vec<_> = report.diagnostics.with_code(DiagnosticCode::BracketedProperty).collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].schema_id, "PetSchema");
    assert_eq!(report.diagnostics.warning_count(), 0);
}

#[test]
fn test_output_is_deterministic() {
    let document = fixture(include_str!("fixtures/petstore.json"));
    let (first, _) = run(collect(&document));
    let (second, _) = run(collect(&document));
    assert_eq!(first.content(), second.content());
}

#[test]
fn test_nested_shapes_resolve_every_reference() {
    let (file, report) = run(collect(&fixture(include_str!("fixtures/nested_shapes.json"))));
    let code = file.content();

    assert_eq!(report.builder_count, 4);

    // Only the prefixItems reference is left in place, and it is reported
    assert_eq!(code.matches("\"$ref\"").count(), 1);
    let unresolved: Vec<_> = report.diagnostics.with_code(DiagnosticCode::UnresolvedRef).collect();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].schema_id, "Window");
    assert!(unresolved[0].message.contains("prefixItems"));

    assert!(code.contains(
        "\"PairSchema\": {\n    \"type\": \"tuple\",\n    \"items\": [\n      {\n        \"type\": \"string\",\n        \"minLength\": 1\n      },"
    ));
    assert!(code.contains("\"items\": {\n          \"type\": \"string\",\n          \"minLength\": 1\n        }"));
}

#[test]
fn test_nullable_object_property_keeps_null() {
    let (file, _) = run(collect(&fixture(include_str!("fixtures/nested_shapes.json"))));
    assert!(file.content().contains(
        "\"owner\": {\n        \"type\": [\n          \"object\",\n          \"null\"\n        ],"
    ));
}

#[test]
fn test_false_schema_does_not_abort() {
    let (file, _) = run(collect(&fixture(include_str!("fixtures/nested_shapes.json"))));
    assert!(file.content().contains("export class WindowBuilder {"));
    assert!(file.content().contains("\"not\": {}"));
}

// =============================================================================
// Failure Modes
// =============================================================================

#[test]
fn test_cycle_aborts_generation() {
    let collector = collect(&fixture(include_str!("fixtures/cyclic.json")));
    let mut sink = MemorySink::new();
    let err = collector
        .finalize(&PluginConfig::default(), &BuilderOptions::default(), &mut sink)
        .unwrap_err();

    match err {
        BuilderError::CyclicSchema { schema, cycle } => {
            assert!(schema == "Node" || schema == "Child", "unexpected schema {}", schema);
            assert_eq!(cycle.first(), cycle.last());
            assert_eq!(cycle.len(), 3);
        }
        other => panic!("Expected CyclicSchema, got {:?}", other),
    }
    assert!(sink.files().is_empty());
}

#[test]
fn test_dangling_reference_still_generates() {
    let (file, report) = run(collect(&fixture(include_str!("fixtures/dangling.json"))));

    let unresolved: Vec<_> = report.diagnostics.with_code(DiagnosticCode::UnresolvedRef).collect();
    assert_eq!(unresolved.len(), 1);
    assert_eq!(unresolved[0].schema_id, "Order");
    assert!(unresolved[0].message.contains("#/definitions/Missing"));

    assert!(file.content().contains("export class OrderBuilder {"));
    assert!(file.content().contains("\"$ref\": \"#/definitions/Missing\""));
}

// =============================================================================
// Intake
// =============================================================================

#[test]
fn test_skipped_payloads_produce_no_builder() {
    let mut collector = SchemaCollector::new();
    collector.add_schema("Empty", None);
    collector.add_schema("Scalar", Some(json!("string")));
    collector.add_schema("TestSchema", Some(json!({ "type": "object", "properties": { "name": { "type": "string" } } })));

    let (file, report) = run(collector);
    assert_eq!(report.builder_count, 1);
    assert!(!file.content().contains("EmptyBuilder"));
    assert!(!file.content().contains("ScalarBuilder"));
    assert!(file.content().contains("  withName(value: types.Test[\"name\"]): this {\n"));
}

#[test]
fn test_empty_intake_still_writes_module() {
    let (file, report) = run(SchemaCollector::new());
    assert_eq!(report.builder_count, 0);
    assert!(file.content().contains("const schemas = {};\n"));
}

#[test]
fn test_overrides_win_over_generated_values() {
    let mut collector = SchemaCollector::new();
    collector.add_schema("User", Some(json!({ "type": "object", "properties": { "email": { "type": "string" } } })));

    let (file, _) = run(collector);
    let code = file.content();
    let build = code.find("  build(): types.User {").unwrap();
    let tail = &code[build..];
    assert!(tail.contains("return { ...mock, ...this.overrides };"));
}

#[test]
fn test_default_options_reach_every_builder() {
    let mut collector = SchemaCollector::new();
    collector.add_schema("A", Some(json!({ "type": "string" })));
    collector.add_schema("B", Some(json!({ "type": "number" })));

    let defaults = BuilderOptions {
        omit_nulls: Some(true),
        ..BuilderOptions::default()
    };
    let mut sink = MemorySink::new();
    collector.finalize(&PluginConfig::default(), &defaults, &mut sink).unwrap();

    let code = sink.files()[0].content();
    assert_eq!(code.matches("private options: BuilderOptions = {\"omitNulls\":true};").count(), 2);
}
