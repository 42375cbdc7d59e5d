//! TypeScript Emitter
//!
//! Renders an [`EmissionPlan`] as one TypeScript module.
//!
//! Key constraints:
//! - This module ONLY receives the plan and the default options
//! - Class shapes and setter names come from BuilderSpec (already decided)
//! - Import paths are part of the generated-code contract and never vary

use serde_json::{Map, Value};

use crate::error::Result;

use super::{BuilderOptions, BuilderShape, BuilderSpec, EmissionPlan, OverrideMethod, OPTION_MAPPINGS};

/// Module that provides `generateMock` at runtime
pub const MOCK_MODULE: &str = "hey-api-builders";

/// Companion type declarations, imported as `types`
pub const TYPES_MODULE: &str = "./types.gen";

const INDENT: &str = "  ";

// =============================================================================
// Public API
// =============================================================================

/// Render the complete module text
pub fn render(plan: &EmissionPlan<'_>, defaults: &BuilderOptions) -> Result<String> {
    let mut output = String::new();

    output.push_str(&format!("import {{ generateMock }} from \"{}\";\n", MOCK_MODULE));
    output.push_str(&format!("import type * as types from \"{}\";\n\n", TYPES_MODULE));

    emit_options_type(&mut output);
    emit_constant_table(&mut output, plan)?;

    let defaults = serde_json::to_string(defaults)?;
    for spec in &plan.builders {
        output.push('\n');
        emit_builder(&mut output, spec, &defaults)?;
    }

    Ok(output)
}

// =============================================================================
// Module Preamble
// =============================================================================

fn emit_options_type(output: &mut String) {
    output.push_str("export type BuilderOptions = {\n");
    for option in &OPTION_MAPPINGS {
        output.push_str(&format!("{}{}?: {};\n", INDENT, option.builder_key, option.ts_type));
    }
    output.push_str("};\n\n");
}

fn emit_constant_table(output: &mut String, plan: &EmissionPlan<'_>) -> Result<()> {
    let table: Map<String, Value> = plan
        .constants
        .iter()
        .map(|(name, schema)| (name.clone(), schema.to_value()))
        .collect();
    let literal = serde_json::to_string_pretty(&Value::Object(table))?;
    output.push_str(&format!("const schemas = {};\n", literal));
    Ok(())
}

// =============================================================================
// Builder Emission
// =============================================================================

fn emit_builder(output: &mut String, spec: &BuilderSpec, defaults: &str) -> Result<()> {
    let ty = format!("types.{}", spec.type_name);

    output.push_str(&format!("export class {} {{\n", spec.builder_class_name));
    if let BuilderShape::Object { .. } = spec.shape {
        output.push_str(&format!("{}private overrides: Partial<{}> = {{}};\n", INDENT, ty));
    }
    output.push_str(&format!("{}private options: BuilderOptions = {};\n\n", INDENT, defaults));

    emit_set_options(output);
    for method in spec.methods() {
        emit_override_method(output, method, &ty)?;
    }
    emit_build(output, spec, &ty)?;

    output.push_str("}\n\n");
    output.push_str(&format!(
        "export function {}(): {} {{\n{}return new {}();\n}}\n",
        spec.factory_name, spec.builder_class_name, INDENT, spec.builder_class_name
    ));
    Ok(())
}

fn emit_set_options(output: &mut String) {
    output.push_str(&format!("{}setOptions(options: BuilderOptions): this {{\n", INDENT));
    output.push_str(&format!("{0}{0}this.options = options;\n", INDENT));
    output.push_str(&format!("{0}{0}return this;\n", INDENT));
    output.push_str(&format!("{}}}\n\n", INDENT));
}

fn emit_override_method(output: &mut String, method: &OverrideMethod, ty: &str) -> Result<()> {
    let key = serde_json::to_string(&method.property)?;
    output.push_str(&format!(
        "{}{}(value: {}[{}]): this {{\n",
        INDENT, method.method_name, ty, key
    ));
    output.push_str(&format!("{0}{0}this.overrides[{1}] = value;\n", INDENT, key));
    output.push_str(&format!("{0}{0}return this;\n", INDENT));
    output.push_str(&format!("{}}}\n\n", INDENT));
    Ok(())
}

fn emit_build(output: &mut String, spec: &BuilderSpec, ty: &str) -> Result<()> {
    let constant = serde_json::to_string(&spec.schema_constant_name)?;

    output.push_str(&format!("{}build(): {} {{\n", INDENT, ty));
    let call = format!("generateMock(schemas[{}], {{\n", constant);
    match spec.shape {
        BuilderShape::Object { .. } => output.push_str(&format!("{0}{0}const mock = {1}", INDENT, call)),
        BuilderShape::Enumeration | BuilderShape::Value => {
            output.push_str(&format!("{0}{0}return {1}", INDENT, call))
        }
    }
    for option in &OPTION_MAPPINGS {
        output.push_str(&format!(
            "{0}{0}{0}{1}: this.options.{2},\n",
            INDENT, option.generator_key, option.builder_key
        ));
    }
    output.push_str(&format!("{0}{0}}}) as {1};\n", INDENT, ty));

    if let BuilderShape::Object { .. } = spec.shape {
        output.push_str(&format!("{0}{0}return {{ ...mock, ...this.overrides }};\n", INDENT));
    }
    output.push_str(&format!("{}}}\n", INDENT));
    Ok(())
}
