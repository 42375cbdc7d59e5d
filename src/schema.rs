//! Schema model
//!
//! A closed, tagged tree over the JSON shapes the generator understands.
//! Raw host payloads are parsed once into [`Schema`]; every later pass
//! (resolution, canonicalization, emission) matches on [`SchemaKind`]
//! instead of probing JSON fields.
//!
//! Keywords that carry no structure for the generator (`format`, `minimum`,
//! `description`, ...) are kept in [`Schema::extensions`] and written back
//! untouched, so the mock generator still sees them.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{BuilderError, Result};

// =============================================================================
// Primitive Types
// =============================================================================

/// JSON primitive type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Number,
    Integer,
    Boolean,
    Null,
}

impl Primitive {
    pub fn from_json_type(type_str: &str) -> Option<Self> {
        match type_str {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// Primitive type of a constant value (numbers are always `number`)
    pub fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => Some(Self::String),
            Value::Number(_) => Some(Self::Number),
            Value::Bool(_) => Some(Self::Boolean),
            Value::Null => Some(Self::Null),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

/// A `type` keyword made only of primitives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeTag {
    Single(Primitive),
    Many(Vec<Primitive>),
}

impl TypeTag {
    /// Build a tag from primitives, dropping repeats but keeping first-seen order.
    ///
    /// Returns `None` for an empty input.
    pub fn from_primitives(types: impl IntoIterator<Item = Primitive>) -> Option<Self> {
        let mut distinct: Vec<Primitive> = Vec::new();
        for ty in types {
            if !distinct.contains(&ty) {
                distinct.push(ty);
            }
        }
        match distinct.len() {
            0 => None,
            1 => Some(Self::Single(distinct[0])),
            _ => Some(Self::Many(distinct)),
        }
    }

    /// Parse a `type` keyword; `None` if any member is not a primitive.
    pub fn parse(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Primitive::from_json_type(s).map(Self::Single),
            Value::Array(items) if !items.is_empty() => {
                let types = items
                    .iter()
                    .map(|v| v.as_str().and_then(Primitive::from_json_type))
                    .collect::<Option<Vec<_>>>()?;
                Self::from_primitives(types)
            }
            _ => None,
        }
    }

    /// The primitive, if this tag names exactly one
    pub fn single(&self) -> Option<Primitive> {
        match self {
            Self::Single(p) => Some(*p),
            Self::Many(_) => None,
        }
    }

    pub fn primitives(&self) -> &[Primitive] {
        match self {
            Self::Single(p) => std::slice::from_ref(p),
            Self::Many(ps) => ps,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Single(p) => Value::String(p.as_str().to_string()),
            Self::Many(ps) => Value::Array(
                ps.iter().map(|p| Value::String(p.as_str().to_string())).collect(),
            ),
        }
    }
}

// =============================================================================
// Schema Tree
// =============================================================================

/// Explicit union keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKeyword {
    AnyOf,
    OneOf,
}

impl ChoiceKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnyOf => "anyOf",
            Self::OneOf => "oneOf",
        }
    }
}

/// Object shape: ordered properties plus required names
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    pub properties: IndexMap<String, Schema>,
    pub required: Vec<String>,
    /// `additionalProperties` when it is a schema (booleans stay in extensions)
    pub additional: Option<Box<Schema>>,
}

/// Item shape of an array
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayItems {
    Single(Box<Schema>),
    /// Legacy form: item types to be unioned
    Sequence(Vec<Schema>),
    /// `type: "tuple"`: one schema per position
    Tuple(Vec<Schema>),
    /// No `items` keyword
    Any,
}

/// Primitive leaf
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Leaf {
    pub ty: Option<TypeTag>,
    pub default: Option<Value>,
    pub examples: Option<Vec<Value>>,
}

impl Leaf {
    /// Build a leaf, moving `default` and array-valued `examples` out of `rest`.
    pub fn take(ty: Option<TypeTag>, rest: &mut Map<String, Value>) -> Self {
        let default = rest.remove("default");
        let examples = match rest.remove("examples") {
            Some(Value::Array(examples)) => Some(examples),
            Some(other) => {
                rest.insert("examples".into(), other);
                None
            }
            None => None,
        };
        Self { ty, default, examples }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// `$ref` pointer to another named schema
    Reference(String),
    Object(ObjectSchema),
    Array(ArrayItems),
    /// `allOf` composition, merged by the canonicalizer
    AllOf(Vec<Schema>),
    /// `anyOf` / `oneOf` branch list
    Choice {
        keyword: ChoiceKeyword,
        branches: Vec<Schema>,
    },
    /// Raw enumeration: `type: "enum"` with one `const` record per variant
    VariantList(Vec<Schema>),
    /// Raw union: `items` tagged with `logicalOperator: "or"`
    OrList(Vec<Schema>),
    /// Canonical enumeration
    Enum {
        ty: Option<TypeTag>,
        values: Vec<Value>,
    },
    Leaf(Leaf),
}

/// A schema node
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub kind: SchemaKind,
    /// Keywords with no structural meaning here, in original order.
    ///
    /// Objects and arrays whose `type` is not the bare keyword (`["object",
    /// "null"]`, `"tuple"`) keep it here, and it is written back as is.
    pub extensions: Map<String, Value>,
}

/// Extension keywords that hold instance data rather than schemas
const DATA_KEYWORDS: [&str; 5] = ["const", "default", "enum", "example", "examples"];

impl Schema {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            extensions: Map::new(),
        }
    }

    pub fn leaf(ty: Primitive) -> Self {
        Self::new(SchemaKind::Leaf(Leaf {
            ty: Some(TypeTag::Single(ty)),
            ..Leaf::default()
        }))
    }

    pub fn reference(pointer: impl Into<String>) -> Self {
        Self::new(SchemaKind::Reference(pointer.into()))
    }

    /// The `false` schema: matches nothing
    pub fn never() -> Self {
        let mut schema = Self::new(SchemaKind::Leaf(Leaf::default()));
        schema.extensions.insert("not".into(), Value::Object(Map::new()));
        schema
    }

    /// `type` as written for an object or array node: the kept raw value, or `keyword`
    fn structural_type(&self, keyword: &str) -> Value {
        self.extensions
            .get("type")
            .cloned()
            .unwrap_or_else(|| Value::String(keyword.into()))
    }

    /// Parse a raw payload. `schema_name` is only used in error messages.
    pub fn from_value(schema_name: &str, value: &Value) -> Result<Self> {
        Parser { schema_name }.node(value, "#")
    }

    /// Write the node back as JSON: structural keywords first, then extensions.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        let list = |schemas: &[Schema]| Value::Array(schemas.iter().map(Schema::to_value).collect());

        match &self.kind {
            SchemaKind::Reference(pointer) => {
                map.insert("$ref".into(), Value::String(pointer.clone()));
            }
            SchemaKind::Object(object) => {
                map.insert("type".into(), self.structural_type("object"));
                let properties = object
                    .properties
                    .iter()
                    .map(|(name, prop)| (name.clone(), prop.to_value()))
                    .collect::<Map<_, _>>();
                map.insert("properties".into(), Value::Object(properties));
                if !object.required.is_empty() {
                    map.insert(
                        "required".into(),
                        Value::Array(object.required.iter().cloned().map(Value::String).collect()),
                    );
                }
                if let Some(additional) = &object.additional {
                    map.insert("additionalProperties".into(), additional.to_value());
                }
            }
            SchemaKind::Array(items) => {
                map.insert("type".into(), self.structural_type("array"));
                match items {
                    ArrayItems::Single(item) => {
                        map.insert("items".into(), item.to_value());
                    }
                    ArrayItems::Sequence(items) | ArrayItems::Tuple(items) => {
                        map.insert("items".into(), list(items));
                    }
                    ArrayItems::Any => {}
                }
            }
            SchemaKind::AllOf(branches) => {
                map.insert("allOf".into(), list(branches));
            }
            SchemaKind::Choice { keyword, branches } => {
                map.insert(keyword.as_str().into(), list(branches));
            }
            SchemaKind::VariantList(variants) => {
                map.insert("type".into(), Value::String("enum".into()));
                map.insert("items".into(), list(variants));
            }
            SchemaKind::OrList(branches) => {
                map.insert("items".into(), list(branches));
                map.insert("logicalOperator".into(), Value::String("or".into()));
            }
            SchemaKind::Enum { ty, values } => {
                if let Some(ty) = ty {
                    map.insert("type".into(), ty.to_value());
                }
                map.insert("enum".into(), Value::Array(values.clone()));
            }
            SchemaKind::Leaf(leaf) => {
                if let Some(ty) = &leaf.ty {
                    map.insert("type".into(), ty.to_value());
                }
                if let Some(default) = &leaf.default {
                    map.insert("default".into(), default.clone());
                }
                if let Some(examples) = &leaf.examples {
                    map.insert("examples".into(), Value::Array(examples.clone()));
                }
            }
        }

        for (key, value) in &self.extensions {
            if !map.contains_key(key) {
                map.insert(key.clone(), value.clone());
            }
        }
        Value::Object(map)
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The single primitive type of this node, if it declares exactly one
    pub fn single_primitive(&self) -> Option<Primitive> {
        match &self.kind {
            SchemaKind::Leaf(leaf) => leaf.ty.as_ref().and_then(TypeTag::single),
            SchemaKind::Enum { ty, .. } => ty.as_ref().and_then(TypeTag::single),
            _ => None,
        }
    }

    /// All primitive types this node declares (empty if it is not primitive)
    pub fn primitive_types(&self) -> &[Primitive] {
        match &self.kind {
            SchemaKind::Leaf(Leaf { ty: Some(ty), .. })
            | SchemaKind::Enum { ty: Some(ty), .. } => ty.primitives(),
            _ => &[],
        }
    }

    /// Direct child schemas, in document order
    pub fn children(&self) -> Vec<&Schema> {
        match &self.kind {
            SchemaKind::Object(object) => object
                .properties
                .values()
                .chain(object.additional.as_deref())
                .collect(),
            SchemaKind::Array(ArrayItems::Single(item)) => vec![item.as_ref()],
            SchemaKind::Array(ArrayItems::Sequence(items) | ArrayItems::Tuple(items))
            | SchemaKind::AllOf(items)
            | SchemaKind::Choice { branches: items, .. }
            | SchemaKind::VariantList(items)
            | SchemaKind::OrList(items) => items.iter().collect(),
            SchemaKind::Array(ArrayItems::Any)
            | SchemaKind::Reference(_)
            | SchemaKind::Enum { .. }
            | SchemaKind::Leaf(_) => Vec::new(),
        }
    }

    /// Mutable direct children, in document order
    pub fn children_mut(&mut self) -> Vec<&mut Schema> {
        match &mut self.kind {
            SchemaKind::Object(object) => object
                .properties
                .values_mut()
                .chain(object.additional.as_deref_mut())
                .collect(),
            SchemaKind::Array(ArrayItems::Single(item)) => vec![item.as_mut()],
            SchemaKind::Array(ArrayItems::Sequence(items) | ArrayItems::Tuple(items))
            | SchemaKind::AllOf(items)
            | SchemaKind::Choice { branches: items, .. }
            | SchemaKind::VariantList(items)
            | SchemaKind::OrList(items) => items.iter_mut().collect(),
            SchemaKind::Array(ArrayItems::Any)
            | SchemaKind::Reference(_)
            | SchemaKind::Enum { .. }
            | SchemaKind::Leaf(_) => Vec::new(),
        }
    }

    /// Every `$ref` pointer in this tree, in document order
    pub fn references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a str>) {
        if let SchemaKind::Reference(pointer) = &self.kind {
            refs.push(pointer);
        }
        for child in self.children() {
            child.collect_references(refs);
        }
    }

    /// `$ref` pointers inside keywords the model does not parse (`prefixItems`,
    /// `not`, `patternProperties`, ...), as `(keyword, pointer)` pairs.
    ///
    /// These are never inlined.
    pub fn unparsed_references(&self) -> Vec<(&str, &str)> {
        let mut refs = Vec::new();
        self.collect_unparsed(&mut refs);
        refs
    }

    fn collect_unparsed<'a>(&'a self, refs: &mut Vec<(&'a str, &'a str)>) {
        for (keyword, value) in &self.extensions {
            if !DATA_KEYWORDS.contains(&keyword.as_str()) {
                raw_references(keyword, value, refs);
            }
        }
        for child in self.children() {
            child.collect_unparsed(refs);
        }
    }
}

fn raw_references<'a>(keyword: &'a str, value: &'a Value, refs: &mut Vec<(&'a str, &'a str)>) {
    match value {
        Value::Object(map) => {
            if let Some(pointer) = map.get("$ref").and_then(Value::as_str) {
                refs.push((keyword, pointer));
            }
            for (key, nested) in map {
                if !DATA_KEYWORDS.contains(&key.as_str()) {
                    raw_references(keyword, nested, refs);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                raw_references(keyword, item, refs);
            }
        }
        _ => {}
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

// =============================================================================
// Parsing
// =============================================================================

struct Parser<'a> {
    schema_name: &'a str,
}

impl Parser<'_> {
    fn malformed(&self, pointer: &str, reason: impl std::fmt::Display) -> BuilderError {
        BuilderError::MalformedSchema {
            schema: self.schema_name.to_string(),
            reason: format!("{} at {}", reason, pointer),
        }
    }

    fn node(&self, value: &Value, pointer: &str) -> Result<Schema> {
        match value {
            Value::Object(obj) => self.object_node(obj, pointer),
            Value::Bool(true) => Ok(Schema::new(SchemaKind::Leaf(Leaf::default()))),
            Value::Bool(false) => Ok(Schema::never()),
            other => Err(self.malformed(pointer, format!("expected a schema object, found {}", other))),
        }
    }

    fn list(&self, items: &[Value], pointer: &str) -> Result<Vec<Schema>> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.node(item, &format!("{}/{}", pointer, i)))
            .collect()
    }

    fn object_node(&self, obj: &Map<String, Value>, pointer: &str) -> Result<Schema> {
        let mut rest = obj.clone();
        let type_value = obj.get("type");
        let type_str = type_value.and_then(Value::as_str);
        let item_list = obj.get("items").and_then(Value::as_array);
        let operator = obj.get("logicalOperator").and_then(Value::as_str);
        // An untyped or operator-tagged item list is the raw union form; any
        // other `items` makes an array
        let raw_union = item_list.is_some()
            && (type_value.is_none() || operator.is_some())
            && !names_type(type_value, "array")
            && type_str != Some("tuple");

        let kind = if let Some(pointer_str) = obj.get("$ref").and_then(Value::as_str) {
            rest.remove("$ref");
            SchemaKind::Reference(pointer_str.to_string())
        } else if type_str == Some("enum") {
            rest.remove("type");
            rest.remove("items");
            let variants = match item_list {
                Some(items) => self.list(items, &format!("{}/items", pointer))?,
                None => Vec::new(),
            };
            SchemaKind::VariantList(variants)
        } else if let Some(values) = obj.get("enum").and_then(Value::as_array) {
            let ty = type_value.and_then(TypeTag::parse);
            if ty.is_some() {
                rest.remove("type");
            }
            rest.remove("enum");
            SchemaKind::Enum {
                ty,
                values: values.clone(),
            }
        } else if names_type(type_value, "array") || (obj.contains_key("items") && !raw_union) {
            if type_str == Some("array") {
                rest.remove("type");
            }
            rest.remove("logicalOperator");
            let items_pointer = format!("{}/items", pointer);
            let items = match rest.remove("items") {
                Some(Value::Array(items)) if type_str == Some("tuple") => {
                    ArrayItems::Tuple(self.list(&items, &items_pointer)?)
                }
                Some(Value::Array(items)) => ArrayItems::Sequence(self.list(&items, &items_pointer)?),
                Some(item) => ArrayItems::Single(Box::new(self.node(&item, &items_pointer)?)),
                None => ArrayItems::Any,
            };
            SchemaKind::Array(items)
        } else if let (Some(items), true) = (item_list, raw_union) {
            rest.remove("items");
            rest.remove("logicalOperator");
            let branches = self.list(items, &format!("{}/items", pointer))?;
            match operator {
                Some("and") => SchemaKind::AllOf(branches),
                _ => SchemaKind::OrList(branches),
            }
        } else if let Some(branches) = obj.get("allOf").and_then(Value::as_array) {
            rest.remove("allOf");
            let mut parsed = Vec::with_capacity(branches.len() + 2);
            // Own properties next to allOf become the first branch
            if let Some(own) = self.own_object(&mut rest, pointer)? {
                parsed.push(own);
            }
            parsed.extend(self.list(branches, &format!("{}/allOf", pointer))?);
            // So does a sibling anyOf / oneOf, as the last one
            if let Some(choice) = self.own_choice(&mut rest, pointer)? {
                parsed.push(choice);
            }
            SchemaKind::AllOf(parsed)
        } else if obj.contains_key("properties") && choice(obj).is_some() {
            // `{properties, anyOf}` is the intersection of both parts
            let mut parsed = Vec::with_capacity(2);
            parsed.extend(self.own_object(&mut rest, pointer)?);
            parsed.extend(self.own_choice(&mut rest, pointer)?);
            SchemaKind::AllOf(parsed)
        } else if let Some((keyword, branches)) = choice(obj) {
            rest.remove(keyword.as_str());
            SchemaKind::Choice {
                keyword,
                branches: self.list(branches, &format!("{}/{}", pointer, keyword.as_str()))?,
            }
        } else if names_type(type_value, "object") || obj.contains_key("properties") {
            if type_str == Some("object") {
                rest.remove("type");
            }
            SchemaKind::Object(self.object_shape(&mut rest, pointer)?)
        } else {
            let ty = type_value.and_then(TypeTag::parse);
            if ty.is_some() {
                rest.remove("type");
            }
            SchemaKind::Leaf(Leaf::take(ty, &mut rest))
        };

        Ok(Schema {
            kind,
            extensions: rest,
        })
    }

    /// Own `properties` of a composition node, split off as an object branch
    fn own_object(&self, rest: &mut Map<String, Value>, pointer: &str) -> Result<Option<Schema>> {
        if !rest.contains_key("properties") {
            return Ok(None);
        }
        let object = self.object_shape(rest, pointer)?;
        let mut branch = Schema::new(SchemaKind::Object(object));
        if let Some(ty) = rest.remove("type") {
            if ty.as_str() != Some("object") {
                branch.extensions.insert("type".into(), ty);
            }
        }
        Ok(Some(branch))
    }

    /// Sibling `anyOf` / `oneOf` of a composition node, split off as a branch
    fn own_choice(&self, rest: &mut Map<String, Value>, pointer: &str) -> Result<Option<Schema>> {
        let Some((keyword, branches)) = choice(rest).map(|(k, b)| (k, b.clone())) else {
            return Ok(None);
        };
        rest.remove(keyword.as_str());
        let branches = self.list(&branches, &format!("{}/{}", pointer, keyword.as_str()))?;
        Ok(Some(Schema::new(SchemaKind::Choice { keyword, branches })))
    }

    /// Take `properties`, `required` and schema-valued `additionalProperties` out of `rest`.
    fn object_shape(&self, rest: &mut Map<String, Value>, pointer: &str) -> Result<ObjectSchema> {
        let mut object = ObjectSchema::default();

        match rest.remove("properties") {
            Some(Value::Object(props)) => {
                for (name, prop) in &props {
                    let prop_pointer = format!("{}/properties/{}", pointer, name);
                    object.properties.insert(name.clone(), self.node(prop, &prop_pointer)?);
                }
            }
            Some(other) => {
                return Err(self.malformed(
                    &format!("{}/properties", pointer),
                    format!("expected an object of properties, found {}", other),
                ))
            }
            None => {}
        }

        if let Some(Value::Array(required)) = rest.remove("required") {
            object.required = required
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect();
        }

        if let Some(additional) = rest.get("additionalProperties") {
            if additional.is_object() {
                let parsed = self.node(additional, &format!("{}/additionalProperties", pointer))?;
                object.additional = Some(Box::new(parsed));
                rest.remove("additionalProperties");
            }
        }

        Ok(object)
    }
}

/// Whether a `type` keyword names `keyword`, alone or in a list
fn names_type(type_value: Option<&Value>, keyword: &str) -> bool {
    match type_value {
        Some(Value::String(s)) => s == keyword,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(keyword)),
        _ => false,
    }
}

fn choice(obj: &Map<String, Value>) -> Option<(ChoiceKeyword, &Vec<Value>)> {
    [ChoiceKeyword::AnyOf, ChoiceKeyword::OneOf]
        .into_iter()
        .find_map(|keyword| obj.get(keyword.as_str()).and_then(Value::as_array).map(|b| (keyword, b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Schema {
        Schema::from_value("Test", &value).unwrap()
    }

    #[test]
    fn test_object_keeps_property_order() {
        let schema = parse(json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "string" },
                "alpha": { "type": "number", "minimum": 1 }
            },
            "required": ["zeta"]
        }));

        let object = schema.as_object().unwrap();
        let names: Vec<&str> = object.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(object.required, vec!["zeta"]);

        let alpha = &object.properties["alpha"];
        assert_eq!(alpha.single_primitive(), Some(Primitive::Number));
        assert_eq!(alpha.extensions.get("minimum"), Some(&json!(1)));
    }

    #[test]
    fn test_raw_enumeration_and_union_shapes() {
        let variants = parse(json!({ "type": "enum", "items": [{ "const": "A" }, { "const": "B" }] }));
        assert!(matches!(&variants.kind, SchemaKind::VariantList(v) if v.len() == 2));

        let union = parse(json!({
            "items": [{ "type": "string" }, { "type": "null" }],
            "logicalOperator": "or"
        }));
        assert!(matches!(&union.kind, SchemaKind::OrList(b) if b.len() == 2));
        assert!(union.extensions.is_empty());
    }

    #[test]
    fn test_ir_array_with_item_list() {
        let schema = parse(json!({ "type": "array", "items": [{ "type": "integer" }] }));
        match &schema.kind {
            SchemaKind::Array(ArrayItems::Sequence(items)) => {
                assert_eq!(items[0].single_primitive(), Some(Primitive::Integer));
            }
            other => panic!("Expected array sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_allof_with_own_properties() {
        let schema = parse(json!({
            "properties": { "id": { "type": "string" } },
            "allOf": [{ "$ref": "#/components/schemas/Base" }]
        }));
        match &schema.kind {
            SchemaKind::AllOf(branches) => {
                assert_eq!(branches.len(), 2);
                assert!(branches[0].as_object().is_some());
                assert_eq!(branches[1].references(), vec!["#/components/schemas/Base"]);
            }
            other => panic!("Expected allOf, got {:?}", other),
        }
    }

    #[test]
    fn test_round_trip_keeps_extensions() {
        let raw = json!({
            "type": "string",
            "format": "date-time",
            "default": "2024-01-01T00:00:00Z",
            "description": "When"
        });
        assert_eq!(parse(raw.clone()).to_value(), raw);
    }

    #[test]
    fn test_unknown_type_stays_in_extensions() {
        let schema = parse(json!({ "type": "unknown" }));
        assert!(schema.primitive_types().is_empty());
        assert_eq!(schema.to_value(), json!({ "type": "unknown" }));
    }

    #[test]
    fn test_nested_non_object_is_malformed() {
        let err = Schema::from_value("Pet", &json!({ "properties": { "name": 42 } })).unwrap_err();
        assert!(matches!(err, BuilderError::MalformedSchema { ref schema, .. } if schema == "Pet"));
        assert!(err.to_string().contains("#/properties/name"));
    }

    #[test]
    fn test_type_tag_dedup() {
        let tag = TypeTag::from_primitives([Primitive::String, Primitive::Number, Primitive::String]);
        assert_eq!(tag, Some(TypeTag::Many(vec![Primitive::String, Primitive::Number])));
        assert_eq!(TypeTag::from_primitives([Primitive::Null]), Some(TypeTag::Single(Primitive::Null)));
        assert_eq!(TypeTag::from_primitives([]), None);
    }

    #[test]
    fn test_nullable_array_parses_items() {
        let schema = parse(json!({
            "type": ["array", "null"],
            "items": { "$ref": "#/components/schemas/Tag" }
        }));
        match &schema.kind {
            SchemaKind::Array(ArrayItems::Single(item)) => {
                assert_eq!(item.references(), vec!["#/components/schemas/Tag"]);
            }
            other => panic!("Expected array, got {:?}", other),
        }
        assert_eq!(schema.to_value()["type"], json!(["array", "null"]));
    }

    #[test]
    fn test_tuple_items_are_parsed() {
        let schema = parse(json!({
            "type": "tuple",
            "items": [{ "$ref": "#/components/schemas/Tag" }, { "type": "number" }]
        }));
        match &schema.kind {
            SchemaKind::Array(ArrayItems::Tuple(items)) => assert_eq!(items.len(), 2),
            other => panic!("Expected tuple, got {:?}", other),
        }
        assert_eq!(schema.references(), vec!["#/components/schemas/Tag"]);
        assert_eq!(schema.to_value()["type"], json!("tuple"));
    }

    #[test]
    fn test_nullable_object_keeps_its_type() {
        let raw = json!({
            "type": ["object", "null"],
            "properties": { "id": { "type": "string" } }
        });
        let schema = parse(raw.clone());
        assert!(schema.as_object().is_some());
        assert_eq!(schema.to_value(), raw);
    }

    #[test]
    fn test_false_schema_is_accepted() {
        let schema = parse(json!({
            "type": "array",
            "prefixItems": [{ "type": "string" }],
            "items": false
        }));
        match &schema.kind {
            SchemaKind::Array(ArrayItems::Single(item)) => assert_eq!(**item, Schema::never()),
            other => panic!("Expected array, got {:?}", other),
        }
        assert_eq!(schema.to_value()["items"], json!({ "not": {} }));
    }

    #[test]
    fn test_properties_next_to_any_of() {
        let schema = parse(json!({
            "type": "object",
            "properties": { "kind": { "type": "string" } },
            "anyOf": [{ "$ref": "#/components/schemas/Cat" }, { "$ref": "#/components/schemas/Dog" }]
        }));
        match &schema.kind {
            SchemaKind::AllOf(parts) => {
                assert!(parts[0].as_object().is_some());
                assert!(matches!(parts[1].kind, SchemaKind::Choice { keyword: ChoiceKeyword::AnyOf, .. }));
            }
            other => panic!("Expected allOf, got {:?}", other),
        }
        assert_eq!(schema.references(), vec!["#/components/schemas/Cat", "#/components/schemas/Dog"]);
        assert!(schema.extensions.is_empty());
    }

    #[test]
    fn test_unparsed_references() {
        let schema = parse(json!({
            "type": "object",
            "properties": {
                "pair": { "type": "array", "prefixItems": [{ "$ref": "#/components/schemas/Tag" }] }
            },
            "additionalProperties": { "type": "string" },
            "patternProperties": { "^x-": { "$ref": "#/components/schemas/Ext" } },
            "example": { "$ref": "not a schema" }
        }));
        assert_eq!(
            schema.unparsed_references(),
            vec![("patternProperties", "#/components/schemas/Ext"), ("prefixItems", "#/components/schemas/Tag")]
        );
    }
}
