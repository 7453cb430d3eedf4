//! Human-readable type and default strings for schema properties.
//!
//! Rules are checked in a fixed order per node: optional-type collapsing,
//! type lists, `object`, `array`, `$ref`, unions, enums, bare `null`,
//! `const`, and finally the raw type tag.
//!
//! A `$ref` back to a definition already being rendered (recursive types)
//! renders as that definition's bare name.

use serde_json::Value;

use ironbar_docs_shared::Result;

use crate::model::{Definition, Property, Schema, TypeTag, resolve_reference};

const SEPARATOR: &str = " | ";

/// Read access shared by [`Definition`] and [`Property`] for type display.
pub trait SchemaNode {
    fn type_tag(&self) -> Option<&TypeTag>;
    fn union_members(&self) -> Option<&[Property]>;
    fn enum_values(&self) -> Option<&[Value]>;

    fn reference(&self) -> Option<&str> {
        None
    }

    fn items(&self) -> Option<&Property> {
        None
    }

    fn const_value(&self) -> Option<&Value> {
        None
    }
}

impl SchemaNode for Definition {
    fn type_tag(&self) -> Option<&TypeTag> {
        self.type_tag.as_ref()
    }

    // Definitions written as `oneOf` (documented enums) render like `anyOf`.
    fn union_members(&self) -> Option<&[Property]> {
        self.any_of.as_deref().or(self.one_of.as_deref())
    }

    fn enum_values(&self) -> Option<&[Value]> {
        self.enum_values.as_deref()
    }
}

impl SchemaNode for Property {
    fn type_tag(&self) -> Option<&TypeTag> {
        self.type_tag.as_ref()
    }

    fn union_members(&self) -> Option<&[Property]> {
        self.any_of.as_deref()
    }

    fn enum_values(&self) -> Option<&[Value]> {
        self.enum_values.as_deref()
    }

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn items(&self) -> Option<&Property> {
        self.items.as_deref()
    }

    fn const_value(&self) -> Option<&Value> {
        self.const_value.as_ref()
    }
}

/// Display type for a node, e.g. `string`, `Object (Script)`, `'left' | 'right'`.
///
/// `type_name` is the name of the definition the node was reached through,
/// or empty when unknown. Fails only when a `$ref` does not resolve.
pub fn display_type(schema: &Schema, type_name: &str, node: &dyn SchemaNode) -> Result<String> {
    let mut visiting = Vec::new();
    let rendered = display_type_part(schema, type_name, node, &mut visiting)?;
    Ok(dedupe_join(rendered.split(SEPARATOR)))
}

/// `visiting` holds the referenced type names on the current path.
fn display_type_part(
    schema: &Schema,
    type_name: &str,
    node: &dyn SchemaNode,
    visiting: &mut Vec<String>,
) -> Result<String> {
    let type_tag = match node.type_tag() {
        Some(TypeTag::Many(tags)) if tags.len() == 2 && tags[1] == "null" => Some(tags[0].as_str()),
        Some(TypeTag::Many(tags)) => return Ok(tags.join(SEPARATOR)),
        Some(TypeTag::Single(tag)) => Some(tag.as_str()),
        None => None,
    };
    let known_name = !type_name.is_empty();

    if type_tag == Some("object") && known_name {
        return Ok(format!("Object ({type_name})"));
    }

    if type_tag == Some("array") {
        return match node.items() {
            Some(items) => Ok(format!(
                "Array ({})",
                display_type_part(schema, type_name, items, visiting)?
            )),
            None => Ok("Array".to_string()),
        };
    }

    if let Some(pointer) = node.reference() {
        let resolved = resolve_reference(schema, pointer)?;
        if visiting.iter().any(|name| name == resolved.type_name) {
            return Ok(resolved.type_name.to_string());
        }

        visiting.push(resolved.type_name.to_string());
        let rendered = display_type_part(schema, resolved.type_name, resolved.definition, visiting);
        visiting.pop();
        return rendered;
    }

    if let Some(members) = node.union_members() {
        let parts = members
            .iter()
            .map(|member| display_type_part(schema, type_name, member, visiting))
            .collect::<Result<Vec<_>>>()?;
        return Ok(dedupe_join(parts.iter().map(String::as_str)));
    }

    if let Some(values) = node.enum_values() {
        return Ok(values
            .iter()
            .map(|value| format!("'{}'", value_text(value)))
            .collect::<Vec<_>>()
            .join(SEPARATOR));
    }

    if type_tag == Some("null") && known_name {
        return Ok(type_name.to_string());
    }

    if let Some(value) = node.const_value().filter(|v| !v.is_null()) {
        return Ok(value_text(value));
    }

    Ok(type_tag.unwrap_or_default().to_string())
}

/// Display string for a property default.
///
/// Missing values, JSON `null` and the string `"null"` render as `None`;
/// objects and arrays render as compact JSON.
pub fn display_default(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) if s == "null" => "None".to_string(),
        Some(value) => value_text(value),
    }
}

/// Strings verbatim, everything else as compact JSON.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn dedupe_join<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for part in parts {
        if !seen.contains(&part) {
            seen.push(part);
        }
    }
    seen.join(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn fixture_schema() -> Schema {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures/schema/schema.json");
        Schema::from_path(&path).expect("load fixture schema")
    }

    fn property(value: Value) -> Property {
        serde_json::from_value(value).expect("valid property")
    }

    fn prop_type(schema: &Schema, definition: &str, name: &str) -> String {
        let def = schema.definition(definition).unwrap();
        display_type(schema, "", &def.properties[name]).unwrap()
    }

    #[test]
    fn optional_type_collapses_to_inner_type() {
        let schema = fixture_schema();
        let optional = property(json!({ "type": ["string", "null"] }));
        let plain = property(json!({ "type": "string" }));
        assert_eq!(
            display_type(&schema, "", &optional).unwrap(),
            display_type(&schema, "", &plain).unwrap()
        );
        assert_eq!(display_type(&schema, "", &plain).unwrap(), "string");
    }

    #[test]
    fn longer_type_lists_join_directly() {
        let schema = fixture_schema();
        let multi = property(json!({ "type": ["string", "integer", "null"] }));
        assert_eq!(display_type(&schema, "", &multi).unwrap(), "string | integer | null");
    }

    #[test]
    fn referenced_object_renders_type_name() {
        let schema = fixture_schema();
        assert_eq!(prop_type(&schema, "SysInfoModule", "interval"), "Object (Intervals)");
    }

    #[test]
    fn arrays_recurse_into_items() {
        let schema = fixture_schema();
        assert_eq!(prop_type(&schema, "SysInfoModule", "format"), "Array (string)");
        assert_eq!(
            prop_type(&schema, "SysInfoModule", "scripts"),
            "Array (string | Object (Script))"
        );

        let bare = property(json!({ "type": "array" }));
        assert_eq!(display_type(&schema, "", &bare).unwrap(), "Array");
    }

    #[test]
    fn enums_are_quoted() {
        let schema = fixture_schema();
        assert_eq!(
            prop_type(&schema, "ClockModule", "orientation"),
            "'horizontal' | 'vertical'"
        );
    }

    #[test]
    fn one_of_constants_render_as_union() {
        let schema = fixture_schema();
        assert_eq!(prop_type(&schema, "ClockModule", "justify"), "left | right | center");
    }

    #[test]
    fn optional_reference_renders_null_branch() {
        let schema = fixture_schema();
        assert_eq!(
            prop_type(&schema, "SysInfoModule", "orientation"),
            "'horizontal' | 'vertical' | null"
        );

        // With a known type name the bare `null` branch renders as that name.
        let def = schema.definition("SysInfoModule").unwrap();
        let rendered =
            display_type(&schema, "Orientation", &def.properties["orientation"]).unwrap();
        assert_eq!(rendered, "'horizontal' | 'vertical' | Orientation");
    }

    #[test]
    fn nested_unions_are_deduplicated() {
        let schema = fixture_schema();
        let nested = property(json!({
            "anyOf": [{ "$ref": "#/$defs/ScriptInput" }, { "type": "string" }, { "type": ["string", "null"] }]
        }));
        let rendered = display_type(&schema, "", &nested).unwrap();
        assert_eq!(rendered, "string | Object (Script)");
    }

    #[test]
    fn output_has_no_duplicate_segments() {
        let schema = fixture_schema();
        for (type_name, definition) in schema.definitions() {
            for prop in definition.properties.values() {
                let rendered = display_type(&schema, type_name, prop).unwrap();
                let segments: Vec<&str> = rendered.split(" | ").collect();
                let mut unique = segments.clone();
                unique.dedup();
                unique.sort();
                unique.dedup();
                assert_eq!(segments.len(), unique.len(), "duplicates in {rendered}");
                assert_eq!(rendered, display_type(&schema, type_name, prop).unwrap());
            }
        }
    }

    #[test]
    fn constants_render_their_text() {
        let schema = fixture_schema();
        assert_eq!(display_type(&schema, "", &property(json!({ "const": 5 }))).unwrap(), "5");
        assert_eq!(
            display_type(&schema, "", &property(json!({ "const": "auto" }))).unwrap(),
            "auto"
        );
    }

    #[test]
    fn object_without_type_name_falls_through_to_tag() {
        let schema = fixture_schema();
        let object = property(json!({ "type": "object" }));
        assert_eq!(display_type(&schema, "", &object).unwrap(), "object");
        assert_eq!(display_type(&schema, "Foo", &object).unwrap(), "Object (Foo)");
        assert_eq!(display_type(&schema, "", &Property::default()).unwrap(), "");
    }

    #[test]
    fn reference_takes_precedence_over_union_and_type() {
        let schema = fixture_schema();
        let with_union = property(json!({
            "$ref": "#/$defs/Script",
            "anyOf": [{ "type": "integer" }]
        }));
        assert_eq!(display_type(&schema, "", &with_union).unwrap(), "Object (Script)");

        let with_type = property(json!({ "$ref": "#/$defs/Script", "type": "string" }));
        assert_eq!(display_type(&schema, "", &with_type).unwrap(), "Object (Script)");

        let with_array = property(json!({
            "$ref": "#/$defs/Script",
            "type": "array",
            "items": { "type": "integer" }
        }));
        assert_eq!(display_type(&schema, "", &with_array).unwrap(), "Array (integer)");
    }

    #[test]
    fn self_referencing_union_terminates() {
        let schema = Schema::from_value(json!({
            "$defs": {
                "Loop": { "anyOf": [{ "$ref": "#/$defs/Loop" }, { "type": "null" }] }
            }
        }))
        .unwrap();

        let entry = property(json!({ "$ref": "#/$defs/Loop" }));
        assert_eq!(display_type(&schema, "", &entry).unwrap(), "Loop");
    }

    #[test]
    fn recursive_array_type_renders_inner_name() {
        let schema = Schema::from_value(json!({
            "$defs": {
                "Tree": { "anyOf": [
                    { "type": "array", "items": { "$ref": "#/$defs/Tree" } },
                    { "type": "string" }
                ] }
            }
        }))
        .unwrap();

        let entry = property(json!({ "$ref": "#/$defs/Tree" }));
        assert_eq!(display_type(&schema, "", &entry).unwrap(), "Array (Tree) | string");
    }

    #[test]
    fn sibling_references_to_one_type_both_render() {
        let schema = fixture_schema();
        let pair = property(json!({
            "anyOf": [
                { "$ref": "#/$defs/Script" },
                { "type": "array", "items": { "$ref": "#/$defs/Script" } }
            ]
        }));
        assert_eq!(
            display_type(&schema, "", &pair).unwrap(),
            "Object (Script) | Array (Object (Script))"
        );
    }

    #[test]
    fn unresolved_reference_propagates() {
        let schema = fixture_schema();
        let dangling = property(json!({ "$ref": "#/$defs/Nope" }));
        assert!(display_type(&schema, "", &dangling).is_err());
    }

    #[test]
    fn display_default_cases() {
        assert_eq!(display_default(None), "None");
        assert_eq!(display_default(Some(&Value::Null)), "None");
        assert_eq!(display_default(Some(&json!("null"))), "None");
        assert_eq!(display_default(Some(&json!("%H:%M"))), "%H:%M");
        assert_eq!(display_default(Some(&json!(42))), "42");
        assert_eq!(display_default(Some(&json!(false))), "false");
        assert_eq!(display_default(Some(&json!({ "cpu": 5 }))), r#"{"cpu":5}"#);
        assert_eq!(display_default(Some(&json!(["a", "b"]))), r#"["a","b"]"#);
    }
}
