//! Property tables for module pages.
//!
//! Rows carry everything the page renderer needs for one property: the
//! display type and default, the description split into prose and example,
//! and nested rows for properties whose type is another object definition.

use serde::Serialize;
use tracing::{debug, instrument};

use ironbar_docs_markdown::{MAX_HEADER_DEPTH, split_sections};
use ironbar_docs_schema::{
    Definition, Property, Schema, display_default, display_type, module_properties,
    resolve_reference,
};
use ironbar_docs_shared::Result;

/// One documented property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyRow {
    pub name: String,
    /// Heading depth the property is rendered at.
    pub depth: u8,
    pub display_type: String,
    pub display_default: String,
    /// Prose part of the description.
    pub description: String,
    /// Config example taken from the description, if any.
    pub example: String,
    /// Rows for the fields of a referenced object type.
    pub children: Vec<PropertyRow>,
}

/// Rows for the documented properties of `type_name`.
///
/// Base display defaults are applied and unchanged common properties are
/// left out.
#[instrument(skip(schema))]
pub fn property_table(schema: &Schema, type_name: &str, depth: u8) -> Result<Vec<PropertyRow>> {
    let definition = schema.definition(type_name)?.with_base_overrides();
    let rows = rows_for(schema, &definition, depth)?;
    debug!(rows = rows.len(), "property table built");
    Ok(rows)
}

fn rows_for(schema: &Schema, definition: &Definition, depth: u8) -> Result<Vec<PropertyRow>> {
    module_properties(schema, definition, false)
        .into_iter()
        .filter_map(|name| {
            definition
                .properties
                .get(&name)
                .map(|property| (name, property))
        })
        .map(|(name, property)| property_row(schema, name, property, depth))
        .collect()
}

fn property_row(schema: &Schema, name: String, property: &Property, depth: u8) -> Result<PropertyRow> {
    let sections = split_sections(property.description.as_deref().unwrap_or_default(), depth);

    let children = match nested_object(schema, property)? {
        Some(definition) if depth < MAX_HEADER_DEPTH => rows_for(schema, definition, depth + 1)?,
        _ => Vec::new(),
    };

    Ok(PropertyRow {
        display_type: display_type(schema, "", property)?,
        display_default: display_default(property.default.as_ref()),
        description: sections.markdown,
        example: sections.example,
        name,
        depth,
        children,
    })
}

/// The object definition a property points at, directly or as a union member.
fn nested_object<'a>(schema: &'a Schema, property: &'a Property) -> Result<Option<&'a Definition>> {
    let pointer = property.reference.as_deref().or_else(|| {
        property
            .any_of
            .iter()
            .flatten()
            .find_map(|member| member.reference.as_deref())
    });

    let Some(pointer) = pointer else {
        return Ok(None);
    };

    let resolved = resolve_reference(schema, pointer)?;
    Ok((!resolved.definition.properties.is_empty()).then_some(resolved.definition))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironbar_docs_shared::DocsError;
    use std::path::Path;

    fn fixture_schema() -> Schema {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures/schema/schema.json");
        Schema::from_path(&path).expect("load fixture schema")
    }

    fn row<'a>(rows: &'a [PropertyRow], name: &str) -> &'a PropertyRow {
        rows.iter()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("no row {name}"))
    }

    #[test]
    fn clock_rows() {
        let schema = fixture_schema();
        let rows = property_table(&schema, "ClockModule", 2).unwrap();

        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert!(!names.contains(&"name"));
        assert!(names.contains(&"tooltip"));

        let format = row(&rows, "format");
        assert_eq!(format.display_type, "string");
        assert_eq!(format.display_default, "%d/%m/%Y %H:%M");
        assert_eq!(
            format.description,
            "The format string to use for the date/time shown on the bar."
        );
        assert_eq!(format.example, r#"{ format = "%H:%M" }"#);
        assert!(format.children.is_empty());
    }

    #[test]
    fn base_overrides_replace_defaults() {
        let schema = fixture_schema();
        let rows = property_table(&schema, "ClockModule", 2).unwrap();

        assert_eq!(row(&rows, "locale").display_default, "$LC_TIME | $LANG | 'POSIX'");
        assert_eq!(row(&rows, "orientation").display_default, "'horizontal'");
        assert_eq!(row(&rows, "justify").display_default, "'left'");
        assert_eq!(row(&rows, "justify").display_type, "left | right | center");
    }

    #[test]
    fn referenced_objects_get_nested_rows() {
        let schema = fixture_schema();
        let rows = property_table(&schema, "SysInfoModule", 2).unwrap();

        let interval = row(&rows, "interval");
        assert_eq!(interval.display_type, "Object (Intervals)");
        assert_eq!(interval.display_default, r#"{"cpu":5,"memory":5}"#);

        let nested: Vec<(&str, u8)> = interval
            .children
            .iter()
            .map(|r| (r.name.as_str(), r.depth))
            .collect();
        assert_eq!(nested, [("cpu", 3), ("memory", 3)]);

        // Enums referenced through a union have no fields to nest.
        assert!(row(&rows, "orientation").children.is_empty());
    }

    #[test]
    fn nesting_stops_at_max_depth() {
        let schema = fixture_schema();
        let rows = property_table(&schema, "SysInfoModule", MAX_HEADER_DEPTH).unwrap();
        assert!(row(&rows, "interval").children.is_empty());
    }

    #[test]
    fn unknown_type_is_an_error() {
        let schema = fixture_schema();
        let err = property_table(&schema, "TrayModule", 2).unwrap_err();
        assert!(matches!(err, DocsError::UnresolvedType { .. }));
    }
}
