//! Schema document model.
//!
//! The upstream schema has been published in two shapes over time: newer
//! releases key their definitions under `$defs`, older ones under
//! `definitions`. [`Schema`] resolves the shape once at load time and
//! exposes a single [`Schema::definitions`] accessor.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use ironbar_docs_shared::{DocsError, Result};

/// Definition holding the properties every module inherits.
pub const COMMON_CONFIG: &str = "CommonConfig";

/// Suffix appended to a module's title to get its schema type name.
pub const MODULE_SUFFIX: &str = "Module";

/// Derived type names that differ from the schema's own naming.
const ALIASES: &[(&str, &str)] = &[
    ("SysinfoModule", "SysInfoModule"),
    ("Sys-InfoModule", "SysInfoModule"),
    ("Sys-infoModule", "SysInfoModule"),
    ("Network-ManagerModule", "NetworkManagerModule"),
    ("Network-managerModule", "NetworkManagerModule"),
];

/// Display defaults the schema cannot express (environment fallbacks, quoting).
const BASE_DEFAULT_OVERRIDES: &[(&str, &str)] = &[
    ("locale", "$LC_TIME | $LANG | 'POSIX'"),
    ("justify", "'left'"),
    ("orientation", "'horizontal'"),
    ("music_dir", "$HOME/Music"),
];

// ---------------------------------------------------------------------------
// Definitions and properties
// ---------------------------------------------------------------------------

/// A `type` tag: either one primitive name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeTag {
    Single(String),
    Many(Vec<String>),
}

/// A named schema type (object, enum, union or primitive).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<TypeTag>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Property>,

    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(default, rename = "anyOf", skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Property>>,

    #[serde(default, rename = "oneOf", skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Property>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl Definition {
    /// Copy of this definition with the fixed display defaults applied to
    /// the properties it declares. Never adds properties.
    pub fn with_base_overrides(&self) -> Definition {
        let mut definition = self.clone();
        for (name, default) in BASE_DEFAULT_OVERRIDES {
            if let Some(property) = definition.properties.get_mut(*name) {
                property.default = Some(Value::String((*default).to_string()));
            }
        }
        definition
    }
}

/// A single field of a [`Definition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default, rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<TypeTag>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, rename = "anyOf", skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Property>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Property>>,

    #[serde(default, rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// The definitions table, tagged with the on-disk key it was read from.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDefinitions {
    /// `$defs`-keyed (current releases).
    Defs(BTreeMap<String, Definition>),
    /// `definitions`-keyed (older releases).
    Definitions(BTreeMap<String, Definition>),
}

impl SchemaDefinitions {
    /// The JSON key this table was loaded from.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Defs(_) => "$defs",
            Self::Definitions(_) => "definitions",
        }
    }

    fn as_map(&self) -> &BTreeMap<String, Definition> {
        match self {
            Self::Defs(map) | Self::Definitions(map) => map,
        }
    }
}

/// A loaded configuration schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    definitions: SchemaDefinitions,
}

impl Schema {
    /// Build a schema from a parsed JSON document.
    ///
    /// Fails with a config error when the document has neither `$defs` nor
    /// `definitions`.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(DocsError::config("schema document is not a JSON object"));
        };

        let definitions = if let Some(defs) = object.remove("$defs") {
            SchemaDefinitions::Defs(parse_definitions(defs)?)
        } else if let Some(defs) = object.remove("definitions") {
            SchemaDefinitions::Definitions(parse_definitions(defs)?)
        } else {
            return Err(DocsError::config(
                "schema has neither `$defs` nor `definitions`",
            ));
        };

        debug!(
            shape = definitions.key(),
            count = definitions.as_map().len(),
            "schema loaded"
        );

        Ok(Self { definitions })
    }

    /// Parse a schema from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| DocsError::parse(format!("invalid schema JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Read and parse a schema file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DocsError::io(path, e))?;
        Self::from_json_str(&content)
    }

    /// The definitions table with its on-disk shape.
    pub fn shape(&self) -> &SchemaDefinitions {
        &self.definitions
    }

    /// All named definitions, regardless of on-disk shape.
    pub fn definitions(&self) -> &BTreeMap<String, Definition> {
        self.definitions.as_map()
    }

    /// Look up a definition by type name.
    pub fn definition(&self, type_name: &str) -> Result<&Definition> {
        self.definitions()
            .get(type_name)
            .ok_or_else(|| DocsError::unresolved(type_name))
    }
}

fn parse_definitions(value: Value) -> Result<BTreeMap<String, Definition>> {
    serde_json::from_value(value)
        .map_err(|e| DocsError::parse(format!("invalid schema definitions: {e}")))
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// A `$ref` pointer resolved to its definition.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedReference<'a> {
    pub type_name: &'a str,
    pub definition: &'a Definition,
}

/// Resolve a pointer of the form `#/<root>/<TypeName>`.
pub fn resolve_reference<'a>(schema: &'a Schema, pointer: &'a str) -> Result<ResolvedReference<'a>> {
    let type_name = pointer
        .split('/')
        .nth(2)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| DocsError::unresolved(pointer))?;

    let definition = schema.definition(type_name)?;

    Ok(ResolvedReference {
        type_name,
        definition,
    })
}

/// Names of the properties every module inherits from [`COMMON_CONFIG`].
pub fn common_properties(schema: &Schema) -> BTreeSet<String> {
    schema
        .definitions()
        .get(COMMON_CONFIG)
        .map(|common| common.properties.keys().cloned().collect())
        .unwrap_or_default()
}

/// Property names worth documenting for a module definition.
///
/// Unless `include_common` is set, properties inherited unchanged from
/// [`COMMON_CONFIG`] are dropped. A module property with the same name but
/// a different description overrides the common one and is kept.
pub fn module_properties(schema: &Schema, definition: &Definition, include_common: bool) -> Vec<String> {
    let common_names = common_properties(schema);
    let common = schema.definitions().get(COMMON_CONFIG);

    definition
        .properties
        .iter()
        .filter(|(name, property)| {
            if include_common || !common_names.contains(name.as_str()) {
                return true;
            }

            let common_property = common.and_then(|c| c.properties.get(name.as_str()));
            common_property.is_none_or(|c| property.description != c.description)
        })
        .map(|(name, _)| name.clone())
        .collect()
}

/// Map a derived type name onto the schema's canonical name.
pub fn resolve_alias(type_name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(from, _)| *from == type_name)
        .map(|(_, to)| *to)
        .unwrap_or(type_name)
}

/// Schema type name for a module page title, e.g. `Clock` → `ClockModule`.
pub fn module_type_name(title: &str) -> String {
    resolve_alias(&format!("{title}{MODULE_SUFFIX}")).to_string()
}

/// Schema type name for a module page slug segment, e.g. `sys-info` → `SysInfoModule`.
pub fn module_type_name_from_slug(segment: &str) -> String {
    module_type_name(&capitalise(segment))
}

/// Uppercase the first character of a string.
pub fn capitalise(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
