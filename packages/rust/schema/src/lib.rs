//! Typed model of the bar's JSON configuration schema.
//!
//! This crate provides:
//! - [`model`]: [`Schema`], [`Definition`] and [`Property`], reference and
//!   alias resolution, common-property filtering
//! - [`display`]: human-readable type and default strings for properties

pub mod display;
pub mod model;

pub use display::{SchemaNode, display_default, display_type};
pub use model::{
    COMMON_CONFIG, Definition, MODULE_SUFFIX, Property, ResolvedReference, Schema,
    SchemaDefinitions, TypeTag, capitalise, common_properties, module_properties,
    module_type_name, module_type_name_from_slug, resolve_alias, resolve_reference,
};
