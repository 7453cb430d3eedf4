//! Table-of-contents augmentation for module pages.
//!
//! Module pages render their properties from the schema, so the headings
//! never appear in the markdown. One entry per documented property is
//! appended under the page's `configuration` heading.

use tracing::{debug, instrument};

use ironbar_docs_schema::{Schema, module_properties, module_type_name_from_slug};
use ironbar_docs_shared::{Result, TocItem};

use crate::route::is_version_segment;

/// Namespace holding module pages.
pub const MODULES_NAMESPACE: &str = "modules";

/// Slug of the heading property entries are appended to.
pub const CONFIGURATION_SLUG: &str = "configuration";

/// Depth given to appended property entries.
const PROPERTY_DEPTH: u8 = 2;

/// Whether `page_id` is a module page, with or without a version prefix.
pub fn is_module_page(page_id: &str) -> bool {
    let mut segments = page_id.split('/').peekable();
    if segments.peek().is_some_and(|s| is_version_segment(s)) {
        segments.next();
    }

    segments.next() == Some(MODULES_NAMESPACE) && segments.next().is_some()
}

/// Append the module's documented properties to the `configuration` item.
///
/// Returns the number of entries appended. Pages outside the modules
/// namespace and pages without a `configuration` heading are left alone.
/// A module with no schema definition is an unresolved-type error.
#[instrument(skip(items, schema))]
pub fn augment_toc(items: &mut [TocItem], page_id: &str, schema: &Schema) -> Result<usize> {
    if !is_module_page(page_id) {
        return Ok(0);
    }

    let segment = page_id.rsplit('/').next().unwrap_or(page_id);
    let type_name = module_type_name_from_slug(segment);
    let definition = schema.definition(&type_name)?;
    let properties = module_properties(schema, definition, false);

    let Some(configuration) = items.iter_mut().find(|i| i.slug == CONFIGURATION_SLUG) else {
        debug!("page has no configuration heading");
        return Ok(0);
    };

    let count = properties.len();
    configuration
        .children
        .extend(properties.into_iter().map(|property| TocItem {
            depth: PROPERTY_DEPTH,
            slug: property.clone(),
            text: property,
            children: vec![],
        }));

    debug!(%type_name, count, "toc augmented");
    Ok(count)
}
