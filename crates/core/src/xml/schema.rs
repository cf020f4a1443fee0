//! Known console schema catalog with ordered first-match validation.
//!
//! Three schemas cover everything the console sends back: deployable
//! content (`BES`), generic API objects (`BESAPI`) and action settings
//! (`BESActionSettings`). A document is accepted by the first schema in
//! that order that declares its root element. A schema document that
//! itself fails to parse is a configuration error and is never treated as
//! a failed validation attempt.

use once_cell::sync::OnceCell;

use crate::error::{Error, Result};
use crate::xml::{Node, local_name};

const SCHEMA_SOURCES: [(&str, &str); 3] = [
	("BES.xsd", include_str!("../../schemas/BES.xsd")),
	("BESAPI.xsd", include_str!("../../schemas/BESAPI.xsd")),
	("BESActionSettings.xsd", include_str!("../../schemas/BESActionSettings.xsd")),
];

/// One schema, reduced to the root elements it declares.
#[derive(Debug)]
pub struct Schema {
	name: &'static str,
	root_elements: Vec<String>,
}

impl Schema {
	fn parse(name: &'static str, source: &str) -> Result<Schema> {
		let doc = Node::parse(source).map_err(|err| Error::SchemaDefinition {
			name: name.to_string(),
			reason: err.to_string(),
		})?;
		if local_name(doc.tag()) != "schema" {
			return Err(Error::SchemaDefinition {
				name: name.to_string(),
				reason: format!("root element is `{}`, not a schema", doc.tag()),
			});
		}

		let root_elements: Vec<String> = doc
			.children("element")
			.filter_map(|el| el.attr("name").map(str::to_string))
			.collect();
		if root_elements.is_empty() {
			return Err(Error::SchemaDefinition {
				name: name.to_string(),
				reason: "no top-level element declarations".to_string(),
			});
		}

		Ok(Schema { name, root_elements })
	}

	fn accepts(&self, root_tag: &str) -> bool {
		self.root_elements.iter().any(|e| e == root_tag)
	}
}

/// The ordered catalog of known schemas.
#[derive(Debug)]
pub struct SchemaSet {
	schemas: Vec<Schema>,
}

impl SchemaSet {
	/// The bundled catalog, parsed once on first use.
	///
	/// A malformed bundled schema surfaces here as [`Error::SchemaDefinition`]
	/// on every call rather than being skipped.
	pub fn builtin() -> Result<&'static SchemaSet> {
		static BUILTIN: OnceCell<SchemaSet> = OnceCell::new();
		BUILTIN.get_or_try_init(|| {
			let mut schemas = Vec::with_capacity(SCHEMA_SOURCES.len());
			for (name, source) in SCHEMA_SOURCES {
				schemas.push(Schema::parse(name, source)?);
			}
			Ok(SchemaSet { schemas })
		})
	}

	/// Name of the first schema accepting the document's root element.
	pub fn validate(&self, doc: &Node) -> Option<&str> {
		let root = local_name(doc.tag());
		self.schemas.iter().find(|s| s.accepts(root)).map(|s| s.name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builtin_catalog_parses() {
		let set = SchemaSet::builtin().unwrap();
		assert_eq!(set.schemas.len(), 3);
	}

	#[test]
	fn known_roots_validate_in_order() {
		let set = SchemaSet::builtin().unwrap();
		let doc = Node::parse("<BES>Example</BES>").unwrap();
		assert_eq!(set.validate(&doc), Some("BES.xsd"));

		let doc = Node::parse("<BESAPI><Query/></BESAPI>").unwrap();
		assert_eq!(set.validate(&doc), Some("BESAPI.xsd"));

		let doc = Node::parse("<BESActionSettings/>").unwrap();
		assert_eq!(set.validate(&doc), Some("BESActionSettings.xsd"));
	}

	#[test]
	fn unknown_root_validates_against_nothing() {
		let set = SchemaSet::builtin().unwrap();
		let doc = Node::parse("<html><body/></html>").unwrap();
		assert_eq!(set.validate(&doc), None);
	}

	#[test]
	fn malformed_schema_source_is_a_configuration_error() {
		assert!(matches!(
			Schema::parse("Broken.xsd", "<xs:schema><xs:element name="),
			Err(Error::SchemaDefinition { .. })
		));
		assert!(matches!(
			Schema::parse("Wrong.xsd", "<not-a-schema/>"),
			Err(Error::SchemaDefinition { .. })
		));
	}
}
