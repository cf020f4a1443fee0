//! Explicit tagged XML tree with typed navigation.
//!
//! Console responses and content documents are parsed into [`Node`] values:
//! tag name, attribute list, ordered children and optional text. Navigation
//! goes through [`Node::child`] / [`Node::children`] / [`Node::attr`]
//! instead of any dynamic path evaluation. Namespace prefixes are ignored
//! when matching tags.

pub mod schema;

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use serde_json::Value;

use crate::error::{Error, Result};

/// One element of a parsed XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
	tag: String,
	attributes: Vec<(String, String)>,
	children: Vec<Node>,
	text: Option<String>,
}

/// Strips a namespace prefix from a tag name.
pub(crate) fn local_name(tag: &str) -> &str {
	tag.rsplit(':').next().unwrap_or(tag)
}

impl Node {
	/// Parses a document into its root node.
	pub fn parse(text: &str) -> Result<Node> {
		let mut reader = Reader::from_str(text);

		let mut stack: Vec<Node> = Vec::new();
		loop {
			match reader.read_event()? {
				Event::Start(start) => {
					stack.push(Self::from_start(&start)?);
				}
				Event::Empty(start) => {
					let node = Self::from_start(&start)?;
					match stack.last_mut() {
						Some(parent) => parent.children.push(node),
						None => return Ok(node),
					}
				}
				Event::Text(t) => {
					if let Some(top) = stack.last_mut() {
						let content = t.decode().map_err(quick_xml::Error::from)?;
						if !content.trim().is_empty() {
							top.text.get_or_insert_with(String::new).push_str(&content);
						}
					}
				}
				Event::GeneralRef(r) => {
					if let Some(top) = stack.last_mut() {
						let raw = r.decode().map_err(quick_xml::Error::from)?;
						let resolved = quick_xml::escape::unescape(&format!("&{raw};"))
							.map_err(quick_xml::Error::from)?
							.into_owned();
						top.text.get_or_insert_with(String::new).push_str(&resolved);
					}
				}
				Event::CData(cdata) => {
					if let Some(top) = stack.last_mut() {
						let content = String::from_utf8_lossy(&cdata);
						top.text.get_or_insert_with(String::new).push_str(&content);
					}
				}
				Event::End(_) => {
					let Some(node) = stack.pop() else {
						return Err(Error::MalformedDocument("unmatched end tag".into()));
					};
					match stack.last_mut() {
						Some(parent) => parent.children.push(node),
						None => return Ok(node),
					}
				}
				Event::Eof => {
					return Err(Error::MalformedDocument(
						"document ended before the root element closed".into(),
					));
				}
				_ => {}
			}
		}
	}

	fn from_start(start: &BytesStart<'_>) -> Result<Node> {
		let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
		let mut attributes = Vec::new();
		for attr in start.attributes() {
			let attr = attr?;
			let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
			let value = attr.unescape_value()?.into_owned();
			attributes.push((key, value));
		}
		Ok(Node {
			tag,
			attributes,
			children: Vec::new(),
			text: None,
		})
	}

	/// Tag name as written, including any namespace prefix.
	pub fn tag(&self) -> &str {
		&self.tag
	}

	/// Element text, when the element carried non-whitespace content.
	pub fn text(&self) -> Option<&str> {
		self.text.as_deref()
	}

	/// First attribute with the given name.
	pub fn attr(&self, name: &str) -> Option<&str> {
		self.attributes
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	/// First child whose local tag name matches.
	pub fn child(&self, tag: &str) -> Option<&Node> {
		self.children.iter().find(|c| local_name(&c.tag) == tag)
	}

	/// All children whose local tag name matches, in document order.
	pub fn children<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
		self.children.iter().filter(move |c| local_name(&c.tag) == tag)
	}

	/// All children in document order.
	pub fn child_nodes(&self) -> &[Node] {
		&self.children
	}

	/// Canonical serialization with an XML declaration.
	pub fn to_xml(&self) -> String {
		let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>");
		self.write_into(&mut out);
		out
	}

	fn write_into(&self, out: &mut String) {
		out.push('<');
		out.push_str(&self.tag);
		for (key, value) in &self.attributes {
			out.push(' ');
			out.push_str(key);
			out.push_str("=\"");
			out.push_str(&escape(value.as_str()));
			out.push('"');
		}

		if self.children.is_empty() && self.text.is_none() {
			out.push_str("/>");
			return;
		}
		out.push('>');

		if let Some(text) = &self.text {
			out.push_str(&escape(text.as_str()));
		}
		for child in &self.children {
			child.write_into(out);
		}
		out.push_str("</");
		out.push_str(&self.tag);
		out.push('>');
	}

	/// Recursive conversion into nested key/value structures.
	///
	/// A repeated child tag under the same parent coalesces into an array;
	/// a child with non-blank text becomes a string, anything else recurses.
	pub fn to_mapping(&self) -> Value {
		let mut map = serde_json::Map::new();
		for child in &self.children {
			let key = local_name(&child.tag).to_string();
			let value = match child.text() {
				Some(text) if !text.trim().is_empty() => Value::String(text.to_string()),
				_ => child.to_mapping(),
			};
			if let Some(existing) = map.get_mut(&key) {
				if let Value::Array(items) = existing {
					items.push(value);
				} else {
					let first = std::mem::take(existing);
					*existing = Value::Array(vec![first, value]);
				}
			} else {
				map.insert(key, value);
			}
		}
		Value::Object(map)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const LISTING: &str = r#"<BESAPI>
		<ComputerGroup Resource="https://bes.example.edu:52311/api/computergroup/custom/Test/12">
			<Name>Lab Machines</Name>
			<ID>12</ID>
		</ComputerGroup>
		<ComputerGroup Resource="https://bes.example.edu:52311/api/computergroup/custom/Test/13">
			<Name>Kiosks</Name>
			<ID>13</ID>
		</ComputerGroup>
	</BESAPI>"#;

	#[test]
	fn parse_and_navigate() {
		let root = Node::parse(LISTING).unwrap();
		assert_eq!(root.tag(), "BESAPI");
		assert_eq!(root.children("ComputerGroup").count(), 2);

		let first = root.child("ComputerGroup").unwrap();
		assert_eq!(first.child("Name").and_then(Node::text), Some("Lab Machines"));
		assert!(first.attr("Resource").unwrap().ends_with("/12"));
		assert_eq!(first.attr("Missing"), None);
	}

	#[test]
	fn namespace_prefixes_are_ignored_for_matching() {
		let root = Node::parse(
			r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"><xs:element name="BES"/></xs:schema>"#,
		)
		.unwrap();
		assert_eq!(root.tag(), "xs:schema");
		let element = root.child("element").unwrap();
		assert_eq!(element.attr("name"), Some("BES"));
	}

	#[test]
	fn malformed_document_is_an_error() {
		assert!(Node::parse("<BES><Task></BES>").is_err());
		assert!(Node::parse("not xml at all").is_err());
		assert!(Node::parse("<BES>").is_err());
	}

	#[test]
	fn serialization_carries_declaration_and_content() {
		let root = Node::parse("<BES>Example</BES>").unwrap();
		let xml = root.to_xml();
		assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
		assert!(xml.contains("<BES>Example</BES>"));
	}

	#[test]
	fn serialization_escapes_text_and_attributes() {
		let root = Node::parse(r#"<BES Note="a&amp;b"><Title>1 &lt; 2</Title></BES>"#).unwrap();
		let xml = root.to_xml();
		assert!(xml.contains("Note=\"a&amp;b\""));
		assert!(xml.contains("<Title>1 &lt; 2</Title>"));
	}

	#[test]
	fn mapping_coalesces_repeated_tags() {
		let root = Node::parse(LISTING).unwrap();
		let mapping = root.to_mapping();
		let groups = mapping.get("ComputerGroup").unwrap().as_array().unwrap();
		assert_eq!(groups.len(), 2);
		assert_eq!(groups[0].get("Name").unwrap(), "Lab Machines");
		assert_eq!(groups[1].get("ID").unwrap(), "13");
	}

	#[test]
	fn mapping_of_leaf_only_root_is_empty() {
		let root = Node::parse("<BES>Example</BES>").unwrap();
		assert_eq!(root.to_mapping(), serde_json::json!({}));
	}
}
