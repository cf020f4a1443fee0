//! Normalized view over one console response.
//!
//! [`Response`] decides validity once at construction and exposes four
//! derived views, each computed at most once: canonical XML, a navigable
//! [`Node`] tree, a plain mapping and indented JSON. Invalid responses
//! degrade to their raw body text instead of failing.

use std::fmt;

use once_cell::unsync::OnceCell;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::xml::Node;
use crate::xml::schema::SchemaSet;

/// Media type the console uses for XML bodies.
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// One answer from the console to one request.
#[derive(Debug)]
pub struct Response {
	status: u16,
	url: String,
	content_type: Option<String>,
	text: String,
	valid: bool,
	xml: OnceCell<Option<String>>,
	tree: OnceCell<Option<Node>>,
	mapping: OnceCell<Value>,
	json: OnceCell<String>,
}

impl Response {
	/// Wraps raw response parts.
	///
	/// A 403 status is rejected here as [`Error::Forbidden`] — it almost
	/// always means the operator lacks a console privilege, and callers
	/// need the URL and body to act on it. Validity is the declared XML
	/// media type, or failing that, acceptance by one of the known schemas.
	pub fn from_parts(
		status: u16,
		url: impl Into<String>,
		content_type: Option<&str>,
		text: impl Into<String>,
	) -> Result<Response> {
		let url = url.into();
		let text = text.into();

		if status == 403 {
			return Err(Error::Forbidden { url, body: text });
		}

		debug!(target: "bes.response", status, url = %url, "wrapping console response");

		let declared_xml = content_type
			.map(|ct| ct.split(';').next().unwrap_or(ct).trim() == XML_CONTENT_TYPE)
			.unwrap_or(false);
		let valid = if declared_xml {
			true
		} else {
			Self::validates_against_schema(&text)?
		};

		Ok(Response {
			status,
			url,
			content_type: content_type.map(str::to_string),
			text,
			valid,
			xml: OnceCell::new(),
			tree: OnceCell::new(),
			mapping: OnceCell::new(),
			json: OnceCell::new(),
		})
	}

	/// Adapts a transport response into wrapper parts.
	pub(crate) fn from_http(http: reqwest::blocking::Response) -> Result<Response> {
		let status = http.status().as_u16();
		let url = http.url().to_string();
		let content_type = http
			.headers()
			.get(reqwest::header::CONTENT_TYPE)
			.and_then(|v| v.to_str().ok())
			.map(str::to_string);
		let text = http.text()?;
		Self::from_parts(status, url, content_type.as_deref(), text)
	}

	fn validates_against_schema(text: &str) -> Result<bool> {
		// A body that is not well-formed is just invalid; a malformed
		// bundled schema is fatal and propagates.
		let Ok(doc) = Node::parse(text) else {
			return Ok(false);
		};
		Ok(SchemaSet::builtin()?.validate(&doc).is_some())
	}

	pub fn status(&self) -> u16 {
		self.status
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	/// Declared content type, verbatim.
	pub fn content_type(&self) -> Option<&str> {
		self.content_type.as_deref()
	}

	/// Raw body text, exactly as received.
	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn is_valid(&self) -> bool {
		self.valid
	}

	/// Navigable object tree, or `None` when invalid or unparsable.
	pub fn object_tree(&self) -> Option<&Node> {
		self.tree
			.get_or_init(|| {
				if !self.valid {
					return None;
				}
				Node::parse(&self.text).ok()
			})
			.as_ref()
	}

	/// Canonical XML serialization with declaration, or `None` when invalid.
	pub fn normalized_xml(&self) -> Option<&str> {
		self.xml
			.get_or_init(|| self.object_tree().map(Node::to_xml))
			.as_deref()
	}

	/// Mapping form of the tree. Invalid responses degrade to
	/// `{"text": <string form>}`.
	pub fn as_mapping(&self) -> &Value {
		self.mapping.get_or_init(|| match self.object_tree() {
			Some(tree) => tree.to_mapping(),
			None => serde_json::json!({ "text": self.string_form() }),
		})
	}

	/// Indented JSON serialization of [`Response::as_mapping`].
	pub fn as_json(&self) -> &str {
		self.json.get_or_init(|| {
			serde_json::to_string_pretty(self.as_mapping()).unwrap_or_else(|_| "{}".to_string())
		})
	}

	/// Normalized XML when valid, raw body otherwise.
	fn string_form(&self) -> &str {
		if self.valid {
			self.normalized_xml().unwrap_or(&self.text)
		} else {
			&self.text
		}
	}
}

impl fmt::Display for Response {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.string_form())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const QUERY_BODY: &str = r#"<BESAPI><Query Resource="names of bes computers">
		<Result><Answer type="string">host-1</Answer><Answer type="string">host-2</Answer></Result>
	</Query></BESAPI>"#;

	fn xml_response(body: &str) -> Response {
		Response::from_parts(200, "https://bes.example.edu:52311/api/query", Some("application/xml"), body)
			.unwrap()
	}

	#[test]
	fn declared_content_type_is_valid() {
		let resp = xml_response(QUERY_BODY);
		assert!(resp.is_valid());
		assert_eq!(resp.status(), 200);
	}

	#[test]
	fn charset_parameter_does_not_defeat_the_content_type() {
		let resp = Response::from_parts(200, "u", Some("application/xml; charset=utf-8"), "<x/>")
			.unwrap();
		assert!(resp.is_valid());
	}

	#[test]
	fn schema_fallback_accepts_known_roots() {
		let resp = Response::from_parts(200, "u", Some("text/plain"), "<BES>Example</BES>").unwrap();
		assert!(resp.is_valid());
		assert!(resp.normalized_xml().unwrap().contains("<BES>Example</BES>"));
	}

	#[test]
	fn unknown_body_is_invalid() {
		let resp = Response::from_parts(200, "u", Some("text/plain"), "ok").unwrap();
		assert!(!resp.is_valid());
		assert_eq!(resp.object_tree(), None);
		assert_eq!(resp.normalized_xml(), None);
	}

	#[test]
	fn invalid_mapping_degrades_to_text() {
		let resp = Response::from_parts(200, "u", None, "Operator does not exist").unwrap();
		assert_eq!(
			resp.as_mapping(),
			&serde_json::json!({ "text": "Operator does not exist" })
		);
		assert_eq!(resp.to_string(), "Operator does not exist");
	}

	#[test]
	fn json_view_parses_back_to_the_mapping() {
		let resp = xml_response(QUERY_BODY);
		let parsed: Value = serde_json::from_str(resp.as_json()).unwrap();
		assert_eq!(&parsed, resp.as_mapping());
	}

	#[test]
	fn views_are_memoized() {
		let resp = xml_response(QUERY_BODY);
		let first = resp.object_tree().unwrap() as *const Node;
		let second = resp.object_tree().unwrap() as *const Node;
		assert_eq!(first, second);
	}

	#[test]
	fn forbidden_status_is_distinguished() {
		let err = Response::from_parts(403, "https://bes.example.edu:52311/api/sites", None, "denied")
			.unwrap_err();
		match err {
			Error::Forbidden { url, body } => {
				assert!(url.ends_with("/api/sites"));
				assert_eq!(body, "denied");
			}
			other => panic!("expected Forbidden, got {other:?}"),
		}
	}

	#[test]
	fn display_prefers_normalized_xml() {
		let resp = xml_response("<BES>Example</BES>");
		let shown = resp.to_string();
		assert!(shown.starts_with("<?xml"));
		assert!(shown.contains("<BES>Example</BES>"));
	}
}
