//! Session relevance queries.
//!
//! The console answers ad hoc questions written in its relevance language.
//! Queries go out as form-encoded POSTs; answers come back as an XML
//! `Query` element holding either a `Result` with `Answer` children or an
//! `Error` description.

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::response::Response;

/// URL-escapes a relevance expression, keeping `:` and `+` literal — both
/// are common relevance tokens and the console accepts them raw.
fn escape_relevance(relevance: &str) -> String {
	urlencoding::encode(relevance)
		.replace("%3A", ":")
		.replace("%2B", "+")
}

impl Connection {
	/// POSTs a relevance expression to the query endpoint.
	pub fn session_relevance_query(&mut self, relevance: &str) -> Result<Response> {
		let body = format!("relevance={}", escape_relevance(relevance));
		self.post("query", body)
	}

	/// Runs a query and returns the ordered answer strings.
	///
	/// A console-reported error comes back as a single `ERROR: `-prefixed
	/// element; any other unexpected shape is an error.
	pub fn session_relevance_array(&mut self, relevance: &str) -> Result<Vec<String>> {
		let result = self.session_relevance_query(relevance)?;
		let tree = result
			.object_tree()
			.ok_or_else(|| Error::UnexpectedResponse("query answer is not console XML".into()))?;
		let query = tree
			.child("Query")
			.ok_or_else(|| Error::UnexpectedResponse("no Query element in query answer".into()))?;
		let result_node = query
			.child("Result")
			.ok_or_else(|| Error::UnexpectedResponse("no Result element in query answer".into()))?;

		let answers: Vec<String> = result_node
			.children("Answer")
			.map(|a| a.text().unwrap_or_default().to_string())
			.collect();
		if answers.is_empty() {
			return match query.child("Error") {
				Some(error) => Ok(vec![format!(
					"ERROR: {}",
					error.text().unwrap_or_default()
				)]),
				None => Err(Error::UnexpectedResponse(
					"no Answer elements in query result".into(),
				)),
			};
		}

		Ok(answers)
	}

	/// Runs a query and joins the answers with newlines.
	pub fn session_relevance_string(&mut self, relevance: &str) -> Result<String> {
		Ok(self.session_relevance_array(relevance)?.join("\n"))
	}
}

#[cfg(test)]
mod tests {
	use super::escape_relevance;

	#[test]
	fn escaping_keeps_colons_and_plus() {
		assert_eq!(
			escape_relevance("ids of bes computers whose (name of it = \"a+b: c\")"),
			"ids%20of%20bes%20computers%20whose%20%28name%20of%20it%20%3D%20%22a+b:%20c%22%29"
		);
	}

	#[test]
	fn plain_words_only_gain_space_escapes() {
		assert_eq!(
			escape_relevance("names of bes computers"),
			"names%20of%20bes%20computers"
		);
	}
}
