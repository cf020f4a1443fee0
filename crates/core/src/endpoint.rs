//! Root-server normalization and endpoint URL resolution.
//!
//! The console is addressed as `{root}/api/{path}`. Resolution is pure
//! string work and never touches the network.

use std::fmt;

/// Port the console listens on when none is given.
pub const DEFAULT_PORT: u16 = 52311;

/// A root server address normalized to carry a scheme and an explicit port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootServer(String);

impl RootServer {
	/// Normalizes a root server string.
	///
	/// A missing `http`-family scheme gets `https://` prefixed, and a
	/// missing port gets the console default appended. Already-normalized
	/// input passes through unchanged.
	pub fn normalize(input: &str) -> Self {
		let mut root = input.trim().trim_end_matches('/').to_string();
		if !root.starts_with("http") {
			root = format!("https://{root}");
		}
		// With the scheme present, an explicit port means exactly two `:`.
		if root.matches(':').count() != 2 {
			root = format!("{root}:{DEFAULT_PORT}");
		}
		RootServer(root)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Resolves `path` against this root.
	///
	/// A path that already starts with the root (an absolute URL handed
	/// back by the console, e.g. a resource reference) is returned
	/// unchanged, which makes resolution idempotent.
	pub fn resolve(&self, path: &str) -> String {
		if path.starts_with(&self.0) {
			path.to_string()
		} else {
			format!("{}/api/{}", self.0, path)
		}
	}

	/// Whether this root speaks TLS.
	pub fn is_https(&self) -> bool {
		self.0.starts_with("https://")
	}
}

impl fmt::Display for RootServer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bare_host_gets_scheme_and_port() {
		let root = RootServer::normalize("bes.example.edu");
		assert_eq!(root.as_str(), "https://bes.example.edu:52311");
	}

	#[test]
	fn scheme_without_port_gets_default_port() {
		let root = RootServer::normalize("http://bes.example.edu");
		assert_eq!(root.as_str(), "http://bes.example.edu:52311");
	}

	#[test]
	fn fully_qualified_input_is_untouched() {
		let root = RootServer::normalize("https://bes.example.edu:52311");
		assert_eq!(root.as_str(), "https://bes.example.edu:52311");
	}

	#[test]
	fn custom_port_is_kept() {
		let root = RootServer::normalize("https://bes.example.edu:8080");
		assert_eq!(root.as_str(), "https://bes.example.edu:8080");
	}

	#[test]
	fn trailing_slash_is_dropped() {
		let root = RootServer::normalize("bes.example.edu/");
		assert_eq!(root.as_str(), "https://bes.example.edu:52311");
	}

	#[test]
	fn resolve_prefixes_api_segment() {
		let root = RootServer::normalize("bes.example.edu");
		assert_eq!(
			root.resolve("sites"),
			"https://bes.example.edu:52311/api/sites"
		);
	}

	#[test]
	fn resolve_is_idempotent() {
		let root = RootServer::normalize("bes.example.edu");
		let once = root.resolve("site/custom/Test");
		assert_eq!(root.resolve(&once), once);
	}

	#[test]
	fn https_detection() {
		assert!(RootServer::normalize("bes.example.edu").is_https());
		assert!(!RootServer::normalize("http://bes.example.edu").is_https());
	}
}
