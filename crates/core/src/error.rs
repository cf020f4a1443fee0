use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// The login check came back with a non-200 status.
	#[error("authentication failed: server returned status {status}")]
	Authentication { status: u16 },

	/// 403 usually means the operator lacks console-side privileges for the
	/// requested resource, so it is surfaced apart from other bad statuses.
	#[error("403 Forbidden from `{url}`: {body}")]
	Forbidden { url: String, body: String },

	#[error("file is missing or unreadable: {path}")]
	FileUnreadable { path: PathBuf },

	#[error("file name `{0}` cannot be carried in a Content-Disposition header")]
	InvalidFileName(String),

	#[error("site path is empty")]
	EmptySitePath,

	#[error("site path for the master actionsite must be exactly `master`, got `{0}`")]
	MalformedMasterPath(String),

	#[error("site path `{0}` does not start with a recognized prefix (external/, custom/, operator/, master)")]
	InvalidSitePrefix(String),

	#[error("site at path `{0}` does not exist")]
	SiteNotFound(String),

	#[error("site path context not set and no site path provided")]
	MissingSiteContext,

	/// A bundled schema document failed to parse. Never downgraded to a
	/// failed validation attempt.
	#[error("schema `{name}` is malformed: {reason}")]
	SchemaDefinition { name: String, reason: String },

	#[error("malformed definition document: {0}")]
	MalformedDocument(String),

	#[error("unexpected response shape: {0}")]
	UnexpectedResponse(String),

	#[error(transparent)]
	Transport(#[from] reqwest::Error),

	#[error("malformed xml: {0}")]
	Xml(#[from] quick_xml::Error),

	#[error("malformed xml attribute: {0}")]
	XmlAttr(#[from] quick_xml::events::attributes::AttrError),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}
