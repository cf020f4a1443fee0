//! Rust client for the BigFix (BES) REST API.
//!
//! [`Connection`] owns an authenticated session against a console root
//! server and exposes the REST verbs plus higher-level helpers (relevance
//! queries, lookup-or-create admin operations, file upload and bulk
//! content export). Every call answers with a [`Response`], which
//! normalizes the console's XML into a navigable tree, a plain mapping
//! and JSON.
//!
//! ```no_run
//! use bes::{Connection, ConnectionConfig};
//!
//! fn main() -> bes::Result<()> {
//! 	let mut conn = Connection::connect(ConnectionConfig::new(
//! 		"operator",
//! 		"password",
//! 		"bes.example.edu",
//! 	))?;
//! 	let sites = conn.get("sites")?;
//! 	println!("{}", sites.as_json());
//! 	Ok(())
//! }
//! ```

pub mod connection;
pub mod endpoint;
pub mod error;
pub mod response;
pub mod site;
pub mod util;
pub mod xml;

pub use connection::{Connection, ConnectionConfig, DEFAULT_STALE_AFTER, ExportOptions};
pub use endpoint::RootServer;
pub use error::{Error, Result};
pub use response::Response;
pub use xml::Node;
