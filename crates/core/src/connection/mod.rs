//! Authenticated console connection and verb primitives.
//!
//! A [`Connection`] owns one transport client (and its cookie jar) for its
//! whole lifetime. Every verb re-checks authentication first: the console
//! expires quiet sessions, so a login older than the staleness threshold is
//! refreshed transparently before the real request goes out.

mod admin;
mod export;
mod relevance;

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::Method;
use reqwest::blocking::{Body, Client};
use reqwest::header::HeaderMap;
use tracing::{debug, error, info};

pub use export::ExportOptions;

use crate::endpoint::RootServer;
use crate::error::{Error, Result};
use crate::response::Response;
use crate::site::{self, SitePathKind};

/// How long a session may sit quiet before the next verb re-authenticates.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(3 * 60);

/// Everything needed to open a [`Connection`].
#[derive(Clone)]
pub struct ConnectionConfig {
	pub username: String,
	pub password: String,
	pub root_server: String,
	/// Verify the console's TLS certificate. Consoles commonly run with
	/// self-signed certificates, so this defaults to off.
	pub verify: bool,
	pub stale_after: Duration,
}

impl ConnectionConfig {
	pub fn new(
		username: impl Into<String>,
		password: impl Into<String>,
		root_server: impl Into<String>,
	) -> ConnectionConfig {
		ConnectionConfig {
			username: username.into(),
			password: password.into(),
			root_server: root_server.into(),
			verify: false,
			stale_after: DEFAULT_STALE_AFTER,
		}
	}
}

impl fmt::Debug for ConnectionConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectionConfig")
			.field("username", &self.username)
			.field("root_server", &self.root_server)
			.field("verify", &self.verify)
			.field("stale_after", &self.stale_after)
			.finish_non_exhaustive()
	}
}

/// One authenticated connection to a console instance.
pub struct Connection {
	username: String,
	password: String,
	root: RootServer,
	verify: bool,
	stale_after: Duration,
	client: Client,
	last_auth: Option<Instant>,
	site_path: String,
}

/// Whether a session last authenticated at `last` needs a fresh login.
fn is_stale(last: Option<Instant>, now: Instant, threshold: Duration) -> bool {
	match last {
		None => true,
		Some(at) => now.duration_since(at) > threshold,
	}
}

impl Connection {
	/// Opens a connection and performs the initial login.
	pub fn connect(config: ConnectionConfig) -> Result<Connection> {
		let mut conn = Connection::new(config)?;
		conn.login()?;
		Ok(conn)
	}

	/// Builds a connection without contacting the console.
	///
	/// The first verb call (or an explicit [`Connection::login`]) performs
	/// the authentication check.
	pub fn new(config: ConnectionConfig) -> Result<Connection> {
		let client = Self::build_client(config.verify)?;
		Ok(Connection {
			username: config.username,
			password: config.password,
			root: RootServer::normalize(&config.root_server),
			verify: config.verify,
			stale_after: config.stale_after,
			client,
			last_auth: None,
			site_path: "master".to_string(),
		})
	}

	fn build_client(verify: bool) -> Result<Client> {
		Client::builder()
			.cookie_store(true)
			.danger_accept_invalid_certs(!verify)
			.build()
			.map_err(Error::from)
	}

	pub fn username(&self) -> &str {
		&self.username
	}

	/// Normalized root server address.
	pub fn root_server(&self) -> &str {
		self.root.as_str()
	}

	/// Absolute endpoint URL for `path`.
	pub fn url(&self, path: &str) -> String {
		self.root.resolve(path)
	}

	/// Checks authentication, logging in again when the session is stale.
	///
	/// Returns whether the session is currently authenticated.
	pub fn login(&mut self) -> Result<bool> {
		self.ensure_login()?;
		Ok(self.last_auth.is_some())
	}

	fn ensure_login(&mut self) -> Result<()> {
		if self.last_auth.is_some() && is_stale(self.last_auth, Instant::now(), self.stale_after) {
			info!(target: "bes.connection", "refreshing login to prevent session timeout");
			self.last_auth = None;
		}
		if self.last_auth.is_none() {
			self.login_request()?;
		}
		Ok(())
	}

	fn login_request(&mut self) -> Result<()> {
		let http = self
			.client
			.get(self.url("login"))
			.basic_auth(&self.username, Some(&self.password))
			.send()?;
		let status = http.status().as_u16();
		if status != 200 {
			self.last_auth = None;
			return Err(Error::Authentication { status });
		}
		debug!(target: "bes.connection", user = %self.username, "login ok");
		self.last_auth = Some(Instant::now());
		Ok(())
	}

	/// Drops session cookies and the authentication stamp.
	///
	/// Safe to call twice; a logged-out connection re-authenticates on the
	/// next verb call.
	pub fn logout(&mut self) {
		// reqwest offers no way to clear a cookie jar in place; a fresh
		// client has the same effect.
		if let Ok(client) = Self::build_client(self.verify) {
			self.client = client;
		}
		self.last_auth = None;
	}

	fn request(
		&mut self,
		method: Method,
		path: &str,
		body: Option<Body>,
		headers: Option<HeaderMap>,
	) -> Result<Response> {
		// The login endpoint itself must not recurse into the guard.
		if !path.contains("login") {
			self.ensure_login()?;
		}

		let mut req = self
			.client
			.request(method, self.url(path))
			.basic_auth(&self.username, Some(&self.password));
		if let Some(headers) = headers {
			req = req.headers(headers);
		}
		if let Some(body) = body {
			req = req.body(body);
		}

		let http = req.send()?;
		self.last_auth = Some(Instant::now());
		Response::from_http(http)
	}

	/// HTTP GET against an endpoint path or absolute resource URL.
	pub fn get(&mut self, path: &str) -> Result<Response> {
		self.request(Method::GET, path, None, None)
	}

	/// HTTP POST of an XML (or form) body.
	pub fn post(&mut self, path: &str, body: impl Into<Body>) -> Result<Response> {
		self.request(Method::POST, path, Some(body.into()), None)
	}

	/// HTTP PUT of an XML body.
	pub fn put(&mut self, path: &str, body: impl Into<Body>) -> Result<Response> {
		self.request(Method::PUT, path, Some(body.into()), None)
	}

	/// HTTP DELETE.
	pub fn delete(&mut self, path: &str) -> Result<Response> {
		self.request(Method::DELETE, path, None, None)
	}

	pub(crate) fn request_with_headers(
		&mut self,
		method: Method,
		path: &str,
		body: Body,
		headers: HeaderMap,
	) -> Result<Response> {
		self.request(method, path, Some(body), Some(headers))
	}

	/// Validates a site path, optionally checking it exists on the console.
	///
	/// `Ok(Some(path))` is a valid (and, when checked, existing) path;
	/// `Ok(None)` is a soft failure when `raise_on_invalid` is off. Empty
	/// input and missing sites respect `raise_on_invalid`; a malformed
	/// `master` path or an unrecognized prefix is always a hard error.
	pub fn validate_site_path(
		&mut self,
		site_path: &str,
		check_site_exists: bool,
		raise_on_invalid: bool,
	) -> Result<Option<String>> {
		let trimmed = site_path.trim();
		if trimmed.is_empty() {
			if raise_on_invalid {
				return Err(Error::EmptySitePath);
			}
			return Ok(None);
		}

		match site::match_prefix(trimmed)? {
			// The master actionsite always exists; no lookup needed.
			SitePathKind::Master => Ok(Some(trimmed.to_string())),
			SitePathKind::Addressed => {
				if !check_site_exists {
					return Ok(Some(trimmed.to_string()));
				}
				let result = self.get(&format!("site/{trimmed}"))?;
				if result.status() == 200 {
					return Ok(Some(trimmed.to_string()));
				}
				info!(target: "bes.connection", site = trimmed, "site does not exist");
				if raise_on_invalid {
					return Err(Error::SiteNotFound(trimmed.to_string()));
				}
				Ok(None)
			}
		}
	}

	/// Resolves an explicit site path or falls back to the session context.
	pub fn get_current_site_path(&mut self, site_path: Option<&str>) -> Result<String> {
		let candidate = match site_path {
			Some(path) if !path.trim().is_empty() => path.trim().to_string(),
			_ => self.site_path.clone(),
		};
		if candidate.trim().is_empty() {
			error!(target: "bes.connection", "site path context not set and no site path provided");
			return Err(Error::MissingSiteContext);
		}

		// Basic resolution trusts the grammar; existence is the caller's
		// concern here.
		self.validate_site_path(&candidate, false, true)?
			.ok_or(Error::MissingSiteContext)
	}

	/// Current default site-path context.
	pub fn current_site_path(&self) -> &str {
		&self.site_path
	}

	/// Validates then stores a new default site-path context.
	pub fn set_current_site_path(&mut self, site_path: &str) -> Result<Option<String>> {
		match self.validate_site_path(site_path, true, false)? {
			Some(valid) => {
				self.site_path = valid.clone();
				Ok(Some(valid))
			}
			None => Ok(None),
		}
	}
}

impl fmt::Debug for Connection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Connection")
			.field("username", &self.username)
			.field("root_server", &self.root.as_str())
			.field("verify", &self.verify)
			.field("site_path", &self.site_path)
			.finish_non_exhaustive()
	}
}

/// Two connections are equal when they address the same console with the
/// same credentials.
impl PartialEq for Connection {
	fn eq(&self, other: &Connection) -> bool {
		self.root == other.root
			&& self.username == other.username
			&& self.password == other.password
			&& self.verify == other.verify
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn test_connection() -> Connection {
		Connection::new(ConnectionConfig::new(
			"admin",
			"hunter2",
			"bes.example.edu",
		))
		.unwrap()
	}

	#[test]
	fn never_authenticated_is_stale() {
		assert!(is_stale(None, Instant::now(), DEFAULT_STALE_AFTER));
	}

	#[test]
	fn four_minute_old_login_is_stale() {
		let now = Instant::now();
		let last = now.checked_sub(Duration::from_secs(4 * 60)).unwrap();
		assert!(is_stale(Some(last), now, DEFAULT_STALE_AFTER));
	}

	#[test]
	fn one_minute_old_login_is_fresh() {
		let now = Instant::now();
		let last = now.checked_sub(Duration::from_secs(60)).unwrap();
		assert!(!is_stale(Some(last), now, DEFAULT_STALE_AFTER));
	}

	#[test]
	fn url_resolution_goes_through_the_root() {
		let conn = test_connection();
		assert_eq!(
			conn.url("sites"),
			"https://bes.example.edu:52311/api/sites"
		);
	}

	#[test]
	fn master_site_path_validates_without_network() {
		let mut conn = test_connection();
		let valid = conn.validate_site_path("master", true, true).unwrap();
		assert_eq!(valid.as_deref(), Some("master"));
	}

	#[test]
	fn empty_site_path_respects_raise_flag() {
		let mut conn = test_connection();
		assert_eq!(conn.validate_site_path("  ", false, false).unwrap(), None);
		assert!(matches!(
			conn.validate_site_path("", false, true),
			Err(Error::EmptySitePath)
		));
	}

	#[test]
	fn malformed_master_ignores_raise_flag() {
		let mut conn = test_connection();
		assert!(matches!(
			conn.validate_site_path("bad/master", false, false),
			Err(Error::MalformedMasterPath(_))
		));
	}

	#[test]
	fn unrecognized_prefix_ignores_raise_flag() {
		let mut conn = test_connection();
		assert!(matches!(
			conn.validate_site_path("bogus/Test", false, false),
			Err(Error::InvalidSitePrefix(_))
		));
	}

	#[test]
	fn site_context_defaults_to_master() {
		let mut conn = test_connection();
		assert_eq!(conn.current_site_path(), "master");
		assert_eq!(conn.get_current_site_path(None).unwrap(), "master");
		assert_eq!(
			conn.get_current_site_path(Some("custom/Test")).unwrap(),
			"custom/Test"
		);
	}

	#[test]
	fn debug_output_hides_the_password() {
		let conn = test_connection();
		let shown = format!("{conn:?}");
		assert!(shown.contains("admin"));
		assert!(!shown.contains("hunter2"));
	}

	#[test]
	fn connections_compare_by_target_and_credentials() {
		let a = test_connection();
		let b = test_connection();
		let c = Connection::new(ConnectionConfig::new("admin", "other", "bes.example.edu")).unwrap();
		assert_eq!(a, b);
		assert_ne!(a, c);
	}
}
