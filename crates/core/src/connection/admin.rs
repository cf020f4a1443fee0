//! Operator, computer-group and site administration helpers.
//!
//! All of these follow the same lookup-or-create shape: check whether the
//! object already exists, warn and hand it back if so, otherwise POST the
//! definition and re-fetch the created object.

use std::path::Path;

use tracing::{info, warn};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::response::Response;
use crate::xml::Node;

/// Marker the console embeds when an operator lookup misses.
const NO_OPERATOR_MARKER: &str = "Operator does not exist";

fn read_definition(bes_file_path: &Path) -> Result<(String, Node)> {
	let doc = std::fs::read_to_string(bes_file_path).map_err(|_| Error::FileUnreadable {
		path: bes_file_path.to_path_buf(),
	})?;
	let tree = Node::parse(&doc)?;
	Ok((doc, tree))
}

impl Connection {
	/// Looks up an operator by name. `None` when the console reports the
	/// operator does not exist.
	pub fn get_user(&mut self, user_name: &str) -> Result<Option<Response>> {
		let result = self.get(&format!("operator/{user_name}"))?;
		if !result.to_string().contains(NO_OPERATOR_MARKER) {
			return Ok(Some(result));
		}
		info!(target: "bes.connection", user = user_name, "user not found");
		Ok(None)
	}

	/// Creates an operator from an XML definition file, or returns the
	/// existing one.
	pub fn create_user_from_file(&mut self, bes_file_path: &Path) -> Result<Option<Response>> {
		let (doc, tree) = read_definition(bes_file_path)?;
		let user_name = tree
			.child("Operator")
			.and_then(|op| op.child("Name"))
			.and_then(Node::text)
			.ok_or_else(|| {
				Error::MalformedDocument("operator definition has no Operator/Name".into())
			})?
			.to_string();

		if let Some(existing) = self.get_user(&user_name)? {
			warn!(target: "bes.connection", user = %user_name, "user already exists");
			return Ok(Some(existing));
		}

		info!(target: "bes.connection", user = %user_name, "creating user");
		let _ = self.post("operators", doc)?;
		self.get_user(&user_name)
	}

	/// Finds a computer group by name within a site's group listing.
	pub fn get_computergroup(
		&mut self,
		group_name: &str,
		site_path: Option<&str>,
	) -> Result<Option<Node>> {
		let site_path = self.get_current_site_path(site_path)?;
		let result = self.get(&format!("computergroups/{site_path}"))?;
		let tree = result.object_tree().ok_or_else(|| {
			Error::UnexpectedResponse("computer group listing is not console XML".into())
		})?;

		for group in tree.children("ComputerGroup") {
			if group.child("Name").and_then(Node::text) == Some(group_name) {
				info!(
					target: "bes.connection",
					resource = group.attr("Resource").unwrap_or(""),
					"found group"
				);
				return Ok(Some(group.clone()));
			}
		}

		info!(target: "bes.connection", group = group_name, site = %site_path, "group not found");
		Ok(None)
	}

	/// Creates a computer group from an XML definition file, or returns the
	/// existing one.
	pub fn create_group_from_file(
		&mut self,
		bes_file_path: &Path,
		site_path: Option<&str>,
	) -> Result<Option<Node>> {
		let site_path = self.get_current_site_path(site_path)?;
		let (doc, tree) = read_definition(bes_file_path)?;
		let group_name = tree
			.child("ComputerGroup")
			.and_then(|group| group.child("Title"))
			.and_then(Node::text)
			.ok_or_else(|| {
				Error::MalformedDocument("group definition has no ComputerGroup/Title".into())
			})?
			.to_string();

		if let Some(existing) = self.get_computergroup(&group_name, Some(&site_path))? {
			warn!(target: "bes.connection", group = %group_name, "group already exists");
			return Ok(Some(existing));
		}

		let _ = self.post(&format!("computergroups/{site_path}"), doc)?;
		self.get_computergroup(&group_name, Some(&site_path))
	}

	/// Creates a site from an XML definition file.
	///
	/// `None` when a site already exists at the derived path; the existing
	/// site is left untouched.
	pub fn create_site_from_file(
		&mut self,
		bes_file_path: &Path,
		site_type: &str,
	) -> Result<Option<Response>> {
		let (doc, tree) = read_definition(bes_file_path)?;
		let site_name = tree
			.child("CustomSite")
			.and_then(|s| s.child("Name"))
			.and_then(Node::text)
			.ok_or_else(|| {
				Error::MalformedDocument("site definition has no CustomSite/Name".into())
			})?
			.to_string();

		let candidate = format!("{site_type}/{site_name}");
		if let Some(existing) = self.validate_site_path(&candidate, true, false)? {
			warn!(target: "bes.connection", site = %existing, "site already exists");
			return Ok(None);
		}

		Ok(Some(self.post("sites", doc)?))
	}
}
