//! File upload and bulk site-content export.
//!
//! Exports walk a site's content listing, fetch every item by its resource
//! reference and write each to a deterministically named `.bes` file. One
//! item failing to fetch is logged and skipped; the rest of the export
//! carries on.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Method;
use reqwest::blocking::Body;
use reqwest::header::{CONTENT_DISPOSITION, HeaderMap, HeaderValue};
use tracing::{debug, error, info, warn};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::response::Response;
use crate::util::sanitize_component;

/// Naming and layout knobs for bulk export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
	/// Directory the per-site folders land in.
	pub export_folder: PathBuf,
	/// Maximum number of characters of an item name kept in its file name.
	pub name_trim: usize,
	/// Nest exported items under a per-site folder.
	pub include_site_folder: bool,
	/// Prefix file names with the item's numeric ID.
	pub include_item_ids: bool,
}

impl Default for ExportOptions {
	fn default() -> ExportOptions {
		ExportOptions {
			export_folder: PathBuf::from("."),
			name_trim: 100,
			include_site_folder: true,
			include_item_ids: true,
		}
	}
}

/// Builds the on-disk path for one exported item.
fn item_export_path(
	options: &ExportOptions,
	site_path: &str,
	kind: &str,
	id: &str,
	name: &str,
) -> PathBuf {
	let trimmed: String = name.chars().take(options.name_trim).collect();
	let stem = if options.include_item_ids {
		format!(
			"{}-{}",
			sanitize_component(id),
			sanitize_component(&trimmed)
		)
	} else {
		sanitize_component(&trimmed)
	};

	let mut path = options.export_folder.clone();
	if options.include_site_folder {
		path.push(sanitize_component(site_path));
	}
	path.push(sanitize_component(kind));
	path.push(format!("{stem}.bes"));
	path
}

impl Connection {
	/// Uploads one file to the console's upload endpoint.
	///
	/// Fails with [`Error::FileUnreadable`] before any request goes out if
	/// the file cannot be opened. The stored file name defaults to the
	/// path's final component.
	pub fn upload(&mut self, file_path: &Path, file_name: Option<&str>) -> Result<Response> {
		let file = fs::File::open(file_path).map_err(|_| Error::FileUnreadable {
			path: file_path.to_path_buf(),
		})?;

		let name = match file_name {
			Some(name) => name.to_string(),
			None => file_path
				.file_name()
				.and_then(|n| n.to_str())
				.map(str::to_string)
				.ok_or_else(|| Error::FileUnreadable {
					path: file_path.to_path_buf(),
				})?,
		};

		let mut headers = HeaderMap::new();
		let disposition = format!("attachment; filename=\"{name}\"");
		headers.insert(
			CONTENT_DISPOSITION,
			HeaderValue::from_str(&disposition).map_err(|_| Error::InvalidFileName(name))?,
		);

		self.request_with_headers(Method::POST, "upload", Body::from(file), headers)
	}

	/// Fetches one content item by its resource reference.
	///
	/// Resource URLs from the console may carry a plain `http://` scheme
	/// even when the API speaks TLS; the scheme is upgraded to match the
	/// root server. A Forbidden answer is logged and becomes `None` so
	/// bulk export can skip the item.
	pub fn get_content_by_resource(&mut self, resource_url: &str) -> Result<Option<Response>> {
		let url = if self.root.is_https() {
			resource_url.replacen("http://", "https://", 1)
		} else {
			resource_url.to_string()
		};

		match self.get(&url) {
			Ok(content) => Ok(Some(content)),
			Err(Error::Forbidden { url, .. }) => {
				error!(target: "bes.connection", url = %url, "could not export item");
				Ok(None)
			}
			Err(other) => Err(other),
		}
	}

	/// Exports every content item of a site to disk.
	pub fn export_site_contents(
		&mut self,
		site_path: Option<&str>,
		options: &ExportOptions,
	) -> Result<()> {
		let site_path = self.get_current_site_path(site_path)?;
		let content = self.get(&format!("site/{site_path}/content"))?;
		if content.status() != 200 {
			warn!(
				target: "bes.connection",
				site = %site_path,
				status = content.status(),
				"site content listing unavailable"
			);
			return Ok(());
		}
		let tree = content.object_tree().ok_or_else(|| {
			Error::UnexpectedResponse("site content listing is not console XML".into())
		})?;

		info!(
			target: "bes.connection",
			site = %site_path,
			items = tree.child_nodes().len(),
			"archiving site contents"
		);

		for item in tree.child_nodes() {
			let Some(resource) = item.attr("Resource") else {
				continue;
			};
			let id = item.child("ID").and_then(|n| n.text()).unwrap_or_default();
			let name = item
				.child("Name")
				.and_then(|n| n.text())
				.unwrap_or_default();
			debug!(
				target: "bes.connection",
				site = %site_path,
				kind = item.tag(),
				id,
				name,
				modified = item.attr("LastModified").unwrap_or(""),
				"exporting item"
			);

			let Some(content_item) = self.get_content_by_resource(resource)? else {
				continue;
			};

			let item_path = item_export_path(options, &site_path, item.tag(), id, name);
			if let Some(parent) = item_path.parent() {
				fs::create_dir_all(parent)?;
			}
			fs::write(&item_path, content_item.text())?;
		}

		Ok(())
	}

	/// Exports every site's contents, skipping external sites by default.
	pub fn export_all_sites(
		&mut self,
		include_external: bool,
		options: &ExportOptions,
	) -> Result<()> {
		let sites = self.get("sites")?;
		if sites.status() != 200 {
			warn!(target: "bes.connection", status = sites.status(), "site listing unavailable");
			return Ok(());
		}
		let tree = sites
			.object_tree()
			.ok_or_else(|| Error::UnexpectedResponse("site listing is not console XML".into()))?;

		let site_paths: Vec<String> = tree
			.child_nodes()
			.iter()
			.filter_map(|site| site.attr("Resource"))
			.filter_map(|resource| resource.split_once("/api/site/"))
			.map(|(_, path)| path.to_string())
			.collect();

		for site_path in site_paths {
			if !include_external && site_path.contains("external/") {
				continue;
			}
			info!(target: "bes.connection", site = %site_path, "exporting site");
			self.export_site_contents(Some(&site_path), options)?;
		}

		Ok(())
	}
}
