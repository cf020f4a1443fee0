//! Site-path grammar for addressable console containers.
//!
//! A site path names a content container: the single master actionsite, a
//! custom site, an operator's private site, or an external site. Existence
//! checks live on [`Connection`](crate::Connection); the grammar itself is
//! pure.

use crate::error::{Error, Result};

/// Recognized site-path prefixes, in match order. `master` is a complete
/// literal value, not a prefix, and must stay last.
pub const SITE_PREFIXES: [&str; 4] = ["external/", "custom/", "operator/", "master"];

/// Outcome of a grammar match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitePathKind {
	/// The literal master actionsite. Always exists; never needs a lookup.
	Master,
	/// An external, custom or operator site that may need an existence check.
	Addressed,
}

/// Matches `site_path` against the recognized prefixes.
///
/// A path containing `master` without being exactly `master`, or matching no
/// prefix at all, is a structural error regardless of how the caller wants
/// soft failures handled.
pub fn match_prefix(site_path: &str) -> Result<SitePathKind> {
	for prefix in SITE_PREFIXES {
		if site_path.contains(prefix) {
			if prefix == "master" {
				if site_path != "master" {
					return Err(Error::MalformedMasterPath(site_path.to_string()));
				}
				return Ok(SitePathKind::Master);
			}
			return Ok(SitePathKind::Addressed);
		}
	}

	Err(Error::InvalidSitePrefix(site_path.to_string()))
}
