//! Small helpers shared across the crate.

use rand::seq::IndexedRandom;

/// Characters safe for generated passwords.
const PASSWORD_CHARS: &[u8] =
	b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!#()*+,-.:;<=>?[]^_|~";

/// Generates a random password from a console-safe character set.
///
/// Characters are sampled without replacement, so `length` is capped at the
/// size of the set.
pub fn rand_password(length: usize) -> String {
	let mut rng = rand::rng();
	PASSWORD_CHARS
		.choose_multiple(&mut rng, length.min(PASSWORD_CHARS.len()))
		.map(|&b| b as char)
		.collect()
}

/// Cleans one path component for safe file system usage.
///
/// Path separators become `-`, spaces become `_`, and anything outside
/// letters, digits and `-_.() ` is dropped.
pub fn sanitize_component(raw: &str) -> String {
	raw.replace(['/', '\\'], "-")
		.replace(' ', "_")
		.chars()
		.filter(|c| c.is_ascii_alphanumeric() || "-_.() ".contains(*c))
		.collect()
}
