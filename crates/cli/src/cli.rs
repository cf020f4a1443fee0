use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Root CLI for bes.
#[derive(Parser, Debug)]
#[command(name = "bes")]
#[command(about = "BigFix REST API command-line client")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Use a specific config file instead of the search path.
	#[arg(short, long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Check the stored credentials against the console.
	Login,
	/// Perform a GET against an API endpoint and print the response.
	Get(GetArgs),
	/// Run a session relevance query and print the answers.
	Query(QueryArgs),
	/// Upload a file to the console.
	Upload(UploadArgs),
	/// Export the contents of one site to a folder.
	ExportSite(ExportSiteArgs),
	/// Export the contents of every site to a folder.
	ExportAll(ExportAllArgs),
	/// Show, save or clear the stored configuration.
	Config(ConfigArgs),
	/// Interactive read-eval shell.
	Shell,
}

#[derive(Args, Debug, Clone)]
pub struct GetArgs {
	/// API endpoint path (for example: sites, operator/jdoe)
	#[arg(value_name = "PATH", default_value = "help")]
	pub path: String,

	/// Render the response as indented JSON instead of XML.
	#[arg(long)]
	pub json: bool,

	/// Print the raw response body without normalization.
	#[arg(long, conflicts_with = "json")]
	pub raw: bool,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
	/// Relevance expression (quoting optional; words are joined).
	#[arg(value_name = "RELEVANCE", required = true, num_args = 1..)]
	pub relevance: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
	/// File to upload.
	#[arg(value_name = "FILE")]
	pub file: PathBuf,

	/// File name stored on the console (defaults to the file's own name).
	#[arg(long, value_name = "NAME")]
	pub name: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportSiteArgs {
	/// Site path (defaults to the master actionsite).
	#[arg(value_name = "SITE")]
	pub site: Option<String>,

	/// Directory the exported files land in.
	#[arg(long, value_name = "DIR", default_value = ".")]
	pub folder: PathBuf,

	/// Maximum item-name length kept in file names.
	#[arg(long, value_name = "N", default_value_t = 100)]
	pub name_trim: usize,

	/// Skip the per-site folder level.
	#[arg(long)]
	pub no_site_folder: bool,

	/// Skip the numeric item-ID file name prefix.
	#[arg(long)]
	pub no_item_ids: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExportAllArgs {
	/// Directory the exported files land in.
	#[arg(long, value_name = "DIR", default_value = ".")]
	pub folder: PathBuf,

	/// Maximum item-name length kept in file names.
	#[arg(long, value_name = "N", default_value_t = 70)]
	pub name_trim: usize,

	/// Include external sites in the export.
	#[arg(long)]
	pub include_external: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
	#[command(subcommand)]
	pub action: ConfigAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
	/// List the current settings and where they came from.
	Show,
	/// Save the current settings to the user config file.
	Save,
	/// Remove the user config file.
	Clear,
}
