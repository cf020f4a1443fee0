//! One-shot command dispatch.

use anyhow::{Context, Result};
use bes::{Connection, ExportOptions};

use crate::cli::{Cli, Commands, ConfigAction, GetArgs};
use crate::config::CliConfig;
use crate::shell;

pub fn dispatch(cli: Cli) -> Result<()> {
	let (config, loaded) = CliConfig::load(cli.config.as_deref())?;

	match cli.command {
		Commands::Login => {
			let conn = connect(&config)?;
			println!("Login successful as {} @ {}", conn.username(), conn.root_server());
			Ok(())
		}
		Commands::Get(args) => {
			let mut conn = connect(&config)?;
			let response = conn.get(&args.path)?;
			print_response(&response, &args);
			Ok(())
		}
		Commands::Query(args) => {
			let mut conn = connect(&config)?;
			let relevance = args.relevance.join(" ");
			println!("Q: {relevance}");
			println!("{}", conn.session_relevance_string(&relevance)?);
			Ok(())
		}
		Commands::Upload(args) => {
			let mut conn = connect(&config)?;
			let response = conn.upload(&args.file, args.name.as_deref())?;
			println!("{response}");
			Ok(())
		}
		Commands::ExportSite(args) => {
			let mut conn = connect(&config)?;
			let options = ExportOptions {
				export_folder: args.folder,
				name_trim: args.name_trim,
				include_site_folder: !args.no_site_folder,
				include_item_ids: !args.no_item_ids,
			};
			conn.export_site_contents(args.site.as_deref(), &options)?;
			Ok(())
		}
		Commands::ExportAll(args) => {
			let mut conn = connect(&config)?;
			let options = ExportOptions {
				export_folder: args.folder,
				name_trim: args.name_trim,
				..ExportOptions::default()
			};
			conn.export_all_sites(args.include_external, &options)?;
			Ok(())
		}
		Commands::Config(args) => match args.action {
			ConfigAction::Show => {
				println!("{}", config.describe());
				if loaded.is_empty() {
					println!("(no config file found)");
				}
				for path in loaded {
					println!("loaded: {}", path.display());
				}
				Ok(())
			}
			ConfigAction::Save => {
				let path = config.save()?;
				println!("saved: {}", path.display());
				Ok(())
			}
			ConfigAction::Clear => {
				let path = CliConfig::user_path().context("no user config directory available")?;
				match std::fs::remove_file(&path) {
					Ok(()) => println!("removed: {}", path.display()),
					Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
						println!("nothing to remove at {}", path.display());
					}
					Err(err) => return Err(err.into()),
				}
				Ok(())
			}
		},
		Commands::Shell => shell::run(config),
	}
}

fn connect(config: &CliConfig) -> Result<Connection> {
	let conn_config = config.connection_config().context(
		"root server, username and password must be configured \
		 (create bes.toml or run `bes shell` and `saveconf`)",
	)?;
	Connection::connect(conn_config).context("could not log in to the console")
}

fn print_response(response: &bes::Response, args: &GetArgs) {
	if args.raw {
		println!("{}", response.text());
	} else if args.json {
		println!("{}", response.as_json());
	} else {
		println!("{response}");
	}
}
