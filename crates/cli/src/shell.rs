//! Interactive read-eval shell over a console connection.
//!
//! A thin loop: read a line, dispatch on the first word, print the answer.
//! Login failures clear the stored password so the next `login` prompts
//! again; connection failures clear the root server the same way.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use bes::{Connection, Error};

use crate::config::CliConfig;

const PROMPT: &str = "BES> ";

const HELP: &str = "commands:
  login               log in to the console
  logout              drop the current session
  ls                  list current settings and connection status
  get PATH[.TAG...]   GET an endpoint, optionally navigating into the XML
  query RELEVANCE     run a session relevance query
  clear [root|user|pass]  clear stored settings
  saveconf            save settings to the user config file
  error_count         number of errors so far
  exit                leave the shell";

pub fn run(config: CliConfig) -> Result<()> {
	let stdin = io::stdin();
	let mut shell = Shell {
		config,
		conn: None,
		errors: 0,
	};

	loop {
		print!("{PROMPT}");
		io::stdout().flush()?;

		let mut line = String::new();
		if stdin.lock().read_line(&mut line)? == 0 {
			break;
		}
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		let (command, rest) = split_command(line);
		match command {
			"exit" | "quit" => break,
			"help" | "?" => println!("{HELP}"),
			"login" => shell.login(),
			"logout" => shell.logout(),
			"ls" => shell.list_settings(),
			"get" => shell.get(rest),
			"query" => shell.query(rest),
			"clear" => shell.clear(rest),
			"saveconf" => shell.save_config(),
			"error_count" => println!("{}", shell.errors),
			other => println!("unknown command `{other}` (try `help`)"),
		}
	}

	Ok(())
}

/// Splits a line into its command word and the remainder.
fn split_command(line: &str) -> (&str, &str) {
	match line.split_once(char::is_whitespace) {
		Some((command, rest)) => (command, rest.trim()),
		None => (line, ""),
	}
}

struct Shell {
	config: CliConfig,
	conn: Option<Connection>,
	errors: u32,
}

impl Shell {
	fn login(&mut self) {
		if self.config.username.is_none() {
			self.config.username = prompt_value("User: ");
		}
		if self.config.root_server.is_none() {
			self.config.root_server =
				prompt_value("Root Server (ex. https://bes.example.edu:52311): ");
		}
		if self.config.password.is_none() {
			self.config.password = prompt_value("Password: ");
		}

		let Some(conn_config) = self.config.connection_config() else {
			println!("login needs a root server, user name and password");
			self.errors += 1;
			return;
		};

		match Connection::connect(conn_config) {
			Ok(conn) => {
				println!("Login Successful!");
				self.conn = Some(conn);
			}
			Err(Error::Authentication { status }) => {
				println!("Login Failed ({status})! -- clearing likely bad password --");
				self.config.password = None;
				self.conn = None;
				self.errors += 1;
			}
			Err(Error::Transport(err)) => {
				println!("Connection Failed ({err})! -- clearing likely bad root server --");
				self.config.root_server = None;
				self.conn = None;
				self.errors += 1;
			}
			Err(err) => {
				println!("Login Error: {err}");
				self.conn = None;
				self.errors += 1;
			}
		}
	}

	fn logout(&mut self) {
		if let Some(mut conn) = self.conn.take() {
			conn.logout();
		}
		println!("Logout Complete!");
	}

	fn list_settings(&self) {
		println!("{}", self.config.describe());
		println!("  connected: {}", self.conn.is_some());
	}

	/// GET an endpoint. A dotted suffix navigates into the response tree:
	/// `get sites.CustomSite.Name` prints just that element.
	fn get(&mut self, line: &str) {
		let Some(conn) = self.conn.as_mut() else {
			println!("Not currently logged in. Type 'login'.");
			return;
		};
		if line.is_empty() {
			println!("usage: get PATH[.TAG...]");
			return;
		}

		let mut segments = line.split('.');
		let path = segments.next().unwrap_or(line);
		let tags: Vec<&str> = segments.collect();

		let response = match conn.get(path) {
			Ok(response) => response,
			Err(err) => {
				println!("ERROR: {err}");
				self.errors += 1;
				return;
			}
		};

		if tags.is_empty() {
			println!("{response}");
			return;
		}

		let Some(mut node) = response.object_tree() else {
			println!("response is not console XML; cannot navigate into it");
			self.errors += 1;
			return;
		};
		for tag in tags {
			match node.child(tag) {
				Some(child) => node = child,
				None => {
					println!("no such child: {tag}");
					self.errors += 1;
					return;
				}
			}
		}
		match node.text() {
			Some(text) => println!("{text}"),
			None => println!("{}", node.to_xml()),
		}
	}

	fn query(&mut self, relevance: &str) {
		let Some(conn) = self.conn.as_mut() else {
			println!("ERROR: can't query without login");
			return;
		};
		if relevance.is_empty() {
			println!("usage: query RELEVANCE");
			return;
		}

		println!("Q: {relevance}");
		match conn.session_relevance_string(relevance) {
			Ok(answers) => println!("{answers}"),
			Err(err) => {
				println!("ERROR: {err}");
				self.errors += 1;
			}
		}
	}

	fn clear(&mut self, what: &str) {
		if let Some(mut conn) = self.conn.take() {
			conn.logout();
		}
		if what.is_empty() {
			println!(" - clearing all parameters -");
			self.config = CliConfig::default();
			return;
		}
		if what.contains("root") {
			println!(" - clearing root server parameter -");
			self.config.root_server = None;
		}
		if what.contains("user") {
			println!(" - clearing user parameter -");
			self.config.username = None;
		}
		if what.contains("pass") {
			println!(" - clearing password parameter -");
			self.config.password = None;
		}
	}

	fn save_config(&mut self) {
		match self.config.save() {
			Ok(path) => println!("Saving Config File to: {}", path.display()),
			Err(err) => {
				println!("ERROR: {err}");
				self.errors += 1;
			}
		}
	}
}

fn prompt_value(prompt: &str) -> Option<String> {
	print!("{prompt}");
	if io::stdout().flush().is_err() {
		return None;
	}
	let mut value = String::new();
	if io::stdin().lock().read_line(&mut value).ok()? == 0 {
		return None;
	}
	let value = value.trim();
	if value.is_empty() {
		None
	} else {
		Some(value.to_string())
	}
}
