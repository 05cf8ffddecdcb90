use std::{net::IpAddr, path::PathBuf, time::Duration};

use figment::{
	providers::{Env, Format, Toml},
	Figment,
};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use validator::Validate;

/// Optional configuration file read from the working directory.
pub const CONFIG_FILE: &str = "folio.toml";

/// Environment variables consulted at startup.
const ENV_KEYS: &[&str] = &[
	"BA_USER",
	"BA_PASS",
	"HOST",
	"PORT",
	"STATIC_DIR",
	"DATABASE_URL",
	"DB_HOST",
	"DB_USER",
	"DB_NAME",
	"DBPASS",
	"DB_MAX_OPEN",
	"DB_MIN_IDLE",
	"DB_TIMEOUT_SECS",
	"DB_IDLE_TIMEOUT_SECS",
	"UPLOAD_LIMIT",
	"RATE_LIMIT",
	"LOG_LEVEL",
	"OTLP",
];

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to read configuration: {0}")]
	Figment(#[from] Box<figment::Error>),
	#[error("invalid configuration: {0}")]
	Validation(#[from] validator::ValidationErrors),
}

/// Process-wide configuration, loaded once at startup.
#[derive(Debug, Deserialize, Validate)]
pub struct Config {
	#[validate(nested)]
	pub admin: Admin,
	#[serde(default = "default_host")]
	pub host: IpAddr,
	#[serde(default = "default_port")]
	pub port: u16,
	#[serde(default = "default_static_dir")]
	pub static_dir: PathBuf,
	/// Maximum size in bytes of a single uploaded post body.
	#[serde(default = "default_upload_limit")]
	#[validate(range(min = 1))]
	pub upload_limit: usize,
	#[serde(default = "default_true")]
	pub rate_limit: bool,
	#[serde(default)]
	#[validate(nested)]
	pub database: Database,
	#[serde(default)]
	pub telemetry: Telemetry,
}

/// The single set of credentials allowed to create and update posts.
#[derive(Deserialize, Validate)]
pub struct Admin {
	#[validate(length(min = 1, message = "BA_USER must be set"))]
	pub username: String,
	#[validate(length(min = 1, message = "BA_PASS must be set"))]
	pub password: String,
}

impl std::fmt::Debug for Admin {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Admin")
			.field("username", &self.username)
			.field("password", &"[REDACTED]")
			.finish()
	}
}

#[derive(Deserialize, Validate)]
pub struct Database {
	/// Full connection URL, which takes precedence over the individual parts.
	pub url: Option<String>,
	#[serde(default = "default_db_host")]
	pub host: String,
	#[serde(default = "default_db_user")]
	pub user: String,
	#[serde(default = "default_db_name")]
	pub name: String,
	#[serde(default)]
	pub password: String,
	#[serde(default = "default_max_open")]
	#[validate(range(min = 1))]
	pub max_open: u32,
	#[serde(default)]
	pub min_idle: u32,
	/// Bound on every store call, and on acquiring a pooled connection.
	#[serde(default = "default_timeout_secs")]
	#[validate(range(min = 1))]
	pub timeout_secs: u64,
	#[serde(default = "default_idle_timeout_secs")]
	pub idle_timeout_secs: u64,
}

impl std::fmt::Debug for Database {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Database")
			.field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
			.field("host", &self.host)
			.field("user", &self.user)
			.field("name", &self.name)
			.field("max_open", &self.max_open)
			.field("min_idle", &self.min_idle)
			.field("timeout_secs", &self.timeout_secs)
			.field("idle_timeout_secs", &self.idle_timeout_secs)
			.finish_non_exhaustive()
	}
}

impl Default for Database {
	fn default() -> Self {
		Self {
			url: None,
			host: default_db_host(),
			user: default_db_user(),
			name: default_db_name(),
			password: String::new(),
			max_open: default_max_open(),
			min_idle: 0,
			timeout_secs: default_timeout_secs(),
			idle_timeout_secs: default_idle_timeout_secs(),
		}
	}
}

impl Database {
	pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
		if let Some(url) = &self.url {
			return url.parse();
		}

		let options = PgConnectOptions::new()
			.host(&self.host)
			.username(&self.user)
			.database(&self.name);

		Ok(if self.password.is_empty() {
			options
		} else {
			options.password(&self.password)
		})
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	pub fn idle_timeout(&self) -> Duration {
		Duration::from_secs(self.idle_timeout_secs)
	}
}

#[derive(Debug, Deserialize)]
pub struct Telemetry {
	#[serde(default = "default_log_level")]
	pub log_level: String,
	/// Export traces and metrics over OTLP in addition to stdout logging.
	#[serde(default)]
	pub otlp: bool,
}

impl Default for Telemetry {
	fn default() -> Self {
		Self {
			log_level: default_log_level(),
			otlp: false,
		}
	}
}

impl Config {
	/// Loads the configuration from `.env`, [`CONFIG_FILE`] and the environment.
	///
	/// Missing or empty admin credentials are an error: there is no way to
	/// run the service without them.
	pub fn load() -> Result<Self, Error> {
		dotenvy::dotenv().ok();

		Self::from_figment(&Self::figment())
	}

	pub fn from_figment(figment: &Figment) -> Result<Self, Error> {
		let config = figment.extract::<Self>().map_err(Box::new)?;

		config.validate()?;
		Ok(config)
	}

	pub fn figment() -> Figment {
		Figment::new()
			.merge(Toml::file(CONFIG_FILE))
			.merge(Env::raw().only(ENV_KEYS).map(|key| {
				match key.as_str().to_ascii_uppercase().as_str() {
					"BA_USER" => "admin.username".into(),
					"BA_PASS" => "admin.password".into(),
					"DATABASE_URL" => "database.url".into(),
					"DB_HOST" => "database.host".into(),
					"DB_USER" => "database.user".into(),
					"DB_NAME" => "database.name".into(),
					"DBPASS" => "database.password".into(),
					"DB_MAX_OPEN" => "database.max_open".into(),
					"DB_MIN_IDLE" => "database.min_idle".into(),
					"DB_TIMEOUT_SECS" => "database.timeout_secs".into(),
					"DB_IDLE_TIMEOUT_SECS" => "database.idle_timeout_secs".into(),
					"LOG_LEVEL" => "telemetry.log_level".into(),
					"OTLP" => "telemetry.otlp".into(),
					_ => key.as_str().to_ascii_lowercase().into(),
				}
			}))
	}
}

fn default_host() -> IpAddr {
	IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
	8000
}

fn default_static_dir() -> PathBuf {
	"static".into()
}

fn default_upload_limit() -> usize {
	8 * 1024 * 1024
}

fn default_true() -> bool {
	true
}

fn default_db_host() -> String {
	"localhost".into()
}

fn default_db_user() -> String {
	"blogadmin".into()
}

fn default_db_name() -> String {
	"blogdb".into()
}

fn default_max_open() -> u32 {
	90
}

fn default_timeout_secs() -> u64 {
	5
}

fn default_idle_timeout_secs() -> u64 {
	600
}

fn default_log_level() -> String {
	"info".into()
}
