// SPDX-License-Identifier: PMPL-1.0-or-later
//!
//! compass — command-line front end for the Compass OrientDB client.
//!
//! Settings come from `COMPASS_*` environment variables and can be
//! overridden per invocation. Results are printed as pretty JSON.

use std::collections::BTreeMap;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use compass::{ClientConfig, Credentials, Database, Document, Klass, PropertyChange, Server, Storage};
use serde_json::{Map, Value};

/// Version string, pulled from Cargo.toml at compile time.
const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

/// compass — talk to an OrientDB server over its REST interface.
#[derive(Parser, Debug)]
#[command(name = "compass", version = VERSION, about = "OrientDB REST client")]
struct Cli {
    /// Base URL of the server (overrides COMPASS_URL).
    #[arg(long)]
    url: Option<String>,

    /// Username (overrides COMPASS_USERNAME).
    #[arg(long, short)]
    username: Option<String>,

    /// Password (overrides COMPASS_PASSWORD).
    #[arg(long, short)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show server information.
    Info,
    /// Drop the server session.
    Disconnect,
    /// Create a database.
    CreateDb {
        name: String,
        /// Storage engine: memory, local or plocal (default: COMPASS_STORAGE,
        /// else memory).
        #[arg(long)]
        storage: Option<Storage>,
    },
    /// Connect to a database and show its metadata.
    Connect { db: String },
    /// Show the storage cluster of a class.
    Cluster { db: String, class: String },
    /// List documents of a class.
    Class {
        db: String,
        class: String,
        /// Maximum number of documents.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Create a class.
    CreateClass { db: String, class: String },
    /// Run a query in the database's query language.
    Query { db: String, query: String },
    /// Fetch a document by RID.
    Get { db: String, rid: String },
    /// Create a document from a JSON object.
    Insert {
        db: String,
        /// Fields as a JSON object, e.g. '{"name": "Ada"}'.
        fields: String,
        /// Class of the new document.
        #[arg(long)]
        class: Option<String>,
    },
    /// Delete a document by RID.
    Delete { db: String, rid: String },
    /// Create a schema property, or drop it if it exists.
    Property {
        db: String,
        class: String,
        name: String,
        /// Only drop the property; never create it.
        #[arg(long)]
        drop: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config_from(&cli, |key| std::env::var(key).ok())?;
    let credentials = config.credentials.clone();

    tracing::debug!(url = %config.url, user = %credentials.username, "Starting compass");
    let mut server = Server::from_config(config).context("failed to set up the HTTP client")?;

    let output = run(&mut server, &credentials, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn config_from(cli: &Cli, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::from_lookup(lookup)?;
    if let Some(url) = &cli.url {
        config.url = url.clone();
    }
    if let Some(username) = &cli.username {
        config.credentials.username = username.clone();
    }
    if let Some(password) = &cli.password {
        config.credentials.password = password.clone();
    }
    Ok(config)
}

fn run(server: &mut Server, credentials: &Credentials, command: Command) -> anyhow::Result<Value> {
    let output = match command {
        Command::Info => server.info()?.to_json(),
        Command::Disconnect => {
            server.disconnect()?;
            Value::Null
        }
        Command::CreateDb { name, storage } => {
            let storage = storage.unwrap_or(server.config().storage);
            server.create_database(&name, storage)?.data()?.to_json()
        }
        Command::Connect { db } => open(server, credentials, &db)?.data()?.to_json(),
        Command::Cluster { db, class } => match open(server, credentials, &db)?.cluster(&class)? {
            Some(cluster) => cluster.data().to_json(),
            None => Value::Null,
        },
        Command::Class { db, class, limit } => {
            let database = open(server, credentials, &db)?;
            let limit = limit.unwrap_or(database.default_limit());
            klass_json(&database.klass(&class, limit)?)
        }
        Command::CreateClass { db, class } => klass_json(&open(server, credentials, &db)?.create_klass(&class)?),
        Command::Query { db, query } => klass_json(&open(server, credentials, &db)?.query(&query)?),
        Command::Get { db, rid } => document_json(&open(server, credentials, &db)?.document(&rid)?),
        Command::Insert { db, fields, class } => {
            let fields: Map<String, Value> = match serde_json::from_str(&fields)
                .context("fields must be a JSON object")?
            {
                Value::Object(map) => map,
                other => bail!("fields must be a JSON object, got {other}"),
            };
            document_json(&open(server, credentials, &db)?.create_document(class.as_deref(), fields)?)
        }
        Command::Delete { db, rid } => {
            open(server, credentials, &db)?.document(&rid)?.delete()?;
            Value::Null
        }
        Command::Property {
            db,
            class,
            name,
            drop,
        } => {
            let database = open(server, credentials, &db)?;
            let mut klass = database.klass(&class, database.default_limit())?;
            klass.sync_schema()?;
            let change = klass.property(&name, !drop)?;
            Value::String(
                match change {
                    PropertyChange::Created => "created",
                    PropertyChange::Deleted => "deleted",
                    PropertyChange::Unchanged => "unchanged",
                }
                .to_string(),
            )
        }
    };
    Ok(output)
}

fn open(server: &Server, credentials: &Credentials, db: &str) -> anyhow::Result<Database> {
    server
        .database(db, credentials)
        .with_context(|| format!("failed to open database {db}"))
}

fn document_json(document: &Document) -> Value {
    document.data().to_json()
}

fn klass_json(klass: &Klass) -> Value {
    let documents: BTreeMap<&str, Value> = klass
        .documents()
        .map(|document| (document.rid().as_str(), document_json(document)))
        .collect();
    serde_json::json!({
        "class": klass.name(),
        "documents": documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use compass::mock::MockConnector;
    use compass::Method;
    use serde_json::json;

    #[test]
    fn test_parse_insert() {
        let cli = Cli::parse_from([
            "compass",
            "--url",
            "http://db:2480",
            "insert",
            "demo",
            r#"{"name": "Ada"}"#,
            "--class",
            "Person",
        ]);
        assert_eq!(cli.url.as_deref(), Some("http://db:2480"));
        assert!(matches!(cli.command, Command::Insert { ref class, .. } if class.as_deref() == Some("Person")));
    }

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        }
    }

    #[test]
    fn test_parse_storage() {
        let cli = Cli::parse_from(["compass", "create-db", "demo", "--storage", "plocal"]);
        assert!(matches!(cli.command, Command::CreateDb { storage: Some(Storage::Plocal), .. }));

        let cli = Cli::parse_from(["compass", "create-db", "demo"]);
        assert!(matches!(cli.command, Command::CreateDb { storage: None, .. }));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from(["compass", "-u", "reader", "-p", "reader", "info"]);
        let config = config_from(&cli, lookup(&[("COMPASS_USERNAME", "writer"), ("COMPASS_LIMIT", "5")])).unwrap();
        assert_eq!(config.credentials, Credentials::reader());
        assert_eq!(config.default_limit, 5);
    }

    #[test]
    fn test_bad_environment_value_is_reported() {
        let cli = Cli::parse_from(["compass", "info"]);
        assert!(config_from(&cli, lookup(&[("COMPASS_TIMEOUT_SECS", "x")])).is_err());
    }

    #[test]
    fn test_create_db_uses_configured_storage() {
        let mock = MockConnector::new();
        mock.respond(Method::Post, "http://db:2480/database/demo/plocal", 200, "")
            .respond_json(Method::Get, "http://db:2480/database/demo", 200, &json!({}))
            .respond_json(Method::Get, "http://db:2480/connect/demo", 200, &json!({"classes": []}));

        let cli = Cli::parse_from(["compass", "--url", "http://db:2480", "create-db", "demo"]);
        let config = config_from(&cli, lookup(&[("COMPASS_STORAGE", "plocal")])).unwrap();
        let credentials = config.credentials.clone();
        let mut server = Server::with_config(config, Arc::new(mock.clone())).unwrap();

        let output = run(&mut server, &credentials, cli.command).unwrap();
        assert_eq!(output, json!({"classes": []}));
        assert_eq!(mock.pending(), 0);
    }

    #[test]
    fn test_storage_flag_beats_configuration() {
        let mock = MockConnector::new();
        mock.respond(Method::Post, "http://db:2480/database/demo/local", 200, "")
            .respond_json(Method::Get, "http://db:2480/database/demo", 200, &json!({}))
            .respond_json(Method::Get, "http://db:2480/connect/demo", 200, &json!({}));

        let cli = Cli::parse_from(["compass", "--url", "http://db:2480", "create-db", "demo", "--storage", "local"]);
        let config = config_from(&cli, lookup(&[("COMPASS_STORAGE", "plocal")])).unwrap();
        let credentials = config.credentials.clone();
        let mut server = Server::with_config(config, Arc::new(mock.clone())).unwrap();

        run(&mut server, &credentials, cli.command).unwrap();
        assert_eq!(mock.pending(), 0);
    }
}
