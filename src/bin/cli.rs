//! Quarry CLI
//!
//! Command-line interface for Quarry operations:
//! - Run logical queries through the API
//! - Check the store and server version
//! - Translate placeholders locally
//! - Generate a config file

use clap::{Parser, Subcommand};
use quarry::dialect::Dialect;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quarry-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query adapter for relational and time-series stores")]
#[command(long_about = "Quarry translates placeholder queries such as @showTables into native SQL\nfor MySQL, Postgres and openGemini, and returns rows as key/value pairs.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:7071", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a query through the API
    Query {
        /// Placeholder token or native SQL (empty for metadata only)
        #[arg(default_value = "")]
        sql: String,
        /// Target database (default: the store's current one)
        #[arg(short, long, default_value = "")]
        key: String,
    },

    /// Check the API can reach its store
    Verify,

    /// Show server and CLI versions
    Version,

    /// Translate a query locally, without a server
    Translate {
        /// Placeholder token or native SQL
        sql: String,
        /// Dialect (mysql, postgres, opengemini)
        #[arg(short, long, default_value = "opengemini")]
        dialect: String,
        /// Database to fill into show-tables statements
        #[arg(long)]
        database: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let json_output = cli.format == "json";

    match cli.command {
        Commands::Query { sql, key } => {
            let body = serde_json::json!({ "key": key, "sql": sql });

            let response = match client
                .post(format!("{}/api/v1/query", cli.api_url))
                .json(&body)
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => exit_unreachable(&cli.api_url, e),
            };

            let status = response.status();
            let data: serde_json::Value = response.json().await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_result(&data);
            }

            if !status.is_success() {
                eprintln!();
                eprintln!(
                    "Query failed ({}): {}",
                    status,
                    data["error"]["message"].as_str().unwrap_or("unknown error")
                );
                std::process::exit(1);
            }
        }

        Commands::Verify => {
            let response = match client
                .get(format!("{}/api/v1/verify", cli.api_url))
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => exit_unreachable(&cli.api_url, e),
            };

            let data: serde_json::Value = response.json().await?;
            let ready = data["ready"].as_bool().unwrap_or(false);

            if json_output {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else if ready {
                println!("Store: ready");
            } else {
                println!("Store: not ready");
                if let Some(message) = data["message"].as_str() {
                    println!("  {}", message);
                }
            }

            if !ready {
                std::process::exit(1);
            }
        }

        Commands::Version => {
            let response = match client
                .get(format!("{}/api/v1/version", cli.api_url))
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(e) => exit_unreachable(&cli.api_url, e),
            };

            let data: serde_json::Value = response.json().await?;

            if json_output {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!("quarry-cli v{}", env!("CARGO_PKG_VERSION"));
                println!(
                    "server     v{} (commit {}, built {})",
                    data["version"].as_str().unwrap_or("-"),
                    data["commit"].as_str().unwrap_or("-"),
                    data["date"].as_str().unwrap_or("-")
                );
            }
        }

        Commands::Translate {
            sql,
            dialect,
            database,
        } => {
            let dialect = Dialect::from_identifier(&dialect);
            let native_sql = dialect.translate_in(&sql, database.as_deref().unwrap_or_default());

            if json_output {
                let body = serde_json::json!({ "native_sql": native_sql, "dialect": dialect });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", native_sql);
            }
        }

        Commands::Config { output } => {
            let config = quarry::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn exit_unreachable(api_url: &str, error: reqwest::Error) -> ! {
    eprintln!("Cannot connect to Quarry API at {}", api_url);
    eprintln!("Error: {}", error);
    eprintln!();
    eprintln!("Make sure the Quarry API server is running:");
    eprintln!("  cargo run --bin quarry");
    std::process::exit(1);
}

fn print_result(data: &serde_json::Value) {
    let meta = &data["meta"];

    if let Some(current) = meta["currentDatabase"].as_str() {
        println!("Database: {}", if current.is_empty() { "-" } else { current });
    }
    if let Some(duration) = meta["duration"].as_str() {
        if !duration.is_empty() {
            println!("Took:     {}", duration);
        }
    }
    for label in meta["labels"].as_array().into_iter().flatten() {
        println!(
            "{}: {}",
            label["key"].as_str().unwrap_or("-"),
            label["value"].as_str().unwrap_or("-")
        );
    }
    println!();

    let items = match data["items"].as_array() {
        Some(items) if !items.is_empty() => items,
        _ => {
            print_list("Databases", &meta["databases"]);
            print_list("Tables", &meta["tables"]);
            return;
        }
    };

    println!("{:<24} | {}", "Column", "Value");
    println!("{}", "-".repeat(50));

    for item in items {
        for pair in item["data"].as_array().into_iter().flatten() {
            println!(
                "{:<24} | {}",
                pair["key"].as_str().unwrap_or("-"),
                pair["value"].as_str().unwrap_or("-")
            );
        }
    }

    println!();
    println!("{} rows", items.len());
}

fn print_list(title: &str, values: &serde_json::Value) {
    let values = match values.as_array() {
        Some(values) => values,
        None => return,
    };

    println!("{} ({}):", title, values.len());
    for value in values {
        println!("  {}", value.as_str().unwrap_or("-"));
    }
    println!();
}
