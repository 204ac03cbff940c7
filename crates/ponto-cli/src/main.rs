use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod client;

use client::{ApiClient, EmployeeFields};

#[derive(Parser)]
#[command(name = "ponto", about = "Ponto time clock CLI")]
struct Cli {
    /// pontod base URL
    #[arg(long, env = "PONTO_SERVER", default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Bearer token from `ponto login`
    #[arg(long, env = "PONTO_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Exchange credentials for a bearer token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "PONTO_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Register a new employee from a selfie
    Enroll {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        document: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        /// Photo with the employee's face
        selfie: PathBuf,
    },
    /// Replace an employee's reference face
    ReEnroll {
        employee_id: i64,
        selfie: PathBuf,
    },
    /// Record a punch
    Punch {
        employee_id: i64,
        selfie: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// List employees
    List,
    /// Export the punch audit trail as CSV
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that the daemon is up
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.server, cli.token)?;
    tracing::debug!(server = %cli.server, "using server");

    match cli.command {
        Commands::Login { username, password } => {
            let token = client.login(&username, &password).await?;
            println!("{token}");
        }
        Commands::Enroll {
            name,
            document,
            email,
            selfie,
        } => {
            let fields = EmployeeFields {
                name,
                document,
                email,
            };
            print_json(&client.enroll(fields, &selfie).await?)?;
        }
        Commands::ReEnroll {
            employee_id,
            selfie,
        } => {
            print_json(&client.re_enroll(employee_id, &selfie).await?)?;
        }
        Commands::Punch {
            employee_id,
            selfie,
            lat,
            lon,
        } => {
            print_json(&client.punch(employee_id, &selfie, lat, lon).await?)?;
        }
        Commands::List => {
            let employees = client.list().await?;
            match employees.as_array() {
                Some(list) if list.is_empty() => println!("No employees enrolled"),
                Some(list) => {
                    for e in list {
                        println!(
                            "{:>5}  {}  {}",
                            e["id"],
                            e["name"].as_str().unwrap_or_default(),
                            e["document"].as_str().unwrap_or("-"),
                        );
                    }
                }
                None => print_json(&employees)?,
            }
        }
        Commands::Export { output } => {
            let csv = client.export_csv().await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, csv).await?;
                    eprintln!("Wrote {}", path.display());
                }
                None => print!("{csv}"),
            }
        }
        Commands::Status => {
            let health = client.health().await?;
            println!("pontod: {}", health["status"].as_str().unwrap_or("unknown"));
        }
    }

    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punch_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "ponto", "--token", "t", "punch", "3", "me.jpg", "--lat", "-23.5", "--lon", "-46.6",
        ])
        .unwrap();
        let Commands::Punch { employee_id, lat, lon, .. } = cli.command else {
            panic!("expected punch");
        };
        assert_eq!(employee_id, 3);
        assert_eq!(lat, Some(-23.5));
        assert_eq!(lon, Some(-46.6));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
