//! Trialscope CLI
//!
//! Command-line interface for the Trialscope API:
//! - Search clinical trials
//! - Show trial details
//! - Fetch vaccine coverage and outbreak data
//! - Check server status
//! - Generate a default config file

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

use trialscope::config::generate_default_config;

#[derive(Parser)]
#[command(name = "trialscope")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Health data proxy for clinical trials, vaccines, and outbreaks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search clinical trials by condition
    Search {
        /// Condition to search for
        condition: String,
        /// Narrow by location
        #[arg(short, long)]
        location: Option<String>,
        /// Narrow by overall status (e.g. RECRUITING, COMPLETED)
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Show full detail for one trial
    Trial {
        /// NCT id (e.g. NCT01234567)
        id: String,
    },

    /// Vaccine coverage GeoJSON for a vaccine and year
    Coverage {
        /// Vaccine key (e.g. measles, polio, dtp)
        vaccine: String,
        /// Year to query
        year: String,
    },

    /// Outbreak GeoJSON for a disease
    Outbreaks {
        /// Disease key (e.g. measles, cholera, dengue)
        disease: String,
        /// Reporting window: 7d, 30d, 90d, 1y
        #[arg(short, long, default_value = "30d")]
        time_period: String,
        /// Severity filter: high, moderate, low, all
        #[arg(short, long, default_value = "all")]
        severity: String,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Search {
            condition,
            location,
            status,
        } => {
            let mut url = format!(
                "{}/api/v1/trials/search?condition={}",
                cli.api_url,
                urlencoding::encode(&condition)
            );
            if let Some(location) = location {
                url.push_str(&format!("&location={}", urlencoding::encode(&location)));
            }
            if let Some(status) = status {
                url.push_str(&format!("&status={}", urlencoding::encode(&status)));
            }

            let body = fetch(&client, &url).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_search_results(&body);
            }
        }

        Commands::Trial { id } => {
            let url = format!("{}/api/v1/trials/{}", cli.api_url, urlencoding::encode(&id));
            let body = fetch(&client, &url).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_trial_detail(&body);
            }
        }

        Commands::Coverage { vaccine, year } => {
            let url = format!(
                "{}/api/v1/coverage?vaccine={}&year={}",
                cli.api_url,
                urlencoding::encode(&vaccine),
                urlencoding::encode(&year)
            );
            let body = fetch(&client, &url).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_features(&body, &["country", "coverage", "year"]);
            }
        }

        Commands::Outbreaks {
            disease,
            time_period,
            severity,
        } => {
            let url = format!(
                "{}/api/v1/outbreaks?disease={}&time_period={}&severity={}",
                cli.api_url,
                urlencoding::encode(&disease),
                urlencoding::encode(&time_period),
                urlencoding::encode(&severity)
            );
            let body = fetch(&client, &url).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_features(&body, &["country", "cases", "severity", "lastUpdated"]);
            }
        }

        Commands::Status => {
            let url = format!("{}/health", cli.api_url);
            let body = fetch(&client, &url).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("Status:      {}", field(&body, "status"));
                println!("AI analysis: {}", field(&body, "ai_analysis"));
                println!("Uptime:      {}s", field(&body, "uptime_seconds"));
                println!("Version:     {}", field(&body, "version"));
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Wrote default config to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// GET a JSON document; non-2xx responses surface the error message
async fn fetch(client: &reqwest::Client, url: &str) -> anyhow::Result<Value> {
    let response = client.get(url).send().await?;
    let status = response.status();
    let body: Value = response.json().await?;

    if !status.is_success() {
        let message = body
            .pointer("/error/message")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        anyhow::bail!("{} ({})", message, status);
    }

    Ok(body)
}

fn field(body: &Value, key: &str) -> String {
    match body.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}

fn print_search_results(body: &Value) {
    let studies = body
        .get("studies")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    println!(
        "{} of {} matching trials",
        studies.len(),
        field(body, "totalCount")
    );
    println!();

    for study in &studies {
        println!(
            "{}  [{}]  {}",
            field(study, "NCTId"),
            field(study, "OverallStatus"),
            field(study, "BriefTitle")
        );
        if let Some(facility) = study.get("LocationFacility").and_then(Value::as_str) {
            println!("             {}", facility);
        }
    }
}

fn print_trial_detail(body: &Value) {
    println!("{}  {}", field(body, "NCTId"), field(body, "BriefTitle"));
    println!("Status:     {}", field(body, "OverallStatus"));
    println!("Type:       {}", field(body, "StudyType"));
    println!("Phase:      {}", field(body, "Phase"));
    println!("Enrollment: {}", field(body, "EnrollmentCount"));
    println!("Start:      {}", field(body, "StartDate"));
    println!("Completion: {}", field(body, "CompletionDate"));
    println!();
    println!("{}", field(body, "BriefSummary"));

    if let Some(locations) = body.get("Locations").and_then(Value::as_array) {
        println!();
        println!("Locations:");
        for location in locations {
            println!(
                "  {} ({}, {})",
                field(location, "facility"),
                field(location, "city"),
                field(location, "state")
            );
        }
    }
}

fn print_features(body: &Value, columns: &[&str]) {
    let features = body
        .get("features")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    println!("{} features", features.len());
    println!();

    for feature in &features {
        if let Some(properties) = feature.get("properties") {
            let row: Vec<String> = columns
                .iter()
                .map(|c| format!("{}={}", c, field(properties, c)))
                .collect();
            println!("{}", row.join("  "));
        }
    }
}
