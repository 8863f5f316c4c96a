use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use cv_gateway::security::webhook::{sign, SIGNATURE_HEADER, TIMESTAMP_HEADER};

#[derive(Parser)]
#[command(name = "cv-cli")]
#[command(about = "Operator CLI for the cv-gateway API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the signature headers for a payload file
    Sign {
        payload: PathBuf,
        #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
        secret: String,
    },
    /// Send a signed section update (`{"section": ..., "data": ...}`) to the webhook
    Push {
        payload: PathBuf,
        #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
        secret: String,
    },
    /// Check service health
    Health,
    /// Production configuration diagnostics
    Production {
        /// config, validate, readiness, template or status
        #[arg(short, long, default_value = "status")]
        action: String,
        #[arg(long, env = "ADMIN_API_KEY", hide_env_values = true)]
        key: String,
    },
    /// Remaining quota for a client on an endpoint
    RateLimit {
        #[arg(long)]
        ip: String,
        #[arg(long)]
        endpoint: String,
        /// api, webhook, auth or strict
        #[arg(long, default_value = "api")]
        class: String,
        #[arg(long, env = "ADMIN_API_KEY", hide_env_values = true)]
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Sign { payload, secret } => {
            let body = std::fs::read(payload)?;
            println!("{}: {}", SIGNATURE_HEADER, sign(&body, &secret)?);
            println!("{}: {}", TIMESTAMP_HEADER, unix_now());
        }
        Commands::Push { payload, secret } => {
            let body = std::fs::read(payload)?;
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(&sign(&body, &secret)?)?);
            headers.insert(TIMESTAMP_HEADER, HeaderValue::from(unix_now()));

            let res = client
                .post(format!("{}/api/webhook/cv", cli.url))
                .headers(headers)
                .body(body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/api/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Production { action, key } => {
            let res = client
                .get(format!("{}/api/config/production", cli.url))
                .query(&[("action", action)])
                .headers(bearer(&key)?)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::RateLimit {
            ip,
            endpoint,
            class,
            key,
        } => {
            let res = client
                .get(format!("{}/api/admin/rate-limit", cli.url))
                .query(&[("ip", ip), ("endpoint", endpoint), ("class", class)])
                .headers(bearer(&key)?)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn bearer(key: &str) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    Ok(headers)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("{}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
