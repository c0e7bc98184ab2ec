use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Query a running workflow gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Send parameters as a JSON body (POST) instead of the query string.
    #[arg(long)]
    post: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search wallpapers
    Search {
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(short, long)]
        limit: Option<u32>,
        #[arg(short, long)]
        page: Option<u32>,
    },
    /// Fetch the detail page for a date (yyyyMMdd)
    Detail { enddate: String },
    /// Increment the view count for a date (yyyyMMdd)
    View { enddate: String },
}

impl Commands {
    fn path(&self) -> &'static str {
        match self {
            Commands::Search { .. } => "/api/search",
            Commands::Detail { .. } => "/api/detail",
            Commands::View { .. } => "/api/view",
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Commands::Search { search, limit, page } => {
                let mut params = vec![("search", search.clone())];
                if let Some(limit) = limit {
                    params.push(("limit", limit.to_string()));
                }
                if let Some(page) = page {
                    params.push(("page", page.to_string()));
                }
                params
            }
            Commands::Detail { enddate } | Commands::View { enddate } => {
                vec![("enddate", enddate.clone())]
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let url = format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path());
    let params = cli.command.params();

    let res = if cli.post {
        let body: serde_json::Map<String, Value> = params
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v)))
            .collect();
        client.post(url).json(&body).send().await?
    } else {
        client.get(url).query(&params).send().await?
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
