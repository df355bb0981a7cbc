use std::path::PathBuf;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use clap::{Parser, Subcommand};

use courier::http::{RequestBody, RequestDescriptor};
use courier::lifecycle::{shutdown::Shutdown, signals::trigger_on_signal};
use courier::resilience::{build_client, Dispatcher, RetryPolicy, TransportConfig};

#[derive(Parser)]
#[command(name = "courier-cli")]
#[command(about = "Command line client for resilient HTTP dispatch", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one request, retrying until it gets the expected status
    Send(SendArgs),
}

#[derive(clap::Args)]
struct SendArgs {
    /// Target URL, e.g. http://localhost:8080/orders
    url: String,

    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Request body
    #[arg(short, long, conflicts_with = "data_file")]
    data: Option<String>,

    /// Read the request body from a file
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Header as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(short, long = "query")]
    query: Vec<String>,

    /// Status code that counts as success
    #[arg(long, default_value_t = 200)]
    expect: u16,

    #[arg(long, default_value_t = 100)]
    max_attempts: u32,

    #[arg(long, default_value_t = 30_000)]
    base_delay_ms: u64,

    #[arg(long, default_value_t = 10)]
    slow_down_every: u32,

    /// Per-attempt timeout
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Send(args) => send(args).await,
    }
}

async fn send(args: SendArgs) -> Result<(), Box<dyn std::error::Error>> {
    let method: Method = args.method.to_uppercase().parse()?;
    let expected = StatusCode::from_u16(args.expect)?;
    let timeout = Duration::from_secs(args.timeout_secs);

    let shutdown = Shutdown::new();
    tokio::spawn(trigger_on_signal(shutdown.clone()));

    let mut descriptor = RequestDescriptor::parse(&args.url)?
        .method(method)
        .expect(expected)
        .timeout(timeout)
        .cancel_on(shutdown.subscribe());

    if let Some(data) = args.data {
        descriptor = descriptor.body(data);
    } else if let Some(path) = args.data_file {
        let file = tokio::fs::File::open(&path).await?;
        descriptor = descriptor.body(RequestBody::reader(file));
    }

    for header in &args.headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| format!("header {header:?} is not \"Name: value\""))?;
        descriptor = descriptor.header(name.trim(), value.trim())?;
    }

    for pair in &args.query {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("query {pair:?} is not key=value"))?;
        descriptor = descriptor.query(key, value);
    }

    let client = build_client(&TransportConfig {
        connect_timeout: timeout,
        request_timeout: timeout,
    })?;
    let policy = RetryPolicy {
        base_delay: Duration::from_millis(args.base_delay_ms),
        slow_down_every: args.slow_down_every.max(1),
        max_attempts: args.max_attempts.max(1),
    };
    let dispatcher = Dispatcher::new(client, policy);

    let handle = dispatcher.dispatch(descriptor);
    eprintln!("Dispatch {} started (Ctrl+C to cancel)", handle.id());

    let response = handle.await?;
    let status = response.status();
    let body = response.text().await?;

    eprintln!("Status: {status}");
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
