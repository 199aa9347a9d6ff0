use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use cloud_sdk_core::{
    APPLICATION_JSON, ApiClient, JsonPatchOperation, RequestBuilder, RequestDescriptor,
    pairs_from_flat,
};
use reqwest::Method;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "cloud-sdk-cli",
    version,
    about = "Assemble and send cloud service requests"
)]
struct Cli {
    /// Service base URL that request paths are resolved against.
    #[arg(long, env = "CLOUD_SERVICE_URL")]
    service_url: String,

    /// Bearer token sent in the Authorization header.
    #[arg(long, env = "CLOUD_ACCESS_TOKEN")]
    access_token: Option<String>,

    /// Emit compact JSON instead of pretty-printed output.
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the URL a path template resolves to.
    Resolve(ResolveArgs),
    /// Assemble a request and send it (or print it with --dry-run).
    Request(RequestArgs),
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Path template, for example: /v1/instances/{instance_id}.
    path: String,

    /// Path parameter in form key=value. Repeat as needed.
    #[arg(long = "path-param", value_name = "KEY=VALUE")]
    path_param: Vec<String>,

    /// Query parameter in form key=value. Repeat as needed.
    #[arg(long = "query", value_name = "KEY=VALUE")]
    query: Vec<String>,
}

#[derive(Debug, Args)]
struct RequestArgs {
    /// HTTP method (DELETE, GET, POST, PUT, PATCH or HEAD).
    method: String,

    #[command(flatten)]
    target: ResolveArgs,

    /// Header name and value. Repeat as needed.
    #[arg(long = "header", num_args = 2, value_names = ["NAME", "VALUE"])]
    header: Vec<String>,

    /// Form parameter in form key=value. Replaces any other body.
    #[arg(long = "form", value_name = "KEY=VALUE")]
    form: Vec<String>,

    #[command(flatten)]
    body: BodyInput,

    /// Print the assembled request instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct BodyInput {
    /// JSON request body literal.
    #[arg(long, conflicts_with_all = ["json_patch", "body_file"])]
    body_json: Option<String>,

    /// JSON Patch operations as a JSON array literal.
    #[arg(long, conflicts_with = "body_file")]
    json_patch: Option<String>,

    /// Path to a file sent verbatim as the request body.
    #[arg(long, value_name = "PATH")]
    body_file: Option<PathBuf>,

    /// Media type of the body. Defaults depend on the body source.
    #[arg(long)]
    content_type: Option<String>,
}

/// Entry point for the CLI.
///
/// Installs logging, builds the client from configuration, dispatches
/// subcommands and prints JSON output.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut client = ApiClient::new(&cli.service_url).with_context(|| {
        format!(
            "failed to create client with service URL '{}'",
            cli.service_url
        )
    })?;
    if let Some(token) = &cli.access_token {
        client = client.with_authorization_token(token.clone());
    }

    let output = match &cli.command {
        Command::Resolve(args) => {
            let builder = target_builder(&client, Method::GET, args)?;
            Value::String(builder.to_url().into())
        }
        Command::Request(args) => {
            let request = assemble_request(&client, args)
                .with_context(|| format!("failed to assemble {} request", args.method))?;
            if args.dry_run {
                describe_request(&request)
            } else {
                client.execute_json(request).await.with_context(|| {
                    format!("request failed: {} {}", args.method, args.target.path)
                })?
            }
        }
    };

    print_json(&output, cli.compact).context("failed to print JSON output")?;
    Ok(())
}

/// Resolves the path template and applies query parameters.
fn target_builder(
    client: &ApiClient,
    method: Method,
    args: &ResolveArgs,
) -> Result<RequestBuilder> {
    // Parse into owned pairs first, then borrow as `&str` for the client call.
    let path_params = parse_pairs(&args.path_param, "--path-param")?;
    let query = parse_pairs(&args.query, "--query")?;

    let borrowed_path: Vec<(&str, &str)> = path_params
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    let builder = client
        .request(method, &args.path, &borrowed_path)
        .with_context(|| format!("failed to resolve path '{}'", args.path))?;
    Ok(builder.queries(query))
}

/// Builds the full request from CLI arguments.
fn assemble_request(client: &ApiClient, args: &RequestArgs) -> Result<RequestDescriptor> {
    let method = Method::from_str(&args.method.to_ascii_uppercase())
        .with_context(|| format!("invalid HTTP method '{}'", args.method))?;
    let headers = pairs_from_flat(&args.header).context("failed to parse --header arguments")?;
    let form = parse_pairs(&args.form, "--form")?;

    let builder = target_builder(client, method, &args.target)?
        .headers(headers)
        .forms(form);
    let builder = apply_body(builder, &args.body)?;

    Ok(builder.build()?)
}

/// Applies at most one body source, choosing a media type when none is given.
fn apply_body(builder: RequestBuilder, body: &BodyInput) -> Result<RequestBuilder> {
    let content_type = body.content_type.as_deref();

    if let Some(raw) = &body.body_json {
        let value: Value =
            serde_json::from_str(raw).context("failed to parse JSON from --body-json")?;
        return Ok(builder.body_content(
            Some(content_type.unwrap_or(APPLICATION_JSON)),
            Some(&value),
            None,
            None,
        )?);
    }

    if let Some(raw) = &body.json_patch {
        let operations: Vec<JsonPatchOperation> =
            serde_json::from_str(raw).context("failed to parse JSON Patch from --json-patch")?;
        return Ok(builder.body_content(
            Some(content_type.unwrap_or("application/json-patch+json")),
            None::<&Value>,
            Some(operations.as_slice()),
            None,
        )?);
    }

    if let Some(path) = &body.body_file {
        let file = File::open(path)
            .with_context(|| format!("failed to open --body-file '{}'", path.display()))?;
        return Ok(builder
            .body_content_reader(file, content_type.unwrap_or("application/octet-stream"))?);
    }

    Ok(builder)
}

/// Parses repeated `key=value` arguments into owned key/value pairs.
fn parse_pairs(values: &[String], flag_name: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(values.len());
    for item in values {
        let Some((key, value)) = item.split_once('=') else {
            bail!("invalid {flag_name} value '{item}': expected key=value");
        };
        if key.is_empty() {
            bail!("invalid {flag_name} value '{item}': empty key");
        }
        pairs.push((key.to_owned(), value.to_owned()));
    }
    Ok(pairs)
}

/// Renders an assembled request as JSON for `--dry-run`.
fn describe_request(request: &RequestDescriptor) -> Value {
    let headers: Map<String, Value> = request
        .headers()
        .iter()
        .map(|(name, value)| {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            (name.as_str().to_owned(), Value::String(value))
        })
        .collect();

    json!({
        "method": request.method().as_str(),
        "url": request.url().as_str(),
        "headers": headers,
        "body": request
            .body()
            .map(|body| String::from_utf8_lossy(body.bytes()).into_owned()),
    })
}

/// Prints a JSON value either compact or pretty-formatted.
fn print_json(value: &Value, compact: bool) -> Result<()> {
    if compact {
        println!(
            "{}",
            serde_json::to_string(value).context("Failed to render JSON")?
        );
    } else {
        println!(
            "{}",
            serde_json::to_string_pretty(value).context("Failed to render JSON")?
        );
    }
    Ok(())
}
