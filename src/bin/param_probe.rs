//! Print the typed value of one parameter for a given request.
//!
//! ```bash
//! param-probe --definition color.yaml --url '/pets?color[R]=100&color[G]=200'
//! param-probe -d id.json -u /pets/7 --path-param id=7
//! ```

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use oas_param::logging::init_logging;
use oas_param::{ParamConfig, ParameterSpec, ParsedRequest};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "param-probe")]
#[command(about = "Extract and convert one OpenAPI parameter from a request", long_about = None)]
struct Cli {
    /// Parameter definition file (YAML or JSON)
    #[arg(short, long)]
    definition: PathBuf,

    /// Request path with query string, e.g. /pets?id=12
    #[arg(short, long)]
    url: String,

    /// Request header as name:value (repeatable)
    #[arg(long = "header", value_name = "NAME:VALUE")]
    headers: Vec<String>,

    /// Cookie as name=value (repeatable)
    #[arg(long = "cookie", value_name = "NAME=VALUE")]
    cookies: Vec<String>,

    /// Matched path parameter as name=value (repeatable)
    #[arg(long = "path-param", value_name = "NAME=VALUE")]
    path_params: Vec<String>,

    /// Print the raw extracted value instead of the converted one
    #[arg(long, default_value_t = false)]
    raw: bool,
}

fn load_definition(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    parse_definition(&content, is_yaml)
}

fn parse_definition(content: &str, is_yaml: bool) -> Result<Value> {
    let definition = if is_yaml {
        serde_yaml::from_str(content)?
    } else {
        serde_json::from_str(content)?
    };
    Ok(definition)
}

fn split_pair(raw: &str, separator: char) -> Result<(&str, &str)> {
    raw.split_once(separator)
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| anyhow!("expected NAME{}VALUE, got '{}'", separator, raw))
}

fn build_request(cli: &Cli) -> Result<ParsedRequest> {
    let mut request = ParsedRequest::from_url(&cli.url);
    for header in &cli.headers {
        let (name, value) = split_pair(header, ':')?;
        request = request.with_header(name, value);
    }
    for cookie in &cli.cookies {
        let (name, value) = split_pair(cookie, '=')?;
        request = request.with_cookie(name, value);
    }
    for param in &cli.path_params {
        let (name, value) = split_pair(param, '=')?;
        request = request.with_path_param(name, value);
    }
    Ok(request)
}

fn run(cli: &Cli) -> Result<Value> {
    let definition = load_definition(&cli.definition)?;
    let spec = ParameterSpec::from_value_with_config(&definition, ParamConfig::from_env())?;
    let request = build_request(cli)?;

    let value = if cli.raw {
        spec.extract(&request)?.map(|raw| raw.to_json())
    } else {
        spec.value(&request)?
    };
    Ok(value.unwrap_or(Value::Null))
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = init_logging() {
        eprintln!("warning: {err}");
    }
    match run(&cli) {
        Ok(value) => println!("{value}"),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}
