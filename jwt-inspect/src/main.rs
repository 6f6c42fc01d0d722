use std::io::{self, BufRead};
use std::process::ExitCode;

use anyhow::Context;
use auth::{AuthConfig, SECRET_ENV};
use token::{Token, TokenValidator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: jwt-inspect [TOKEN]

Decodes TOKEN (or the first line of stdin) and runs every validation step
against the secret in $JWT_SECRET. Exits with status 1 when the token is
rejected.";

fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jwt_inspect=info,token=info,auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let raw = match args.get(1).map(String::as_str) {
        Some("-h" | "--help") => {
            println!("{USAGE}");
            return Ok(ExitCode::SUCCESS);
        }
        Some(token) => token.to_string(),
        None => read_stdin_token()?,
    };

    let config = AuthConfig::from_env().with_context(|| format!("Failed to read {SECRET_ENV}"))?;
    let validator = config.validator()?;

    let token = match validator.parse(&raw) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("{}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    print_token(&token)?;
    print_checks(&validator, &token);

    match validator.parse_and_validate(&raw) {
        Ok(_) => {
            tracing::info!(sub = token.payload.subject, "Token accepted");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::warn!(reason = e.kind(), "Token rejected: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn read_stdin_token() -> anyhow::Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read token from stdin")?;

    let token = line.trim();
    anyhow::ensure!(!token.is_empty(), "No token given\n\n{USAGE}");
    Ok(token.to_string())
}

fn print_token(token: &Token) -> anyhow::Result<()> {
    println!("header:  {}", serde_json::to_string_pretty(&token.header)?);
    println!("payload: {}", serde_json::to_string_pretty(&token.payload)?);
    println!("issued:  {}", token.payload.issued_at.to_rfc3339());
    println!("expires: {}", token.payload.expires_at.to_rfc3339());
    Ok(())
}

fn print_checks(validator: &TokenValidator, token: &Token) {
    let verdict = |ok: bool| if ok { "ok" } else { "FAILED" };
    println!("signature:  {}", verdict(validator.validate_signature(token)));
    println!("header:     {}", verdict(validator.validate_header(token)));
    println!("expiration: {}", verdict(validator.validate_expiration(token)));
}
