use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::{json, Value};

use spl_chaincode::{CodecConfig, ProfileChaincode, Response};
use spl_gateway::{GatewayConfig, GatewayServer};
use spl_store::{WalLedgerStore, WalStoreConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Invoke(args) => cmd_invoke(args, cli.format),
        Command::Serve(args) => cmd_serve(args),
        Command::Compact(args) => cmd_compact(args, cli.format),
    }
}

fn cmd_invoke(args: InvokeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let codec = if args.legacy_pairs {
        CodecConfig::legacy()
    } else {
        CodecConfig::default()
    };
    let chaincode = ProfileChaincode::new(codec)?;
    let store = WalLedgerStore::open(&args.state, WalStoreConfig::default())
        .with_context(|| format!("opening ledger {}", args.state.display()))?;

    let response = chaincode.invoke(&store, &args.function, &args.args);
    println!("{}", render_response(&args.function, &response, format));
    if !response.is_ok() {
        bail!("{} failed", args.function);
    }
    Ok(())
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => GatewayConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(state) = args.state {
        config.state_path = Some(state);
    }

    let server = GatewayServer::new(config)?;
    println!(
        "SPL gateway on {} ({})",
        server.config().bind_addr.to_string().bold(),
        match &server.config().state_path {
            Some(p) => p.display().to_string(),
            None => "in-memory state".into(),
        }
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_compact(args: CompactArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = WalLedgerStore::open(&args.state, WalStoreConfig::default())
        .with_context(|| format!("opening ledger {}", args.state.display()))?;
    let before = store.log_len()?;
    store.compact()?;
    let after = store.log_len()?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "keys": store.len(), "bytes_before": before, "bytes_after": after })
        ),
        OutputFormat::Text => println!(
            "{} Compacted {}: {} keys, {} -> {} bytes",
            "✓".green().bold(),
            args.state.display(),
            store.len(),
            before,
            after
        ),
    }
    Ok(())
}

/// Payloads are JSON for queries and empty for writes.
fn payload_value(payload: &[u8]) -> Value {
    if payload.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(payload)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(payload).into_owned()))
}

fn render_response(function: &str, response: &Response, format: OutputFormat) -> String {
    let payload = payload_value(&response.payload);
    match format {
        OutputFormat::Json => json!({
            "status": response.status,
            "message": response.message,
            "payload": payload,
        })
        .to_string(),
        OutputFormat::Text if response.is_ok() => {
            let mut out = format!("{} {}", "✓".green().bold(), function.bold());
            if !payload.is_null() {
                let pretty = serde_json::to_string_pretty(&payload).unwrap_or_default();
                out.push('\n');
                out.push_str(&pretty);
            }
            out
        }
        OutputFormat::Text => format!(
            "{} {}: {}",
            "✗".red().bold(),
            function.bold(),
            response.message.red()
        ),
    }
}
