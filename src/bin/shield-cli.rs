use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use probe_shield::config::{load_config, ShieldConfig};
use probe_shield::engine::{normalize_path, Decision, ProbeShield};
use probe_shield::rules::SignatureInfo;

#[derive(Parser)]
#[command(name = "shield-cli")]
#[command(about = "Audit the probe shield signature list", long_about = None)]
struct Cli {
    /// Apply additions and exclusions from this configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the effective signatures in evaluation order
    List,
    /// Show the decision and first matching signature for each path
    Check {
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[derive(Serialize)]
struct CheckResult {
    path: String,
    normalized: String,
    blocked: bool,
    status: Option<u16>,
    signature: Option<SignatureInfo>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let shield_config = match &cli.config {
        Some(path) => load_config(path)?.shield,
        None => ShieldConfig::default(),
    };
    let shield = ProbeShield::from_config(&shield_config)?;

    match cli.command {
        Commands::List => {
            let list: Vec<SignatureInfo> = shield
                .rules()
                .signatures()
                .iter()
                .map(SignatureInfo::from)
                .collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                for (i, sig) in list.iter().enumerate() {
                    println!("{:>3}  {:<20} {:<9} {}", i + 1, sig.family, sig.anchoring, sig.pattern);
                }
            }
        }
        Commands::Check { paths } => {
            let results: Vec<CheckResult> = paths
                .into_iter()
                .map(|path| {
                    let status = match shield.decide(&path) {
                        Decision::Allow => None,
                        Decision::Block(status) => Some(status.as_u16()),
                    };
                    CheckResult {
                        normalized: normalize_path(&path).into_owned(),
                        blocked: status.is_some(),
                        status,
                        signature: shield.explain(&path).map(SignatureInfo::from),
                        path,
                    }
                })
                .collect();
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for r in &results {
                    match (&r.status, &r.signature) {
                        (Some(status), Some(sig)) => {
                            println!("BLOCK {}  {}  [{} {}] {}", status, r.path, sig.family, sig.anchoring, sig.pattern)
                        }
                        _ => println!("ALLOW      {}", r.path),
                    }
                }
            }
        }
    }

    Ok(())
}
