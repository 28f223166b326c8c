//! HyperDrive Router - Entry Point
//!
//! | Command | Description |
//! |---------|-------------|
//! | `hdr check-config` | Load and validate configuration, print it as JSON |
//! | `hdr scan` | Bootstrap in-memory providers and print a failure-prediction report |

use clap::Parser;
use hdr::cli::{Cli, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let output = run(&cli).await?;
    println!("{output}");
    Ok(())
}
