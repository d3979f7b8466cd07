use std::error::Error;

use clap::Args;
use mnprobe_snap::{render_json, render_text, snapshot};

use super::ScanArgs;

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub scan: ScanArgs,
    /// Emit canonical JSON instead of the text report.
    #[arg(long)]
    pub json: bool,
    /// Exit with an error when any anomaly was raised.
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let config = args.scan.snapshot_config()?;
    let snap = snapshot(&args.scan.root, &config)?;
    let rendered = if args.json {
        render_json(&snap)?
    } else {
        render_text(&snap)?
    };
    println!("{rendered}");
    if args.strict && !snap.anomalies.is_empty() {
        return Err(format!("{} anomaly(ies) raised", snap.anomalies.len()).into());
    }
    Ok(())
}
