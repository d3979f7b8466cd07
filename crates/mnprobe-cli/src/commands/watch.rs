use std::error::Error;
use std::thread;
use std::time::Duration;

use clap::Args;
use mnprobe_snap::{fingerprint, render_progress, snapshot};

use super::ScanArgs;

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub scan: ScanArgs,
    /// Seconds between polls.
    #[arg(long, default_value_t = 10)]
    pub interval: u64,
    /// Stop after this many polls.
    #[arg(long)]
    pub count: Option<u64>,
}

pub fn run(args: &WatchArgs) -> Result<(), Box<dyn Error>> {
    let config = args.scan.snapshot_config()?;
    let root = &args.scan.root;
    let mut last_seen: Option<String> = None;
    let mut polls = 0u64;
    loop {
        polls += 1;
        match fingerprint(root) {
            Ok(current) if last_seen.as_ref() == Some(&current) => {
                tracing::debug!(poll = polls, "scan files unchanged");
            }
            Ok(_) => match snapshot(root, &config) {
                Ok(snap) => {
                    println!("{}", render_progress(&snap));
                    if snap.stopped() {
                        tracing::info!(poll = polls, "all modes stopped");
                        return Ok(());
                    }
                    last_seen = Some(snap.fingerprint);
                }
                // Files may be mid-write; the next poll reads them afresh.
                Err(err) => tracing::warn!(poll = polls, %err, "snapshot failed"),
            },
            Err(err) => tracing::warn!(poll = polls, %err, "cannot read scan files"),
        }
        if args.count.is_some_and(|count| polls >= count) {
            return Ok(());
        }
        thread::sleep(Duration::from_secs(args.interval));
    }
}
