use std::error::Error;

use clap::Args;

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Include the crate name.
    #[arg(long)]
    pub long: bool,
}

pub fn run(args: &VersionArgs) -> Result<(), Box<dyn Error>> {
    if args.long {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    } else {
        println!("{}", env!("CARGO_PKG_VERSION"));
    }
    Ok(())
}
