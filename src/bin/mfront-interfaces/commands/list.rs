//! `mfront-interfaces list` command

use anyhow::Result;

use crate::cli::ListArgs;
use mfront_interfaces::ops::inspect::{format_summaries, list_interfaces};
use mfront_interfaces::InterfaceRegistry;

pub fn execute(args: ListArgs) -> Result<()> {
    let summaries = list_interfaces(&InterfaceRegistry::new());
    print!("{}", format_summaries(&summaries, args.long));
    Ok(())
}
