//! `mfront-interfaces hypotheses` command

use anyhow::Result;

use crate::cli::HypothesesArgs;
use mfront_interfaces::ops::inspect::treated_hypotheses;

pub fn execute(args: HypothesesArgs) -> Result<()> {
    let hypotheses =
        treated_hypotheses(&args.behaviour, &args.interface, args.keywords.as_deref())?;
    for h in hypotheses {
        println!("{}", h);
    }
    Ok(())
}
