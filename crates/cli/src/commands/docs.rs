use anyhow::Result;
use tracing::debug;

use super::session::open_snapshot;
use crate::cli::GlobalOptions;
use crate::display::{print_json, render_documentation};

pub fn docs_command(filepath: &str, options: &GlobalOptions) -> Result<()> {
    debug!("Collecting documentation: {}", filepath);
    let snapshot = open_snapshot(filepath, options)?;
    if options.json {
        print_json(snapshot.all_documentation())
    } else {
        print!("{}", render_documentation(snapshot.all_documentation()));
        Ok(())
    }
}
