use anyhow::Result;
use tracing::debug;

use super::session::open_snapshot;
use crate::cli::GlobalOptions;
use crate::display::{print_json, render_ranges};

pub fn ranges_command(filepath: &str, options: &GlobalOptions) -> Result<()> {
    debug!("Collecting nestable ranges: {}", filepath);
    let snapshot = open_snapshot(filepath, options)?;
    let ranges = snapshot.nestable_ranges();
    if options.json {
        print_json(&ranges)
    } else {
        print!("{}", render_ranges(&ranges));
        Ok(())
    }
}
