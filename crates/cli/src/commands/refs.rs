use anyhow::{Result, bail};
use tracing::debug;

use super::session::open_snapshot;
use crate::cli::GlobalOptions;
use crate::display::{print_json, render_occurrences};
use crate::utils::parse_filepath_with_position;

pub fn refs_command(location: &str, options: &GlobalOptions) -> Result<()> {
    debug!("Finding occurrences at: {}", location);
    let (filepath, position) = parse_filepath_with_position(location);
    let Some((line, column)) = position else {
        bail!("Expected <file>:<line>:<column>, got {location}");
    };

    let snapshot = open_snapshot(&filepath, options)?;
    // Columns are 1-based on the command line
    let occurrences = snapshot.occurrences(line, column.saturating_sub(1))?;
    if options.json {
        print_json(&occurrences)
    } else {
        print!("{}", render_occurrences(&filepath, &occurrences));
        Ok(())
    }
}
