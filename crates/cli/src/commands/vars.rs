use anyhow::{Result, bail};
use tracing::debug;

use super::session::open_snapshot;
use crate::cli::GlobalOptions;
use crate::display::{print_json, render_variables};
use crate::utils::parse_filepath_with_line;

pub fn vars_command(location: &str, options: &GlobalOptions) -> Result<()> {
    debug!("Listing variables at: {}", location);
    let (filepath, line) = parse_filepath_with_line(location);
    let Some(line) = line else {
        bail!("Expected <file>:<line>, got {location}");
    };

    let snapshot = open_snapshot(&filepath, options)?;
    let variables = snapshot.variables_in_scope(line)?;
    if options.json {
        print_json(&variables)
    } else {
        print!("{}", render_variables(&filepath, line, &variables));
        Ok(())
    }
}
