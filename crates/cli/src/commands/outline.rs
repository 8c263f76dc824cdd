use anyhow::Result;
use tracing::debug;

use super::session::open_snapshot;
use crate::cli::GlobalOptions;
use crate::display::{print_json, render_outline};

pub fn outline_command(filepath: &str, options: &GlobalOptions) -> Result<()> {
    debug!("Building outline: {}", filepath);
    let snapshot = open_snapshot(filepath, options)?;
    let items = snapshot.navigation();
    if options.json {
        print_json(&items)
    } else {
        print!("{}", render_outline(&items));
        Ok(())
    }
}
