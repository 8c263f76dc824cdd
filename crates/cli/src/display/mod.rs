pub mod formatter;

pub use formatter::{
    print_json, render_documentation, render_occurrences, render_outline, render_ranges,
    render_variables,
};
