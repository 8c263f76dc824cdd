pub mod parser;

pub use parser::{parse_filepath_with_line, parse_filepath_with_position};
