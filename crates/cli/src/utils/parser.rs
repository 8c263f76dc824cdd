/// Split `path:line` into the path and its 1-based line number.
///
/// When the suffix is not a number the whole argument is treated as a path.
pub fn parse_filepath_with_line(filepath_arg: &str) -> (String, Option<u32>) {
    if let Some(colon_pos) = filepath_arg.rfind(':') {
        let path_part = &filepath_arg[..colon_pos];
        let line_part = &filepath_arg[colon_pos + 1..];

        if let Ok(line_num) = line_part.parse::<u32>() {
            (path_part.to_string(), Some(line_num))
        } else {
            (filepath_arg.to_string(), None)
        }
    } else {
        (filepath_arg.to_string(), None)
    }
}

/// Split `path:line:column` (both 1-based). A missing column defaults to
/// the start of the line.
pub fn parse_filepath_with_position(filepath_arg: &str) -> (String, Option<(u32, u32)>) {
    let (rest, last) = parse_filepath_with_line(filepath_arg);
    let Some(last) = last else {
        return (rest, None);
    };
    match parse_filepath_with_line(&rest) {
        (path, Some(line)) => (path, Some((line, last))),
        (path, None) => (path, Some((last, 1))),
    }
}
