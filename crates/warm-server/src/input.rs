//! Run requests read from stdin.

/// Split one request line into run arguments.
///
/// Arguments are whitespace-separated; a blank line carries no request.
pub fn parse_run_line(line: &str) -> Option<Vec<String>> {
    let args: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    (!args.is_empty()).then_some(args)
}
