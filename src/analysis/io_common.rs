use std::path::Path;

/// A row of the decision matrix as read from a file.
#[derive(PartialEq, Debug, Clone)]
pub struct ParsedRow {
    pub id: String,
    pub values: Vec<f64>,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Identifies rows without an id column by file name and line number.
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}
