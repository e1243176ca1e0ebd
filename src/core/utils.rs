/// Names of common noise entries generated by operating systems and archivers.
pub const SYSTEM_NAME_IGNORE_LIST: &[&str] = &[
    // macOS
    "__MACOSX",
    ".DS_Store",
    // Windows
    "Thumbs.db",
];

/// Returns `true` if `entry` contains any of `ignored` (ASCII case-insensitive).
pub fn is_ignored_name<S: AsRef<str>>(entry: &str, ignored: &[S]) -> bool {
    let entry = entry.to_ascii_lowercase();
    ignored
        .iter()
        .any(|name| entry.contains(&name.as_ref().to_ascii_lowercase()))
}

/// Removes noise entries (see [`SYSTEM_NAME_IGNORE_LIST`]) from `entries`, preserving order.
pub fn exclude_system_names<I>(entries: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = String>,
{
    exclude_names(entries, SYSTEM_NAME_IGNORE_LIST)
}

/// Removes every entry matching one of `ignored`, preserving order.
pub fn exclude_names<I, S>(entries: I, ignored: &[S]) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = String>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .filter(move |entry| !is_ignored_name(entry, ignored))
}

/// Normalizes an asset path: `\` becomes `/`, empty and `.` segments are dropped, `..` removes
/// the previous segment. Returns `None` if `..` would climb above the top level.
pub fn normalize(path: &str) -> Option<String> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            _ => segments.push(segment),
        }
    }
    Some(segments.join("/"))
}
