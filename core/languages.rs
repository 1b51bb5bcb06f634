// Maps file extensions (lowercase, no dot) to markdown code fence tags.
pub fn fence_language_for_extension(extension: &str) -> &'static str {
    match extension {
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "py" => "python",
        "rs" => "rust",
        "rb" => "ruby",
        "java" => "java",
        "c" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "h" => "cpp",
        "cs" => "csharp",
        "php" => "php",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "html" | "htm" => "html",
        "css" => "css",
        "sh" | "bash" => "bash",
        "sql" => "sql",
        "md" => "markdown",
        _ => "",
    }
}

/// Extension of the last path segment, lowercased and without the dot.
/// Returns an empty string when there is none.
pub fn file_extension(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => name[dot + 1..].to_lowercase(),
        _ => String::new(),
    }
}

pub fn fence_language_for_path(path: &str) -> &'static str {
    fence_language_for_extension(&file_extension(path))
}
