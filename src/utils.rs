// src/utils.rs
/// Collapse every whitespace run to a single space and trim the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a company name for file system usage
pub fn normalize_file_component(name: &str) -> String {
    let normalized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if normalized.is_empty() {
        "unknown".to_string()
    } else {
        normalized
    }
}

/// Suggested download name, e.g. `job-analysis-acme_corp-1718000000000.json`
pub fn export_file_name(company: &str, millis: i64, extension: &str) -> String {
    format!(
        "job-analysis-{}-{}.{}",
        normalize_file_component(company),
        millis,
        extension
    )
}

/// First `max_chars` characters followed by "..." regardless of length.
pub fn preview(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Senior \n\t Rust   Engineer "), "Senior Rust Engineer");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn test_normalize_file_component() {
        assert_eq!(normalize_file_component("Acme Corp"), "acme_corp");
        assert_eq!(normalize_file_component("jean-paul"), "jean-paul");
        assert_eq!(normalize_file_component("Marie@Company"), "marie_company");
        assert_eq!(normalize_file_component("  "), "unknown");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("Ferris Labs", 1718000000000, "csv"),
            "job-analysis-ferris_labs-1718000000000.csv"
        );
    }

    #[test]
    fn test_preview_always_appends_ellipsis() {
        assert_eq!(preview("short", 200), "short...");
        assert_eq!(preview("abcdef", 2), "ab...");
        assert_eq!(preview("héllo wörld", 4), "héll...");
    }
}
