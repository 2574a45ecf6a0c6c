use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

/// Default system prompt packaged with the image.
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("../assets/system_prompt.txt");

/// OpenAPI description of the GitHub compare service packaged with the image.
pub const COMPARE_SERVICE_SPEC: &str = include_str!("../assets/github_compare_spec.json");

/// Schema the resolved compare invocation is validated against.
pub const INVOCATION_SCHEMA: &str = include_str!("../assets/compare_invocation_schema.json");

/// Load the content of a single location: an http(s) URL is fetched, anything
/// else is treated as a file path.
pub fn load_text(location: &str) -> Result<String> {
    if location.starts_with("http://") || location.starts_with("https://") {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        let resp = client
            .get(location)
            .send()
            .with_context(|| format!("failed to fetch {location}"))?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "fetching {} returned HTTP {}",
                location,
                resp.status().as_u16()
            ));
        }

        return resp
            .text()
            .with_context(|| format!("failed to read body of {location}"));
    }

    std::fs::read_to_string(location).with_context(|| format!("failed to read {location}"))
}

/// Try each location in order and return the first one that loads.
///
/// The binary runs in different environments (locally, in docker, on the
/// actions runner) so assets are probed in more than one place.
pub fn load_first_available(locations: &[&str]) -> Result<String> {
    for location in locations {
        match load_text(location) {
            Ok(text) => return Ok(text),
            Err(err) => log::debug!("Failed to load from {location}: {err:#}"),
        }
    }

    Err(anyhow!(
        "failed to load from any of the locations: {locations:?}"
    ))
}

/// Resolve the generation system prompt.
///
/// The configured value may be a URL, a file path, or the prompt text itself;
/// with nothing configured the packaged default is used.
pub fn resolve_system_prompt(configured: Option<&str>) -> Result<String> {
    let Some(value) = configured.filter(|v| !v.trim().is_empty()) else {
        return Ok(DEFAULT_SYSTEM_PROMPT.to_string());
    };

    if value.starts_with("http://") || value.starts_with("https://") || Path::new(value).exists() {
        return load_text(value);
    }

    Ok(value.to_string())
}

/// Resolve the OpenAPI compare-service description.
pub fn resolve_service_spec(configured: Option<&str>) -> Result<String> {
    match configured {
        Some(location) => load_text(location),
        None => Ok(load_first_available(&[
            "github_compare_spec.json",
            "/app/assets/github_compare_spec.json",
        ])
        .unwrap_or_else(|_| COMPARE_SERVICE_SPEC.to_string())),
    }
}

/// Resolve the invocation validation schema.
pub fn resolve_validation_schema(configured: Option<&str>) -> Result<String> {
    match configured {
        Some(location) => load_text(location),
        None => Ok(load_first_available(&[
            "compare_invocation_schema.json",
            "/app/assets/compare_invocation_schema.json",
        ])
        .unwrap_or_else(|_| INVOCATION_SCHEMA.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn packaged_assets_are_nonempty_and_parse() {
        assert!(!DEFAULT_SYSTEM_PROMPT.trim().is_empty());
        serde_json::from_str::<serde_json::Value>(COMPARE_SERVICE_SPEC).unwrap();
        serde_json::from_str::<serde_json::Value>(INVOCATION_SCHEMA).unwrap();
    }

    #[test]
    fn inline_system_prompt_is_used_verbatim() {
        let text = resolve_system_prompt(Some("You write PR descriptions.")).unwrap();
        assert_eq!(text, "You write PR descriptions.");
    }

    #[test]
    fn empty_system_prompt_falls_back_to_default() {
        let text = resolve_system_prompt(None).unwrap();
        assert_eq!(text, DEFAULT_SYSTEM_PROMPT);

        let text = resolve_system_prompt(Some("  ")).unwrap();
        assert_eq!(text, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn system_prompt_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "prompt from disk").unwrap();

        let text = resolve_system_prompt(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(text, "prompt from disk");
    }

    #[test]
    fn load_first_available_skips_missing_locations() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "found").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let text = load_first_available(&["/nonexistent/asset.json", path.as_str()]).unwrap();
        assert_eq!(text, "found");
    }

    #[test]
    fn load_first_available_reports_total_failure() {
        let err = load_first_available(&["/nonexistent/a", "/nonexistent/b"]).unwrap_err();
        assert!(err.to_string().contains("any of the locations"));
    }
}
