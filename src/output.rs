use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Print the generated text and register it as a workflow output.
///
/// Stdout carries the text itself (the docker-experiment path); the
/// GITHUB_OUTPUT file is only written when the runner provides one.
pub fn emit(key: &str, value: &str) -> Result<()> {
    println!("{value}");
    register(key, value)
}

/// Register a value as a workflow output without printing it.
pub fn register(key: &str, value: &str) -> Result<()> {
    if let Ok(path) = std::env::var("GITHUB_OUTPUT") {
        write_github_output(Path::new(&path), key, value)?;
    } else {
        log::debug!("GITHUB_OUTPUT is not set; skipping output registration");
    }

    Ok(())
}

/// Append `key<<DELIM / value / DELIM` to the output file.
///
/// Multiline values need the heredoc form; the delimiter is grown until it
/// cannot occur inside the value.
pub fn write_github_output(path: &Path, key: &str, value: &str) -> Result<()> {
    let delimiter = delimiter_for(value);

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {path:?} for appending"))?;

    write!(file, "{key}<<{delimiter}\n{value}\n{delimiter}\n")
        .with_context(|| format!("failed to write output {key:?} to {path:?}"))?;

    Ok(())
}

fn delimiter_for(value: &str) -> String {
    let mut delimiter = String::from("EOF");
    while value.contains(&delimiter) {
        delimiter.push('_');
    }
    delimiter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_framed_as_a_heredoc() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_github_output(file.path(), "pr-text", "Title\n\nBody line").unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(written, "pr-text<<EOF\nTitle\n\nBody line\nEOF\n");
    }

    #[test]
    fn writes_append_rather_than_truncate() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_github_output(file.path(), "pr-text", "first").unwrap();
        write_github_output(file.path(), "pr-text-stats", "second").unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        assert!(written.contains("pr-text<<"));
        assert!(written.contains("pr-text-stats<<"));
    }

    #[test]
    fn delimiter_grows_past_colliding_values() {
        assert_eq!(delimiter_for("plain text"), "EOF");
        assert_eq!(delimiter_for("contains EOF marker"), "EOF_");
        assert_eq!(delimiter_for("EOF and EOF_ both"), "EOF__");
    }
}
