//! Output file writing.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// File written inside each job's output directory.
pub const OUTPUT_FILE: &str = "index.ts";

const HEADER: &str = "// This file is auto-generated by specgen";

/// The full file: header, then the rendered body.
pub fn file_contents(body: &str) -> String {
    if body.is_empty() {
        format!("{HEADER}\n")
    } else {
        format!("{HEADER}\n\n{body}\n")
    }
}

/// Write `contents` to `<output_dir>/index.ts` unless `dry_run`, returning
/// the target path either way.
pub fn write_output(output_dir: &Path, contents: &str, dry_run: bool) -> Result<PathBuf, String> {
    let path = output_dir.join(OUTPUT_FILE);
    if dry_run {
        debug!(path = %path.display(), "Dry run, not writing output.");
        return Ok(path);
    }

    fs::create_dir_all(output_dir).map_err(|err| {
        format!(
            "Failed to create output directory {}: {err}",
            output_dir.display()
        )
    })?;
    fs::write(&path, contents)
        .map_err(|err| format!("Failed to write {}: {err}", path.display()))?;

    debug!(
        path = %path.display(),
        len = contents.len(),
        "Generated output written."
    );
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_file_contents() {
        assert_eq!(file_contents(""), format!("{HEADER}\n"));
        assert_eq!(
            file_contents("export type A = string;"),
            format!("{HEADER}\n\nexport type A = string;\n")
        );
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("src").join("client");
        let path = write_output(&output, "x", false).unwrap();
        assert_eq!(path, output.join(OUTPUT_FILE));
        assert_eq!(fs::read_to_string(path).unwrap(), "x");
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out");
        let path = write_output(&output, "x", true).unwrap();
        assert!(!path.exists());
        assert!(!output.exists());
    }
}
