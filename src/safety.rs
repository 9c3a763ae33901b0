//! Safety checks before writing a transfer report.
//!
//! Prevents the report from overwriting the items file it was built from.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that a report path is safe to write.
///
/// Checks:
/// - Report must be a `.json` file
/// - Report cannot be the same as any of the input files
pub fn validate_report_path(report: &Path, inputs: &[&Path]) -> Result<()> {
    let is_json = report
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        bail!(
            "Safety check failed: report file '{}' must have a .json extension",
            report.display()
        );
    }

    for input in inputs {
        let same = match (report.canonicalize(), input.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => report == *input,
        };
        if same {
            bail!(
                "Safety check failed: report '{}' cannot be the same as input '{}'",
                report.display(),
                input.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_report() {
        let report = PathBuf::from("/tmp/transfer-report.json");
        let items = PathBuf::from("/data/items.json");
        assert!(validate_report_path(&report, &[&items]).is_ok());
        assert!(validate_report_path(&report, &[]).is_ok());
    }

    #[test]
    fn test_wrong_extension() {
        let report = PathBuf::from("/tmp/report.txt");
        let result = validate_report_path(&report, &[]);
        assert!(result.unwrap_err().to_string().contains(".json extension"));
    }

    #[test]
    fn test_report_equals_input() {
        let path = PathBuf::from("/data/items.json");
        let result = validate_report_path(&path, &[&path]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot be the same as input"));
    }
}
