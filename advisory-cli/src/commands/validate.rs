//! `advisory validate` command handler

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use advisory_schema::{
    DocumentLoader, LoadedDocument, SchemaConfig, SchemaError, SchemaVersionGate, ValidationError,
};

use crate::cli::ValidateArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `validate` command.
///
/// Every path is checked; a bad document never stops the rest. Loading runs on
/// the blocking pool since the loader uses synchronous file I/O.
///
/// # Errors
///
/// Returns `CliError::InvalidDocuments` when at least one document failed to
/// load or validate.
pub async fn execute(
    args: ValidateArgs,
    config: SchemaConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(paths = args.paths.len(), "validating advisory documents");

    let report = tokio::task::spawn_blocking(move || {
        let loader = DocumentLoader::new(config);
        build_report(&loader, &args.paths)
    })
    .await
    .map_err(|e| CliError::Command(format!("validation task failed: {e}")))?;

    writer.render(&report)?;

    if report.invalid > 0 {
        return Err(CliError::InvalidDocuments(report.invalid));
    }
    Ok(())
}

fn build_report(loader: &DocumentLoader, paths: &[PathBuf]) -> ValidationReport {
    let gate = loader.config().gate();
    let mut documents = Vec::new();

    for path in paths {
        if path.is_dir() {
            match loader.load_dir(path) {
                Ok(results) => {
                    if results.is_empty() {
                        warn!(dir = %path.display(), "no advisory documents found");
                    }
                    documents.extend(
                        results
                            .into_iter()
                            .map(|(file, result)| check(&file, result, &gate)),
                    );
                }
                Err(e) => documents.push(DocumentReport::failed(path, &e)),
            }
        } else {
            documents.push(check(path, loader.load_file(path), &gate));
        }
    }

    ValidationReport::new(documents)
}

fn check(
    path: &Path,
    loaded: Result<LoadedDocument, SchemaError>,
    gate: &SchemaVersionGate,
) -> DocumentReport {
    let loaded = match loaded {
        Ok(loaded) => loaded,
        Err(e) => return DocumentReport::failed(path, &e),
    };

    let document = &loaded.document;
    let errors = match document.validate_with(gate) {
        Ok(()) => Vec::new(),
        Err(e) => error_lines(&e),
    };

    DocumentReport {
        path: path.display().to_string(),
        package: Some(document.name().to_owned()),
        schema_version: Some(document.schema_version.clone()),
        advisories: document.advisories.len(),
        valid: errors.is_empty(),
        errors,
    }
}

/// Flatten an error tree into one line per violation, prefixed with its labels.
///
/// `openssl: advisories: CVE-2023-5678: fixed: fixed version cannot be empty`
pub fn error_lines(err: &ValidationError) -> Vec<String> {
    let mut lines = Vec::new();
    collect_lines(err, &mut Vec::new(), &mut lines);
    lines
}

fn collect_lines<'a>(err: &'a ValidationError, scope: &mut Vec<&'a str>, out: &mut Vec<String>) {
    match err {
        ValidationError::Labeled { label, source } => {
            scope.push(label);
            collect_lines(source, scope, out);
            scope.pop();
        }
        ValidationError::Joined(errs) => {
            for e in errs {
                collect_lines(e, scope, out);
            }
        }
        leaf => {
            let mut line = String::new();
            for label in scope.iter() {
                line.push_str(label);
                line.push_str(": ");
            }
            line.push_str(&leaf.to_string());
            out.push(line);
        }
    }
}

/// Result of validating a set of documents.
#[derive(Serialize)]
pub struct ValidationReport {
    pub documents: Vec<DocumentReport>,
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
}

impl ValidationReport {
    fn new(documents: Vec<DocumentReport>) -> Self {
        let valid = documents.iter().filter(|d| d.valid).count();
        Self {
            total: documents.len(),
            invalid: documents.len() - valid,
            valid,
            documents,
        }
    }
}

/// Validation outcome for one document file.
#[derive(Serialize)]
pub struct DocumentReport {
    pub path: String,
    /// Package name; absent when the file could not be decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub advisories: usize,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl DocumentReport {
    fn failed(path: &Path, err: &SchemaError) -> Self {
        Self {
            path: path.display().to_string(),
            package: None,
            schema_version: None,
            advisories: 0,
            valid: false,
            errors: vec![err.to_string()],
        }
    }
}

impl Render for ValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for doc in &self.documents {
            let status = if doc.valid {
                "VALID".green().bold()
            } else {
                "INVALID".red().bold()
            };
            match &doc.package {
                Some(package) => writeln!(
                    w,
                    "{} {} ({}, {} advisories)",
                    status,
                    doc.path.bold(),
                    package,
                    doc.advisories
                )?,
                None => writeln!(w, "{} {}", status, doc.path.bold())?,
            }
            for err in &doc.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        writeln!(w)?;
        writeln!(
            w,
            "Summary: {} documents, {} valid, {} invalid",
            self.total, self.valid, self.invalid
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisory_schema::error::{join, label};

    const VALID_DOC: &str = "schema-version: 2.0.2\npackage:\n  name: zlib\nadvisories:\n  - id: CVE-2022-37434\n    events:\n      - timestamp: 2022-08-05T00:00:00Z\n        type: fixed\n        data:\n          fixed-version: 1.2.12-r2\n";

    const INVALID_DOC: &str = "schema-version: 2.0.2\npackage:\n  name: curl\nadvisories:\n  - id: CVE-2023-38545\n    events:\n      - timestamp: 2023-10-11T00:00:00Z\n        type: fixed\n        data:\n          fixed-version: \"\"\n";

    #[test]
    fn test_error_lines_prefix_labels() {
        let err = label(
            "curl",
            join([
                Err(ValidationError::EmptyField("package name")),
                label("CVE-1", Err(ValidationError::NoEvents)),
            ]),
        )
        .unwrap_err();

        let lines = error_lines(&err);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "curl: package name must not be empty");
        assert!(lines[1].starts_with("curl: CVE-1: "), "got {}", lines[1]);
    }

    #[test]
    fn test_error_lines_unlabeled_leaf() {
        let lines = error_lines(&ValidationError::NoAdvisories);
        assert_eq!(lines, vec![ValidationError::NoAdvisories.to_string()]);
    }

    #[test]
    fn test_build_report_mixed_results() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("zlib.yaml"), VALID_DOC).expect("write");
        std::fs::write(dir.path().join("curl.yaml"), INVALID_DOC).expect("write");
        std::fs::write(dir.path().join("broken.yaml"), "package: [").expect("write");

        let loader = DocumentLoader::new(SchemaConfig::default());
        let report = build_report(&loader, &[dir.path().to_path_buf()]);

        assert_eq!(report.total, 3);
        assert_eq!(report.valid, 1);
        assert_eq!(report.invalid, 2);

        // discover() sorts: broken, curl, zlib
        let broken = &report.documents[0];
        assert!(broken.package.is_none());
        assert_eq!(broken.errors.len(), 1);

        let curl = &report.documents[1];
        assert_eq!(curl.package.as_deref(), Some("curl"));
        assert!(!curl.valid);
        assert!(curl.errors[0].contains("fixed version cannot be empty"));

        assert!(report.documents[2].valid);
    }

    #[test]
    fn test_build_report_missing_file() {
        let loader = DocumentLoader::new(SchemaConfig::default());
        let report = build_report(&loader, &[PathBuf::from("/nonexistent/doc.yaml")]);
        assert_eq!(report.invalid, 1);
        assert!(!report.documents[0].valid);
    }

    #[test]
    fn test_render_text() {
        let report = ValidationReport::new(vec![
            DocumentReport {
                path: "zlib.yaml".to_owned(),
                package: Some("zlib".to_owned()),
                schema_version: Some("2.0.2".to_owned()),
                advisories: 1,
                valid: true,
                errors: Vec::new(),
            },
            DocumentReport {
                path: "bad.yaml".to_owned(),
                package: None,
                schema_version: None,
                advisories: 0,
                valid: false,
                errors: vec!["decode failed".to_owned()],
            },
        ]);

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        let output = String::from_utf8(buffer).expect("valid UTF-8");

        assert!(output.contains("VALID"));
        assert!(output.contains("INVALID"));
        assert!(output.contains("zlib.yaml"));
        assert!(output.contains("decode failed"));
        assert!(output.contains("2 documents, 1 valid, 1 invalid"));
    }

    #[test]
    fn test_report_json_skips_unknown_package() {
        let report = DocumentReport::failed(
            Path::new("bad.yaml"),
            &SchemaError::Decode {
                origin: "bad.yaml".to_owned(),
                reason: "unexpected end".to_owned(),
            },
        );
        let json = serde_json::to_value(&report).expect("serialize");
        assert!(json.get("package").is_none());
        assert_eq!(json["valid"], false);
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(1));
    }
}
