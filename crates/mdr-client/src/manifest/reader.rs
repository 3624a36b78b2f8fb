//! Registration manifest reader
//!
//! Parses tab-separated manifests of the form:
//!
//! ```text
//! repository_id	project_code	file_name	md5	access
//! bb44b6d8-...	PACA-CA	sample.bam	0f5ba...	controlled
//! ```
//!
//! The first non-blank line is a header and is skipped. Blank lines are
//! skipped. Every data line must have exactly 5 tab-separated fields.
//!
//! Manifests are read from a local file or fetched from an HTTP(S) URL;
//! both sources feed the same parser.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::api::DEFAULT_API_TIMEOUT_SECS;
use crate::error::{ClientError, Result};
use crate::manifest::ManifestEntry;

/// Number of tab-separated columns in a registration manifest.
const MANIFEST_COLUMNS: usize = 5;

/// Read a registration manifest from a local file, preserving entry order.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let content = fs::read_to_string(path)?;
    parse_manifest(&content)
}

/// Fetch a registration manifest over HTTP(S) and parse it.
///
/// Non-2xx responses and network failures surface as `ClientError::Http`.
pub async fn read_manifest_from_url(url: &str) -> Result<Vec<ManifestEntry>> {
    let content = reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_API_TIMEOUT_SECS))
        .build()?
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    parse_manifest(&content)
}

fn parse_manifest(content: &str) -> Result<Vec<ManifestEntry>> {
    let mut entries = Vec::new();
    let mut header_seen = false;

    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        if !header_seen {
            header_seen = true;
            continue;
        }

        entries.push(parse_line(index + 1, line)?);
    }

    Ok(entries)
}

fn parse_line(line_number: usize, line: &str) -> Result<ManifestEntry> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

    if fields.len() != MANIFEST_COLUMNS {
        return Err(ClientError::malformed_manifest(
            line_number,
            format!("found {} columns", fields.len()),
        ));
    }

    let access = fields[4];

    Ok(ManifestEntry {
        repository_id: fields[0].to_string(),
        project_code: fields[1].to_string(),
        file_name: fields[2].to_string(),
        md5: fields[3].to_string(),
        access: (!access.is_empty()).then(|| access.to_string()),
        object_id: None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const HEADER: &str = "repository_id\tproject_code\tfile_name\tmd5\taccess";

    fn manifest_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn test_reads_entries_in_order() {
        let file = manifest_file(&[
            HEADER,
            "repo-1\tPACA-CA\tb.bam\taaa\tcontrolled",
            "repo-1\tPACA-CA\ta.bam\tbbb\topen",
        ]);

        let entries = read_manifest(file.path()).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file_name, "b.bam");
        assert_eq!(entries[1].file_name, "a.bam");
        assert_eq!(entries[0].access.as_deref(), Some("controlled"));
        assert!(entries.iter().all(|e| e.object_id.is_none()));
    }

    #[test]
    fn test_skips_blank_lines_and_trims_fields() {
        let file = manifest_file(&[
            HEADER,
            "",
            " repo-1 \t PACA-CA \t sample.bam \t abc \t ",
            "",
        ]);

        let entries = read_manifest(file.path()).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].repository_id, "repo-1");
        assert_eq!(entries[0].file_name, "sample.bam");
        assert_eq!(entries[0].access, None);
    }

    #[test]
    fn test_rejects_wrong_column_count() {
        for bad_line in [
            "repo-1\tPACA-CA\tsample.bam\tabc",
            "repo-1\tPACA-CA\tsample.bam\tabc\topen\textra",
        ] {
            let file = manifest_file(&[HEADER, bad_line]);
            let result = read_manifest(file.path());
            assert!(
                matches!(result, Err(ClientError::MalformedManifest { line: 2, .. })),
                "line should be rejected: {}",
                bad_line
            );
        }
    }

    #[test]
    fn test_column_error_names_columns_in_manifest_order() {
        let file = manifest_file(&[HEADER, "repo-1\tPACA-CA\tsample.bam\tabc"]);
        let message = read_manifest(file.path()).unwrap_err().to_string();
        assert!(
            message.contains("repository_id, project_code, file_name, md5, access"),
            "unexpected message: {}",
            message
        );
    }

    #[tokio::test]
    async fn test_fetches_manifest_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/manifests/run-42.tsv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "{}\nrepo-1\tPACA-CA\tsample.bam\tabc\tcontrolled\n",
                HEADER
            )))
            .mount(&server)
            .await;

        let url = format!("{}/manifests/run-42.tsv", server.uri());
        let entries = read_manifest_from_url(&url).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].repository_id, "repo-1");
        assert_eq!(entries[0].file_name, "sample.bam");
    }

    #[tokio::test]
    async fn test_url_fetch_surfaces_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = read_manifest_from_url(&format!("{}/missing.tsv", server.uri())).await;
        assert!(matches!(result, Err(ClientError::Http(_))));
    }

    #[test]
    fn test_header_only_manifest_is_empty() {
        let file = manifest_file(&[HEADER]);
        assert!(read_manifest(file.path()).unwrap().is_empty());
    }
}
