//! Reading and persisting the report document.

use super::ReportDocument;
use crate::error::{CopybenchError, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Read the report at `path` as UTF-8 text.
///
/// # Errors
///
/// Returns `ReportNotFound` if the file does not exist and
/// `ReportUnreadable` if it cannot be read as UTF-8.
pub fn read_document(path: &Path) -> Result<ReportDocument> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let document = ReportDocument::parse(&text);
            debug!(path = %path.display(), lines = document.line_count(), "Read report");
            Ok(document)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(CopybenchError::ReportNotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CopybenchError::ReportUnreadable {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Replace the report at `path` with `document`.
///
/// The text goes to a sibling temp file that is renamed over the original,
/// so a failed write leaves the previous report in place.
///
/// # Errors
///
/// Returns `ReportWrite` if the temp file cannot be written or renamed.
pub fn write_document(path: &Path, document: &ReportDocument) -> Result<()> {
    let temp_path = path.with_extension("html.tmp");
    let written = write_temp(&temp_path, document).and_then(|()| fs::rename(&temp_path, path));

    if let Err(source) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(CopybenchError::ReportWrite {
            path: path.to_path_buf(),
            source,
        });
    }

    debug!(path = %path.display(), "Wrote report");
    Ok(())
}

fn write_temp(temp_path: &Path, document: &ReportDocument) -> io::Result<()> {
    let file = File::create(temp_path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(document.render().as_bytes())?;
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_then_write_preserves_bytes() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("index.html");
        let text = "<html>\r\n<body>\n</body>\n</html>\n";
        fs::write(&path, text).expect("write fixture");

        let doc = read_document(&path).expect("read");
        write_document(&path, &doc).expect("write");

        assert_eq!(fs::read_to_string(&path).expect("reread"), text);
        assert!(!path.with_extension("html.tmp").exists());
    }

    #[test]
    fn missing_report_is_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let err = read_document(&dir.path().join("nope.html")).expect_err("missing");
        assert!(matches!(err, CopybenchError::ReportNotFound { .. }));
    }

    #[test]
    fn non_utf8_report_is_unreadable() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("index.html");
        fs::write(&path, [0xff, 0xfe, 0x00]).expect("write fixture");
        let err = read_document(&path).expect_err("invalid utf-8");
        assert!(matches!(err, CopybenchError::ReportUnreadable { .. }));
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("gone").join("index.html");
        let err = write_document(&path, &ReportDocument::parse("x")).expect_err("no dir");
        assert!(matches!(err, CopybenchError::ReportWrite { .. }));
    }
}
