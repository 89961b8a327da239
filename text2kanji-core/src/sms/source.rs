//! Message sources
//!
//! A [`MessageSource`] is read-only: it reports the rows currently in the
//! inbox and nothing else.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::SmsRow;
use crate::{Result, Text2KanjiError};

/// Queryable provider of inbox rows
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Read every row currently in the inbox
    async fn query(&self) -> Result<Vec<SmsRow>>;
}

/// Inbox backed by a JSON export of the telephony provider
///
/// The file holds an array of `{address, body, date}` objects.
#[derive(Debug, Clone)]
pub struct JsonInboxSource {
    path: PathBuf,
}

impl JsonInboxSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_rows(path: &Path) -> Result<Vec<SmsRow>> {
        let contents = std::fs::read(path).map_err(|e| read_error(path, e))?;
        let rows: Vec<SmsRow> = serde_json::from_slice(&contents)?;
        Ok(rows)
    }
}

/// Map a failed inbox read; an OS permission denial means SMS access was refused
fn read_error(path: &Path, e: std::io::Error) -> Text2KanjiError {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => {
            Text2KanjiError::PermissionDenied(path.display().to_string())
        }
        _ => Text2KanjiError::Io(e),
    }
}

#[async_trait]
impl MessageSource for JsonInboxSource {
    async fn query(&self) -> Result<Vec<SmsRow>> {
        let path = self.path.clone();
        let rows = tokio::task::spawn_blocking(move || Self::read_rows(&path))
            .await
            .map_err(|e| Text2KanjiError::Source(format!("inbox read task failed: {}", e)))??;

        debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

/// In-memory inbox
///
/// Rows can be replaced or appended while readers hold the source.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Arc<RwLock<Vec<SmsRow>>>,
}

impl MemorySource {
    pub fn new(rows: Vec<SmsRow>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    /// Insert a newly received message at the head of the inbox
    pub async fn receive(&self, row: SmsRow) {
        self.rows.write().await.insert(0, row);
    }

    pub async fn replace(&self, rows: Vec<SmsRow>) {
        *self.rows.write().await = rows;
    }
}

#[async_trait]
impl MessageSource for MemorySource {
    async fn query(&self) -> Result<Vec<SmsRow>> {
        Ok(self.rows.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_json_source_reads_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"address":"+63917","body":"Salamat","date":1690185600000}}]"#
        )
        .unwrap();

        let source = JsonInboxSource::new(file.path());
        let rows = source.query().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].body.as_deref(), Some("Salamat"));
        assert_eq!(rows[0].date, 1690185600000);
    }

    #[tokio::test]
    async fn test_json_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonInboxSource::new(dir.path().join("absent.json"));

        let err = source.query().await.unwrap_err();
        assert!(matches!(err, Text2KanjiError::Io(_)));
    }

    #[test]
    fn test_permission_denied_read_error() {
        let path = Path::new("/data/sms/inbox.json");
        let err = read_error(
            path,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );

        match &err {
            Text2KanjiError::PermissionDenied(p) => assert_eq!(p, "/data/sms/inbox.json"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.user_message(), crate::PERMISSION_DENIED_MESSAGE);
    }

    #[test]
    fn test_other_read_errors_stay_io() {
        let err = read_error(
            Path::new("inbox.json"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(matches!(&err, Text2KanjiError::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_json_source_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let source = JsonInboxSource::new(file.path());
        assert!(matches!(
            source.query().await.unwrap_err(),
            Text2KanjiError::Json(_)
        ));
    }

    #[tokio::test]
    async fn test_memory_source_receive_prepends() {
        let source = MemorySource::new(vec![SmsRow::new("1", "old", 1)]);
        source.receive(SmsRow::new("1", "new", 2)).await;

        let rows = source.query().await.unwrap();
        assert_eq!(rows[0].body.as_deref(), Some("new"));
        assert_eq!(rows[1].body.as_deref(), Some("old"));
    }
}
