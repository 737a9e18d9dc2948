use dfs_domain::error::{DomainError, DomainResult};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// 整文件 JSON 文档：顶层必须是对象
pub(crate) type Document = Map<String, Value>;

/// 读取文档；文件不存在视为空文档
pub(crate) fn read(path: &Path) -> DomainResult<Document> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Document::new()),
        Err(err) => return Err(err.into()),
    };
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Object(document) => Ok(document),
        other => Err(DomainError::CorruptedStore {
            reason: format!(
                "{}: expected a JSON object at the top level, found {}",
                path.display(),
                kind_of(&other)
            ),
        }),
    }
}

/// 用给定文档整体覆盖文件
pub(crate) fn write(path: &Path, document: &Document) -> DomainResult<()> {
    let bytes = serde_json::to_vec(document)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let document = read(&dir.path().join("absent.json")).unwrap();
        assert!(document.is_empty());
    }

    #[test]
    fn non_object_document_is_corrupted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "[1, 2]").unwrap();

        let err = read(&path).unwrap_err();
        assert!(matches!(err, DomainError::CorruptedStore { .. }));
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let mut document = Document::new();
        document.insert("k".into(), json!({"a": [1, 2]}));

        write(&path, &document).unwrap();
        assert_eq!(read(&path).unwrap(), document);
    }

    #[test]
    fn invalid_json_is_a_serde_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(read(&path), Err(DomainError::Serde { .. })));
    }
}
