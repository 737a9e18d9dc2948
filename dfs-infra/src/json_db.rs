use crate::document::{self, Document};
use bon::Builder;
use dfs_domain::error::DomainResult;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Builder, Debug, Clone)]
pub struct JsonStoreOptions {
    #[builder(into)]
    pub path: PathBuf,
    /// 每次 `set` 后立即提交
    #[builder(default = false)]
    pub auto_commit: bool,
}

// 暂存的写操作
#[derive(Debug)]
enum Staged {
    Set { key: String, value: Value },
}

/// JSON 键值存储
///
/// 打开时读入整个文件（不存在视为空）；`set` 只写入暂存区，`commit` 按
/// 暂存顺序应用后整体改写文件，`rollback` 丢弃暂存区。`get` 只能看到已提交的值。
///
/// 同一个键暂存多次时，按入队顺序应用，提交后保留最后一次 `set` 的值。
/// 写盘失败时已提交的值保持不变，暂存区清空。
#[derive(Debug)]
pub struct JsonDatabase {
    path: PathBuf,
    auto_commit: bool,
    objects: Document,
    staging: Vec<Staged>,
}

impl JsonDatabase {
    pub fn open(options: JsonStoreOptions) -> DomainResult<Self> {
        let objects = document::read(&options.path)?;
        tracing::debug!(
            path = %options.path.display(),
            keys = objects.len(),
            "json store opened"
        );
        Ok(Self {
            path: options.path,
            auto_commit: options.auto_commit,
            objects,
            staging: Vec::new(),
        })
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> DomainResult<()> {
        self.staging.push(Staged::Set {
            key: key.into(),
            value: value.into(),
        });
        if self.auto_commit {
            self.commit()?;
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.objects.get(key)
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.objects.get(key).unwrap_or(default)
    }

    /// 读取并反序列化为指定类型；键不存在时为 `None`
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> DomainResult<Option<T>> {
        match self.objects.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    pub fn commit(&mut self) -> DomainResult<()> {
        let staged = self.staging.len();
        let mut next = self.objects.clone();
        for op in self.staging.drain(..) {
            match op {
                Staged::Set { key, value } => {
                    next.insert(key, value);
                }
            }
        }
        document::write(&self.path, &next)?;
        self.objects = next;
        tracing::debug!(path = %self.path.display(), staged, "json store committed");
        Ok(())
    }

    pub fn rollback(&mut self) {
        tracing::debug!(staged = self.staging.len(), "json store rolled back");
        self.staging.clear();
    }

    pub fn set_auto_commit(&mut self, auto_commit: bool) {
        self.auto_commit = auto_commit;
    }

    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// 尚未提交的操作数
    pub fn staged(&self) -> usize {
        self.staging.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(dir: &tempfile::TempDir) -> JsonStoreOptions {
        JsonStoreOptions::builder()
            .path(dir.path().join("db.json"))
            .build()
    }

    #[test]
    fn options_default_to_manual_commit() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!options(&dir).auto_commit);
    }

    #[test]
    fn staged_sets_apply_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = JsonDatabase::open(options(&dir)).unwrap();

        db.set("k", 1).unwrap();
        db.set("k", 2).unwrap();
        assert_eq!(db.staged(), 2);
        assert_eq!(db.get("k"), None);

        db.commit().unwrap();
        assert_eq!(db.staged(), 0);
        assert_eq!(db.get("k"), Some(&json!(2)));
    }

    #[test]
    fn failed_write_keeps_committed_values() {
        let dir = tempfile::tempdir().unwrap();
        let options = JsonStoreOptions::builder()
            .path(dir.path().join("missing").join("db.json"))
            .build();
        let mut db = JsonDatabase::open(options).unwrap();

        db.set("k", 1).unwrap();
        assert!(db.commit().is_err());
        assert_eq!(db.staged(), 0);
        assert_eq!(db.get("k"), None);
    }

    #[test]
    fn get_or_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let db = JsonDatabase::open(options(&dir)).unwrap();
        let fallback = json!([]);
        assert_eq!(db.get_or("entity", &fallback), &fallback);
    }

    #[test]
    fn get_as_deserializes_typed_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = JsonDatabase::open(options(&dir)).unwrap();
        db.set("ids", json!(["a", "b"])).unwrap();
        db.commit().unwrap();

        let ids: Option<Vec<String>> = db.get_as("ids").unwrap();
        assert_eq!(ids, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(db.get_as::<Vec<String>>("missing").unwrap(), None);
        assert!(db.get_as::<u32>("ids").is_err());
    }

    #[test]
    fn switching_to_auto_commit_applies_later_sets_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = JsonDatabase::open(options(&dir)).unwrap();
        db.set_auto_commit(true);
        assert!(db.auto_commit());

        db.set("k", "v").unwrap();
        assert_eq!(db.get("k"), Some(&json!("v")));
    }
}
