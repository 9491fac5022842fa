use crate::error::{ClientError, Result};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// 存储中的固定键名
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// 会话令牌的唯一来源，注入到所有发起网络请求的组件中
///
/// 实现不得在存储之外另做缓存：每次读取都要访问存储本身，
/// 这样多个视图（或多个进程）看到的始终是同一份令牌。
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()>;
    fn remove_many(&self, keys: &[&str]) -> Result<()>;

    fn get_access_token(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn get_refresh_token(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }

    /// 同时覆盖两个令牌（登录、注册）
    fn set_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        self.set_many(&[(ACCESS_TOKEN_KEY, access), (REFRESH_TOKEN_KEY, refresh)])
    }

    /// 刷新后只替换访问令牌
    fn set_access_token(&self, access: &str) -> Result<()> {
        self.set_many(&[(ACCESS_TOKEN_KEY, access)])
    }

    fn clear(&self) -> Result<()> {
        self.remove_many(&[ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY])
    }

    fn is_authenticated(&self) -> bool {
        self.get_access_token().is_some()
    }
}

pub type SharedSessionStore = Arc<dyn SessionStore>;

/// 以 JSON 文件持久化的会话存储
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    // 只串行化本进程内的写操作
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<HashMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(HashMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // 先写临时文件再重命名，避免读到写了一半的文件
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn modify<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut HashMap<String, String>),
    {
        let _guard = self.write_lock.lock();
        let mut entries = self.read_entries()?;
        f(&mut entries);
        self.write_entries(&entries)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_entries() {
            Ok(mut entries) => entries.remove(key),
            Err(e) => {
                warn!("Failed to read session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        debug!("Writing {} session entries", entries.len());
        self.modify(|stored| {
            for (key, value) in entries {
                stored.insert(key.to_string(), value.to_string());
            }
        })
        .map_err(|e| ClientError::Storage(format!("Failed to write session: {}", e)))
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.modify(|stored| {
            for key in keys {
                stored.remove(*key);
            }
        })
        .map_err(|e| ClientError::Storage(format!("Failed to clear session: {}", e)))
    }
}

/// 仅存在于内存中的会话存储（测试、一次性会话）
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(access: &str, refresh: &str) -> Self {
        let store = Self::new();
        {
            let mut entries = store.entries.write();
            entries.insert(ACCESS_TOKEN_KEY.to_string(), access.to_string());
            entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
        }
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut stored = self.entries.write();
        for (key, value) in entries {
            stored.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        let mut stored = self.entries.write();
        for key in keys {
            stored.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &dyn SessionStore) {
        assert!(store.get_access_token().is_none());
        assert!(!store.is_authenticated());

        store.set_tokens("access-1", "refresh-1").unwrap();
        assert_eq!(store.get_access_token().as_deref(), Some("access-1"));
        assert_eq!(store.get_refresh_token().as_deref(), Some("refresh-1"));

        store.set_access_token("access-2").unwrap();
        assert_eq!(store.get_access_token().as_deref(), Some("access-2"));
        assert_eq!(store.get_refresh_token().as_deref(), Some("refresh-1"));

        store.clear().unwrap();
        assert!(store.get_access_token().is_none());
        assert!(store.get_refresh_token().is_none());
    }

    #[test]
    fn test_memory_store_roundtrip() {
        exercise(&MemorySessionStore::new());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&FileSessionStore::new(dir.path().join("nested/session.json")));
    }

    #[test]
    fn test_file_store_reads_through_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let first = FileSessionStore::new(&path);
        let second = FileSessionStore::new(&path);

        first.set_tokens("a", "r").unwrap();
        assert_eq!(second.get_access_token().as_deref(), Some("a"));

        second.clear().unwrap();
        assert!(first.get_access_token().is_none());
    }

    #[test]
    fn test_file_store_uses_fixed_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileSessionStore::new(&path).set_tokens("a", "r").unwrap();

        let raw: HashMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("access_token").map(String::as_str), Some("a"));
        assert_eq!(raw.get("refresh_token").map(String::as_str), Some("r"));
    }

    #[test]
    fn test_corrupt_file_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(FileSessionStore::new(&path).get_access_token().is_none());
    }
}
