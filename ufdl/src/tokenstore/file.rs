use super::{default_tokens_file, ensure_storable, TokenStorage};
use crate::auth::Tokens;
use crate::errors::TokenStoreError;
use crate::types::{ServerUrl, Username};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::sync::{Mutex, PoisonError};

/// Contents of the token file: server URL → username → `[access, refresh]`.
type TokenFile = BTreeMap<String, BTreeMap<String, Tokens>>;

/// Keeps tokens in a JSON file, by default `<config dir>/.config/ufdl/tokens.json`.
#[derive(Debug)]
pub struct FileTokenStorage {
    path: Utf8PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Token storage at [default_tokens_file].
    pub fn default_location() -> Result<Self, TokenStoreError> {
        default_tokens_file()
            .map(Self::new)
            .ok_or(TokenStoreError::NoConfigDir)
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn read(&self) -> Result<TokenFile, TokenStoreError> {
        match fs_err::read_to_string(self.path.as_std_path()) {
            Ok(content) if content.trim().is_empty() => Ok(TokenFile::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(TokenFile::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Like [FileTokenStorage::read], but a file which is not valid JSON counts
    /// as empty so that it gets replaced by the next write.
    fn read_for_update(&self) -> Result<TokenFile, TokenStoreError> {
        match self.read() {
            Err(TokenStoreError::Json(e)) => {
                log::warn!("Replacing corrupt token file {}: {}", self.path, e);
                Ok(TokenFile::new())
            }
            other => other,
        }
    }

    /// Writes to a temporary file next to the token file, then renames it over
    /// the token file.
    fn write(&self, data: &TokenFile) -> Result<(), TokenStoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        fs_err::create_dir_all(dir.as_std_path())?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir.as_std_path())?;
        serde_json::to_writer_pretty(&mut tmp, data)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path.as_std_path()).map_err(|e| e.error)?;
        Ok(())
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self, server: &ServerUrl, username: &Username) -> Tokens {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.read() {
            Ok(data) => data
                .get(server.key())
                .and_then(|users| users.get(username.as_str()))
                .cloned()
                .unwrap_or_default(),
            Err(e) => {
                log::warn!("Could not read tokens from {}: {}", self.path, e);
                Tokens::invalid()
            }
        }
    }

    fn store(
        &self,
        server: &ServerUrl,
        username: &Username,
        tokens: &Tokens,
    ) -> Result<(), TokenStoreError> {
        ensure_storable(server, username, tokens)?;
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut data = self.read_for_update()?;
        data.entry(server.key().to_string())
            .or_default()
            .insert(username.to_string(), tokens.clone());
        self.write(&data)
    }

    fn remove(&self, server: &ServerUrl, username: &Username) -> Result<bool, TokenStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut data = self.read_for_update()?;
        let removed = match data.get_mut(server.key()) {
            Some(users) => {
                let removed = users.remove(username.as_str()).is_some();
                if users.is_empty() {
                    data.remove(server.key());
                }
                removed
            }
            None => false,
        };
        if removed {
            self.write(&data)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use tempfile::TempDir;

    #[fixture]
    fn tmp_dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    fn storage_in(dir: &TempDir) -> FileTokenStorage {
        let path = Utf8PathBuf::from_path_buf(dir.path().join("nested").join("tokens.json")).unwrap();
        FileTokenStorage::new(path)
    }

    #[rstest]
    fn test_missing_file_is_empty(tmp_dir: TempDir) {
        let storage = storage_in(&tmp_dir);
        let tokens = storage.load(
            &ServerUrl::from_static("http://localhost:8000"),
            &Username::from_static("admin"),
        );
        assert!(!tokens.is_valid());
    }

    #[rstest]
    fn test_store_creates_file_layout(tmp_dir: TempDir) {
        let storage = storage_in(&tmp_dir);
        let server = ServerUrl::from_static("http://localhost:8000/");
        storage
            .store(&server, &Username::from_static("admin"), &Tokens::new("a1", "r1"))
            .unwrap();
        storage
            .store(&server, &Username::from_static("bob"), &Tokens::new("a2", "r2"))
            .unwrap();

        let content = fs_err::read_to_string(storage.path().as_std_path()).unwrap();
        let actual: serde_json::Value = serde_json::from_str(&content).unwrap();
        let expected = serde_json::json!({
            "http://localhost:8000": {
                "admin": ["a1", "r1"],
                "bob": ["a2", "r2"]
            }
        });
        assert_eq!(actual, expected);
    }

    #[rstest]
    fn test_round_trip_across_instances(tmp_dir: TempDir) {
        let server = ServerUrl::from_static("http://localhost:8000");
        let username = Username::from_static("admin");
        storage_in(&tmp_dir)
            .store(&server, &username, &Tokens::new("a1", "r1"))
            .unwrap();
        let reopened = storage_in(&tmp_dir);
        assert_eq!(reopened.load(&server, &username), Tokens::new("a1", "r1"));
        assert!(!reopened
            .load(&ServerUrl::from_static("http://elsewhere:8000"), &username)
            .is_valid());
        assert!(!reopened
            .load(&server, &Username::from_static("bob"))
            .is_valid());
    }

    #[rstest]
    fn test_refuse_invalid(tmp_dir: TempDir) {
        let storage = storage_in(&tmp_dir);
        let result = storage.store(
            &ServerUrl::from_static("http://localhost:8000"),
            &Username::from_static("admin"),
            &Tokens::new("", "r1"),
        );
        assert!(matches!(result, Err(TokenStoreError::InvalidTokens { .. })));
        assert!(!storage.path().exists());
    }

    #[rstest]
    fn test_corrupt_file(tmp_dir: TempDir) {
        let storage = storage_in(&tmp_dir);
        fs_err::create_dir_all(storage.path().parent().unwrap().as_std_path()).unwrap();
        fs_err::write(storage.path().as_std_path(), "not json").unwrap();
        let server = ServerUrl::from_static("http://localhost:8000");
        let username = Username::from_static("admin");
        assert!(!storage.load(&server, &username).is_valid());
        storage
            .store(&server, &username, &Tokens::new("a", "r"))
            .unwrap();
        assert_eq!(storage.load(&server, &username), Tokens::new("a", "r"));
    }

    #[rstest]
    fn test_corrupt_file_remove(tmp_dir: TempDir) {
        let storage = storage_in(&tmp_dir);
        fs_err::create_dir_all(storage.path().parent().unwrap().as_std_path()).unwrap();
        fs_err::write(storage.path().as_std_path(), "{\"http://localhost:8000\": {").unwrap();
        let server = ServerUrl::from_static("http://localhost:8000");
        assert!(!storage
            .remove(&server, &Username::from_static("admin"))
            .unwrap());
    }

    #[rstest]
    fn test_write_leaves_only_token_file(tmp_dir: TempDir) {
        let storage = storage_in(&tmp_dir);
        let server = ServerUrl::from_static("http://localhost:8000");
        for (i, name) in ["admin", "bob", "carol"].into_iter().enumerate() {
            let tokens = Tokens::new(format!("a{i}"), format!("r{i}"));
            storage
                .store(&server, &Username::from_static(name), &tokens)
                .unwrap();
        }
        let dir = storage.path().parent().unwrap();
        let names: Vec<_> = fs_err::read_dir(dir.as_std_path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, ["tokens.json"]);
    }

    #[rstest]
    fn test_remove(tmp_dir: TempDir) {
        let storage = storage_in(&tmp_dir);
        let server = ServerUrl::from_static("http://localhost:8000");
        let username = Username::from_static("admin");
        assert!(!storage.remove(&server, &username).unwrap());
        storage
            .store(&server, &username, &Tokens::new("a1", "r1"))
            .unwrap();
        assert!(storage.remove(&server, &username).unwrap());
        assert!(!storage.load(&server, &username).is_valid());
    }
}
