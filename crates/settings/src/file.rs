//! The single on-disk options file.
//!
//! Writes never touch the target in place: bytes go to `<file>.tmp`, are
//! synced, and the temp file is renamed over the target. Writers hold an
//! exclusive `fs2` lock on `<file>.lock` for the whole sequence.

use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
    tmp_path: PathBuf,
    lock_path: PathBuf,
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            tmp_path: with_suffix(&path, ".tmp"),
            lock_path: with_suffix(&path, ".lock"),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tmp_path(&self) -> &Path {
        &self.tmp_path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read the raw bytes. `Ok(None)` when the file does not exist yet.
    ///
    /// Decoding is left to the caller so that undecodable content is not
    /// mistaken for a read failure.
    pub fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Replace the file contents with `bytes`.
    pub fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        self.write_with(|file| file.write_all(bytes))
    }

    /// Run `fill` against a fresh temp file and move it into place if it
    /// succeeds. On any failure the target is untouched and the temp file is
    /// removed.
    pub(crate) fn write_with<F>(&self, fill: F) -> io::Result<()>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        self.ensure_parent_dir()?;
        self.with_lock(|| {
            let res = self.replace_with(fill);
            if res.is_err() && self.tmp_path.is_file() {
                if let Err(err) = fs::remove_file(&self.tmp_path) {
                    warn!(path = %self.tmp_path.display(), %err, "failed to remove temp file");
                }
            }
            res
        })
    }

    fn replace_with<F>(&self, fill: F) -> io::Result<()>
    where
        F: FnOnce(&mut File) -> io::Result<()>,
    {
        let mut tmp = File::create(&self.tmp_path)?;
        fill(&mut tmp)?;
        tmp.sync_all()?;
        drop(tmp);
        fs::rename(&self.tmp_path, &self.path)?;
        sync_parent_dir(&self.path)
    }

    fn with_lock<R>(&self, f: impl FnOnce() -> io::Result<R>) -> io::Result<R> {
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;
        lock.lock_exclusive()?;
        let res = f();
        // Closing the handle releases the lock too; the write result wins.
        if let Err(err) = lock.unlock() {
            warn!(path = %self.lock_path.display(), %err, "failed to release options file lock");
        }
        res
    }

    fn ensure_parent_dir(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => File::open(dir)?.sync_all(),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sidecar_paths_append_to_the_file_name() {
        let file = SettingsFile::new("/tmp/game.options.json");
        assert_eq!(file.tmp_path(), Path::new("/tmp/game.options.json.tmp"));
        assert_eq!(file.lock_path, PathBuf::from("/tmp/game.options.json.lock"));
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let file = SettingsFile::new(dir.path().join("options.json"));
        assert!(!file.exists());
        assert_eq!(file.read().unwrap(), None);
    }

    #[test]
    fn undecodable_content_is_returned_verbatim() {
        let dir = TempDir::new().unwrap();
        let file = SettingsFile::new(dir.path().join("options.json"));
        fs::write(file.path(), [0xff, 0xfe, b'{']).unwrap();

        assert_eq!(file.read().unwrap(), Some(vec![0xff, 0xfe, b'{']));
    }

    #[test]
    fn lock_is_released_after_a_failed_write() {
        let dir = TempDir::new().unwrap();
        let file = SettingsFile::new(dir.path().join("options.json"));

        let err = file
            .write_with(|_| Err(io::Error::other("disk full")))
            .unwrap_err();
        assert_eq!(err.to_string(), "disk full");

        file.write_atomic(b"after").unwrap();
        assert_eq!(file.read().unwrap().as_deref(), Some(&b"after"[..]));
    }

    #[test]
    fn write_creates_parent_and_replaces_content() {
        let dir = TempDir::new().unwrap();
        let file = SettingsFile::new(dir.path().join("nested").join("options.json"));

        file.write_atomic(b"first").unwrap();
        file.write_atomic(b"second").unwrap();

        assert_eq!(file.read().unwrap().as_deref(), Some(&b"second"[..]));
        assert!(!file.tmp_path().exists());
    }

    #[test]
    fn interrupted_write_leaves_target_byte_identical() {
        let dir = TempDir::new().unwrap();
        let file = SettingsFile::new(dir.path().join("options.json"));
        file.write_atomic(b"{\"saved\":true}").unwrap();
        let before = fs::read(file.path()).unwrap();

        let err = file
            .write_with(|f| {
                f.write_all(b"{\"sav")?;
                Err(io::Error::other("power cut"))
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "power cut");
        assert_eq!(fs::read(file.path()).unwrap(), before);
        assert!(!file.tmp_path().exists());
    }

    #[test]
    fn unwritable_temp_is_an_error_and_target_survives() {
        let dir = TempDir::new().unwrap();
        let file = SettingsFile::new(dir.path().join("options.json"));
        file.write_atomic(b"keep me").unwrap();
        fs::create_dir(file.tmp_path()).unwrap();

        assert!(file.write_atomic(b"lost").is_err());
        assert_eq!(file.read().unwrap().as_deref(), Some(&b"keep me"[..]));
    }
}
