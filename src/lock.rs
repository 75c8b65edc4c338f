//! Process lock around the transmit pin.
//!
//! Two invocations keying the same transmitter at once would interleave their
//! pulses and garble both commands. [`PidLock`] serializes them through a
//! pid file: the holder writes its pid, later callers wait for the file to go
//! away. A file whose pid no longer has a `/proc` entry is stale (the holder
//! crashed or was killed) and is removed.
//!
//! Requires the `std` feature.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use thiserror::Error;

/// Default location of the pid file.
pub const DEFAULT_LOCK_PATH: &str = "/tmp/dooya433.pid";

/// Default number of waits before giving up on a held lock.
pub const DEFAULT_RETRIES: u32 = 5;

/// Default wait between two checks of a held lock.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Errors raised while taking the lock.
#[derive(Debug, Error)]
pub enum LockError {
    /// The pid file could not be read, written or removed.
    #[error("pid file {}: {source}", .path.display())]
    Io {
        /// Path of the pid file.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Another live process kept the lock for the whole retry budget.
    #[error("pid file {} existed for the past {waited:?} - giving up", .path.display())]
    Held {
        /// Path of the pid file.
        path: PathBuf,
        /// Pid found in the file, `None` if the holder had not written it yet.
        pid: Option<u32>,
        /// Total time spent waiting.
        waited: Duration,
    },
}

/// Pid file lock configuration.
#[derive(Debug, Clone)]
pub struct PidLock {
    path: PathBuf,
    retries: u32,
    retry_interval: Duration,
}

impl PidLock {
    /// Creates a lock on `path` with the default retry budget.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retries: DEFAULT_RETRIES,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }

    /// Sets how many times, and how long apart, a held lock is re-checked.
    pub fn with_retries(mut self, retries: u32, retry_interval: Duration) -> Self {
        self.retries = retries;
        self.retry_interval = retry_interval;
        self
    }

    /// Path of the pid file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits for the lock to be free, removing stale pid files, then takes it.
    ///
    /// The returned guard removes the pid file when dropped.
    pub fn acquire(&self) -> Result<PidLockGuard, LockError> {
        let mut attempts = 0u32;
        loop {
            match self.try_create() {
                Ok(guard) => return Ok(guard),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(source) => return Err(self.io_error(source)),
            }

            let pid = match self.holder()? {
                Holder::Gone => continue,
                Holder::Starting => None,
                Holder::Garbage(contents) => {
                    warn!("pid file without a pid, removing");
                    self.remove_stale(&contents)?;
                    continue;
                }
                Holder::Pid(pid) if !process_alive(pid) => {
                    warn!("stale pid file left by process {}, removing", pid);
                    self.remove_stale(&pid.to_string())?;
                    continue;
                }
                Holder::Pid(pid) => Some(pid),
            };

            attempts += 1;
            if attempts > self.retries {
                return Err(LockError::Held {
                    path: self.path.clone(),
                    pid,
                    waited: self.retry_interval * attempts,
                });
            }
            debug!("lock held, waiting (attempt {})", attempts);
            thread::sleep(self.retry_interval);
        }
    }

    fn try_create(&self) -> io::Result<PidLockGuard> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        let guard = PidLockGuard {
            path: self.path.clone(),
        };
        write!(file, "{}", std::process::id())?;
        trace!("lock taken by process {}", std::process::id());
        Ok(guard)
    }

    fn read(&self) -> Result<Option<String>, LockError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents.trim().to_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn holder(&self) -> Result<Holder, LockError> {
        let Some(contents) = self.read()? else {
            return Ok(Holder::Gone);
        };
        if contents.is_empty() {
            return Ok(Holder::Starting);
        }
        Ok(match contents.parse() {
            Ok(pid) => Holder::Pid(pid),
            Err(_) => Holder::Garbage(contents),
        })
    }

    /// Removes the pid file, unless it no longer holds `seen`.
    ///
    /// Another waiter may have reclaimed the same stale file and taken the
    /// lock in between; its fresh pid file must survive.
    fn remove_stale(&self, seen: &str) -> Result<(), LockError> {
        if self.read()?.as_deref() != Some(seen) {
            debug!("pid file changed since it was read, leaving it");
            return Ok(());
        }
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: io::Error) -> LockError {
        LockError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Held lock. Removes the pid file on drop.
#[derive(Debug)]
pub struct PidLockGuard {
    path: PathBuf,
}

impl PidLockGuard {
    /// Path of the pid file this guard owns.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidLockGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// What an existing pid file says about its owner.
enum Holder {
    /// The file disappeared before it could be read.
    Gone,
    /// Created but the pid is not written yet.
    Starting,
    /// Contents are not a pid.
    Garbage(String),
    /// Pid of the process that wrote the file.
    Pid(u32),
}

fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    // No pid can exceed PID_MAX_LIMIT (2^22) on Linux.
    const DEAD_PID: u32 = 999_999_999;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dooya433-{}-{}", std::process::id(), name));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("lock.pid");
        let _ = fs::remove_file(&path);
        path
    }

    fn quick(path: &Path, retries: u32) -> PidLock {
        PidLock::new(path).with_retries(retries, Duration::ZERO)
    }

    #[test]
    fn test_acquire_writes_pid_and_drop_removes() {
        let path = scratch("acquire");
        let guard = quick(&path, 0).acquire().unwrap();

        assert_eq!(guard.path(), path.as_path());
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, std::process::id().to_string());

        drop(guard);
        assert!(!path.exists());
    }

    #[test]
    fn test_live_holder_is_respected() {
        let path = scratch("live");
        fs::write(&path, std::process::id().to_string()).unwrap();

        let err = quick(&path, 2).acquire().unwrap_err();
        match err {
            LockError::Held { pid, .. } => assert_eq!(pid, Some(std::process::id())),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(path.exists());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_stale_lock_is_reclaimed() {
        let path = scratch("stale");
        fs::write(&path, DEAD_PID.to_string()).unwrap();

        let guard = quick(&path, 0).acquire().unwrap();
        let contents = fs::read_to_string(guard.path()).unwrap();
        assert_eq!(contents, std::process::id().to_string());
    }

    #[test]
    fn test_stale_removal_spares_a_fresh_holder() {
        let path = scratch("reclaimed");
        fs::write(&path, std::process::id().to_string()).unwrap();

        let lock = quick(&path, 0);
        lock.remove_stale(&DEAD_PID.to_string()).unwrap();
        assert!(path.exists());

        lock.remove_stale(&std::process::id().to_string()).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_held_error_counts_every_check() {
        let path = scratch("waited");
        fs::write(&path, std::process::id().to_string()).unwrap();

        let err = PidLock::new(&path)
            .with_retries(2, Duration::from_millis(1))
            .acquire()
            .unwrap_err();
        match err {
            LockError::Held { waited, .. } => assert_eq!(waited, Duration::from_millis(3)),
            other => panic!("unexpected error {other:?}"),
        }
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_garbage_lock_is_reclaimed() {
        let path = scratch("garbage");
        fs::write(&path, "not a pid\n").unwrap();

        let guard = quick(&path, 0).acquire().unwrap();
        assert!(guard.path().exists());
    }

    #[test]
    fn test_empty_lock_counts_as_held() {
        let path = scratch("empty");
        fs::write(&path, "").unwrap();

        assert!(matches!(
            quick(&path, 1).acquire(),
            Err(LockError::Held { pid: None, .. })
        ));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_second_acquire_waits_for_first() {
        let path = scratch("second");
        let first = quick(&path, 0).acquire().unwrap();
        assert!(matches!(
            quick(&path, 1).acquire(),
            Err(LockError::Held { .. })
        ));

        drop(first);
        let _second = quick(&path, 0).acquire().unwrap();
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let path = scratch("missing").with_file_name("no-such-dir").join("lock.pid");
        assert!(matches!(
            quick(&path, 0).acquire(),
            Err(LockError::Io { .. })
        ));
    }

    #[test]
    fn test_error_messages_name_the_file() {
        let err = LockError::Held {
            path: PathBuf::from("/tmp/x.pid"),
            pid: Some(42),
            waited: Duration::from_secs(25),
        };
        assert_eq!(
            err.to_string(),
            "pid file /tmp/x.pid existed for the past 25s - giving up"
        );
    }
}
