//! Per-call scratch files, removed on drop.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// The four files of one exact solve: translator output, solver log, and the
/// backups parsed after a SAT answer.
///
/// Names combine the process id, the worker id and a process-wide counter,
/// so concurrent solves never collide.
#[derive(Debug)]
pub struct ScratchFiles {
    circuit: PathBuf,
    log: PathBuf,
    circuit_backup: PathBuf,
    log_backup: PathBuf,
}

impl ScratchFiles {
    /// Reserves names under `dir`.
    pub fn new(dir: &Path, worker_id: usize) -> Self {
        let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let stem = format!("ctxdeg-{}-w{worker_id}-{seq}", std::process::id());
        let path = |suffix: &str| dir.join(format!("{stem}{suffix}"));
        Self {
            circuit: path(".cnf"),
            log: path(".log"),
            circuit_backup: path(".bak.cnf"),
            log_backup: path(".bak.log"),
        }
    }

    /// Translator output, including the mapping comments.
    pub fn circuit(&self) -> &Path {
        &self.circuit
    }

    /// Solver output, including the model lines.
    pub fn log(&self) -> &Path {
        &self.log
    }

    /// Backup of [`ScratchFiles::circuit`].
    pub fn circuit_backup(&self) -> &Path {
        &self.circuit_backup
    }

    /// Backup of [`ScratchFiles::log`].
    pub fn log_backup(&self) -> &Path {
        &self.log_backup
    }

    /// Copies the live files onto their backups.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] naming the file that failed to copy.
    pub fn back_up(&self) -> Result<()> {
        std::fs::copy(&self.circuit, &self.circuit_backup)
            .map_err(|e| Error::io(&self.circuit, e))?;
        std::fs::copy(&self.log, &self.log_backup).map_err(|e| Error::io(&self.log, e))?;
        Ok(())
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in [
            &self.circuit,
            &self.log,
            &self.circuit_backup,
            &self.log_backup,
        ] {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let a = ScratchFiles::new(dir.path(), 3);
        let b = ScratchFiles::new(dir.path(), 3);
        assert_ne!(a.circuit(), b.circuit());
        assert!(a.log().to_string_lossy().contains("-w3-"));

        std::fs::write(a.circuit(), "c").unwrap();
        std::fs::write(a.log(), "v 0").unwrap();
        a.back_up().unwrap();
        assert_eq!(std::fs::read_to_string(a.log_backup()).unwrap(), "v 0");
        drop(a);
        drop(b);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
