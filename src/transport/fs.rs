//! Filesystem artifact store
//!
//! Each artifact is a binary file `<dir>/<name>.bin`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::{Artifact, ArtifactStore};
use crate::error::{Error, Result};
use crate::keys;

/// Artifact store backed by a local directory
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, artifact: Artifact) -> PathBuf {
        self.dir.join(format!("{}.bin", artifact.name()))
    }

    fn write_new(&self, artifact: Artifact, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        if artifact.is_sensitive() {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        file.write_all(bytes)?;
        file.sync_all()
    }
}

impl ArtifactStore for FsArtifactStore {
    fn store(&self, artifact: Artifact, bytes: &[u8]) -> Result<()> {
        let io_err = |source| Error::ArtifactIo { artifact, source };
        fs::create_dir_all(&self.dir).map_err(io_err)?;

        // Write beside the target, then rename over it
        let target = self.path_of(artifact);
        let staging = self
            .dir
            .join(format!(".{}.{}.tmp", artifact.name(), Uuid::new_v4()));
        let written = self
            .write_new(artifact, &staging, bytes)
            .and_then(|()| fs::rename(&staging, &target));
        if let Err(e) = written {
            let _ = fs::remove_file(&staging);
            return Err(io_err(e));
        }

        debug!("Stored {} ({} bytes) at {}", artifact, bytes.len(), target.display());
        Ok(())
    }

    fn load(&self, artifact: Artifact, expected_len: usize) -> Result<Zeroizing<Vec<u8>>> {
        let io_err = |source| Error::ArtifactIo { artifact, source };
        let path = self.path_of(artifact);
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ArtifactNotFound { artifact })
            }
            Err(e) => return Err(io_err(e)),
        };

        let actual = file.metadata().map_err(io_err)?.len();
        if actual != expected_len as u64 {
            return Err(Error::ArtifactLengthMismatch {
                artifact,
                expected: expected_len,
                actual: usize::try_from(actual).unwrap_or(usize::MAX),
            });
        }

        let mut buf = keys::allocate(expected_len)?;
        match file.read_exact(&mut buf) {
            Ok(()) => {}
            // Truncated between the metadata check and the read
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                let actual = file
                    .metadata()
                    .map(|m| usize::try_from(m.len()).unwrap_or(usize::MAX))
                    .unwrap_or(0);
                return Err(Error::ArtifactLengthMismatch {
                    artifact,
                    expected: expected_len,
                    actual,
                });
            }
            Err(e) => return Err(io_err(e)),
        }

        debug!("Loaded {} ({} bytes) from {}", artifact, expected_len, path.display());
        Ok(buf)
    }

    fn discard(&self, artifact: Artifact) -> Result<()> {
        match fs::remove_file(self.path_of(artifact)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::ArtifactIo { artifact, source }),
        }
    }

    fn contains(&self, artifact: Artifact) -> bool {
        self.path_of(artifact).is_file()
    }
}
