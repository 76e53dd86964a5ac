//! Lazily loaded key material for the asymmetric strategy.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use zeroize::Zeroizing;

/// A key given either inline or as a path to a file holding it.
///
/// File contents are read on first use and cached. A file that does not exist
/// (or cannot be read) is not cached, so it is looked for again on the next
/// access and may appear later in the process lifetime.
pub struct KeyMaterial {
    source: Source,
    cached: OnceLock<Zeroizing<Vec<u8>>>,
}

enum Source {
    Inline(Zeroizing<Vec<u8>>),
    File(PathBuf),
}

impl KeyMaterial {
    pub fn inline(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: Source::Inline(Zeroizing::new(bytes.into())),
            cached: OnceLock::new(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Source::File(path.into()),
            cached: OnceLock::new(),
        }
    }

    /// The file this key is read from, if it is file-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::Inline(_) => None,
            Source::File(path) => Some(path.as_path()),
        }
    }

    /// Key bytes, if currently resolvable.
    pub fn load(&self) -> Option<&[u8]> {
        let path = match &self.source {
            Source::Inline(bytes) => return Some(bytes.as_slice()),
            Source::File(path) => path,
        };
        if let Some(bytes) = self.cached.get() {
            return Some(bytes.as_slice());
        }
        if !path.is_file() {
            return None;
        }
        match std::fs::read(path) {
            Ok(bytes) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(path = %path.display(), "loaded key file");
                Some(self.cached.get_or_init(|| Zeroizing::new(bytes)).as_slice())
            },
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    path = %path.display(),
                    error = %_e,
                    "key file exists but cannot be read"
                );
                None
            },
        }
    }

    pub fn is_available(&self) -> bool {
        self.load().is_some()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::Inline(_) => f.write_str("KeyMaterial::Inline([REDACTED])"),
            Source::File(path) => f.debug_tuple("KeyMaterial::File").field(path).finish(),
        }
    }
}
