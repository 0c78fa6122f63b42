//! Module search path from the unpacked bundle

use std::path::{Path, PathBuf};

/// Bundle directory expected under the unpack dir.
pub const BUNDLE_DIR_NAME: &str = "_python_bundle";
pub const STDLIB_ARCHIVE: &str = "stdlib.zip";
pub const MODULES_DIR: &str = "modules";
pub const SITE_PACKAGES_DIR: &str = "site-packages";

/// Search path rooted at an existing bundle directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    bundle_dir: PathBuf,
}

impl SearchPath {
    /// Locate the bundle under `unpack_dir`.
    ///
    /// A missing bundle is only a warning: the interpreter may still carry a
    /// usable built-in path.
    pub fn resolve(unpack_dir: &Path) -> Option<Self> {
        let bundle_dir = unpack_dir.join(BUNDLE_DIR_NAME);
        if bundle_dir.is_dir() {
            tracing::info!(bundle = %bundle_dir.display(), "{BUNDLE_DIR_NAME} dir exists");
            let search_path = Self { bundle_dir };
            tracing::info!(paths = %search_path.primary(), "calculated paths");
            Some(search_path)
        } else {
            tracing::warn!(
                bundle = %bundle_dir.display(),
                "{BUNDLE_DIR_NAME} does not exist, continuing with the default module search path"
            );
            None
        }
    }

    pub fn bundle_dir(&self) -> &Path {
        &self.bundle_dir
    }

    /// The archive and modules directory, `:`-joined, applied before the
    /// interpreter starts.
    pub fn primary(&self) -> String {
        format!(
            "{}:{}",
            self.stdlib_archive().display(),
            self.modules_dir().display()
        )
    }

    pub fn stdlib_archive(&self) -> PathBuf {
        self.bundle_dir.join(STDLIB_ARCHIVE)
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.bundle_dir.join(MODULES_DIR)
    }

    /// Appended to the live path list once the interpreter runs.
    pub fn site_packages(&self) -> PathBuf {
        self.bundle_dir.join(SITE_PACKAGES_DIR)
    }
}
