//! Filesystem layout derived from the runtime and repository roots.
//!
//! Every derived path is a pure function of the two roots. The only
//! filesystem access happens while choosing the roots themselves, and it goes
//! through the injected [`FilesystemProbe`].

use crate::source::FilesystemProbe;
use curator_core::reflect_members;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Default name of the subdirectory that marks a source tree.
pub const DEFAULT_REPOSITORY_MARKER: &str = "src";

/// Absolute layout of every directory the application uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathLayout {
    /// Runtime root (drive or volume root)
    pub root: PathBuf,
    /// Repository root (source and config files)
    pub repository_root: PathBuf,
    /// Log directory
    pub log: PathBuf,
    /// Application subdirectories
    pub app: AppPaths,
}

/// Application subdirectories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppPaths {
    /// Configuration files
    pub config: PathBuf,
    /// digiKam configuration
    pub digikam: PathBuf,
    /// Application modules
    pub modules: PathBuf,
    /// External tool installations
    pub plugins: PluginPaths,
    /// Secret vault
    pub vault: PathBuf,
}

/// Plugin directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginPaths {
    /// Installed plugins
    pub root: PathBuf,
    /// Downloaded archives
    pub downloads: PathBuf,
    /// Scratch space for extraction
    pub temp: PathBuf,
}

impl PathLayout {
    /// Derive the full layout from both roots.
    #[must_use]
    pub fn from_roots(root: impl Into<PathBuf>, repository_root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let repository_root = repository_root.into();

        let config = repository_root.join("config");
        let plugins_root = root.join("plugins");

        Self {
            log: repository_root.join("logs"),
            app: AppPaths {
                digikam: config.join("digikam"),
                config,
                modules: repository_root.join("modules"),
                plugins: PluginPaths {
                    downloads: plugins_root.join("_downloads"),
                    temp: plugins_root.join("_temp"),
                    root: plugins_root,
                },
                vault: repository_root.join("vault"),
            },
            root,
            repository_root,
        }
    }

    /// Derive the layout from a runtime root and an optional repository root.
    ///
    /// Without a repository root, `root/<repository_dir>` is used when it
    /// exists, otherwise the runtime root itself.
    #[must_use]
    pub fn derive(
        root: &Path,
        repository_root: Option<&Path>,
        repository_dir: &str,
        probe: &dyn FilesystemProbe,
    ) -> Self {
        let repository_root = match repository_root {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = root.join(repository_dir);
                if !repository_dir.is_empty() && probe.exists(&candidate) {
                    candidate
                } else {
                    root.to_path_buf()
                }
            }
        };
        Self::from_roots(root, repository_root)
    }

    /// Resolve the layout from a single absolute root hint.
    ///
    /// When `hint/<marker>` exists the hint is a source checkout: it becomes
    /// the repository root and its volume root becomes the runtime root.
    /// Otherwise both roots are the hint.
    #[must_use]
    pub fn from_hint(hint: &Path, marker: &str, probe: &dyn FilesystemProbe) -> Self {
        if !marker.is_empty() && probe.exists(&hint.join(marker)) {
            Self::from_roots(volume_root(hint), hint)
        } else {
            Self::from_roots(hint, hint)
        }
    }

    /// Directories that must exist for the application to run.
    #[must_use]
    pub fn directories(&self) -> Vec<&Path> {
        vec![
            self.log.as_path(),
            self.app.config.as_path(),
            self.app.digikam.as_path(),
            self.app.modules.as_path(),
            self.app.plugins.root.as_path(),
            self.app.plugins.downloads.as_path(),
            self.app.plugins.temp.as_path(),
            self.app.vault.as_path(),
        ]
    }
}

/// The volume root of an absolute path.
///
/// With a drive prefix this is the prefix plus root (`D:\`). On prefix-less
/// systems it is the top-level directory the path lives under
/// (`/media/ext1` → `/media`), or `/` for a path directly under it.
#[must_use]
pub fn volume_root(path: &Path) -> PathBuf {
    let anchor: PathBuf = path
        .components()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect();

    if path.components().any(|c| matches!(c, Component::Prefix(_))) {
        return anchor;
    }

    let normals: Vec<Component<'_>> = path
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();

    match normals.as_slice() {
        [first, _, ..] => anchor.join(first.as_os_str()),
        _ => anchor,
    }
}

reflect_members!(PathLayout { app });
reflect_members!(AppPaths { plugins });
reflect_members!(PluginPaths);
