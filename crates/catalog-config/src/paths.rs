use std::path::{Path, PathBuf};

/// `PLEX_CATALOG_HOME` overrides the platform config directory (containers, tests)
pub fn catalog_home_override() -> Option<PathBuf> {
    std::env::var("PLEX_CATALOG_HOME")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl PathManager {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            config_dir: base_dir.clone(),
            data_dir: base_dir.join("data"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Local wishlist used when no Google credentials are available
    pub fn wishlist_file(&self) -> PathBuf {
        self.data_dir.join("wishlist.json")
    }

    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Some(home) = catalog_home_override() {
            return Self::new(home);
        }

        // ~/.config/plex-catalog on Linux; fall back to the working directory
        let base = dirs::config_dir()
            .map(|dir| dir.join("plex-catalog"))
            .unwrap_or_else(|| PathBuf::from(".plex-catalog"));
        Self::new(base)
    }
}
