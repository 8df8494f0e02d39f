//! Store configuration.

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to create the store file if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to fsync the file and its directory on every persist
    /// (safer but slower).
    pub sync_on_write: bool,

    /// Whether to hold an advisory lock file so only one process opens
    /// the store at a time.
    pub lock_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_write: true,
            lock_file: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the store if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether every persist is synced to disk.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets whether to take the single-process lock file.
    #[must_use]
    pub const fn lock_file(mut self, value: bool) -> Self {
        self.lock_file = value;
        self
    }
}
