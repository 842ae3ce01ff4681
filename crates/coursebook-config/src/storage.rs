use std::path::PathBuf;

pub const DEFAULT_AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    /// Prefix of the public URLs recorded for uploaded files.
    pub public_base_url: String,
    pub max_avatar_bytes: usize,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(crate::env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = crate::parse_or(&lookup, "PORT", 3000);

        Self {
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            public_base_url: lookup("UPLOAD_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}/uploads", port)),
            max_avatar_bytes: crate::parse_or(&lookup, "AVATAR_MAX_BYTES", DEFAULT_AVATAR_MAX_BYTES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup_from;

    #[test]
    fn defaults() {
        let config = StorageConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.public_base_url, "http://localhost:3000/uploads");
        assert_eq!(config.max_avatar_bytes, 5_242_880);
    }

    #[test]
    fn overrides() {
        let config = StorageConfig::from_lookup(lookup_from(&[
            ("UPLOAD_DIR", "/var/coursebook"),
            ("UPLOAD_BASE_URL", "https://cdn.example.com"),
            ("AVATAR_MAX_BYTES", "1024"),
        ]));
        assert_eq!(config.upload_dir, PathBuf::from("/var/coursebook"));
        assert_eq!(config.public_base_url, "https://cdn.example.com");
        assert_eq!(config.max_avatar_bytes, 1024);
    }
}
