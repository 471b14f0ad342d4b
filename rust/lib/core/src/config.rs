use std::path::PathBuf;

/// Storage and listen settings shared by the server and its tools.
///
/// `resortd` fills this from its TOML file and command line, then hands it
/// to storage initialization.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding the resort's persistent data.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb database file.
    /// Defaults to `{data_dir}/frontdesk.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Listen address for the HTTP server.
    pub listen: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_path: None,
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

impl ServiceConfig {
    /// Resolve the redb database path, falling back to `{data_dir}/frontdesk.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(|| {
            self.data_dir
                .as_ref()
                .map(|d| d.join("frontdesk.redb"))
                .unwrap_or_else(|| PathBuf::from("frontdesk.redb"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_db_path() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/data/frontdesk.redb"));

        let explicit = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            db_path: Some(PathBuf::from("/tmp/other.redb")),
            ..Default::default()
        };
        assert_eq!(explicit.resolve_db_path(), PathBuf::from("/tmp/other.redb"));

        assert_eq!(
            ServiceConfig::default().resolve_db_path(),
            PathBuf::from("frontdesk.redb")
        );
    }
}
