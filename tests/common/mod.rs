pub mod temp_files {
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Writes `content` to `routes.<ext>` inside a fresh temporary directory.
    ///
    /// The directory is removed when the returned guard is dropped.
    pub fn create_temp_table(content: &str, ext: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("routes.{ext}"));
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    /// Creates a temporary table with yaml extension
    #[allow(dead_code)]
    pub fn create_temp_yaml(content: &str) -> (TempDir, PathBuf) {
        create_temp_table(content, "yaml")
    }
}
