//! Temporary `airports.dat` catalogs.

use std::path::PathBuf;

use tempfile::TempDir;

/// The default catalog in `airports.dat` format.
pub const DEFAULT_DAT: &str = r#"1,"General Edward Lawrence Logan Intl","Boston","United States","BOS","KBOS",42.364347,-71.005181,19,-5,"A"
2,"Newark Liberty Intl","Newark","United States","EWR","KEWR",40.6925,-74.168667,18,-5,"A"
3,"John F Kennedy Intl","New York","United States","JFK","KJFK",40.639751,-73.778925,13,-5,"A"
4,"La Guardia","New York","United States","LGA","KLGA",40.777245,-73.872608,22,-5,"A"
5,"Morristown Municipal Airport","Morristown","United States","MMU","KMMU",40.79935,-74.4148747,187,-5,"A""#;

/// A catalog file living in its own temporary directory.
///
/// The directory is removed when this value is dropped.
pub struct TempCatalog {
    pub dir: TempDir,
    pub path: PathBuf,
}

/// Write `content` to `airports.dat` inside a fresh temporary directory.
pub fn temp_catalog(content: &str) -> TempCatalog {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("airports.dat");
    std::fs::write(&path, content).expect("Failed to write catalog");
    TempCatalog { dir, path }
}

/// Write the default five airport catalog to a temporary file.
pub fn default_temp_catalog() -> TempCatalog {
    temp_catalog(DEFAULT_DAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_temp_catalog_written() {
        let catalog = default_temp_catalog();
        let content = std::fs::read_to_string(&catalog.path).unwrap();
        assert_eq!(content.lines().count(), 5);
        assert!(content.contains("\"JFK\""));
    }
}
