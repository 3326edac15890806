//! Filesystem-backed resource loading, analogous to classpath lookup in managed runtimes. The
//! packaged artifact bundles resources under a base directory; paths declared during the pass
//! resolve relative to it.

use kiln_aot::error::ResourceError;
use kiln_aot::resource::ResourceLoader;
use std::fs;
use std::path::PathBuf;

/// Loads bundled resources from a base directory. Leading slashes in resource paths are
/// ignored, so `"/hello"` and `"hello"` resolve to the same file.
#[derive(Clone, Debug)]
pub struct FileResourceLoader {
    base: PathBuf,
}

impl FileResourceLoader {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base: base.into() }
    }
}

impl ResourceLoader for FileResourceLoader {
    fn load(&self, path: &str) -> Result<Vec<u8>, ResourceError> {
        let full_path = self.base.join(path.trim_start_matches('/'));
        if !full_path.is_file() {
            return Err(ResourceError::NotFound(path.to_string()));
        }

        fs::read(&full_path).map_err(|error| ResourceError::Io {
            path: path.to_string(),
            message: error.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::resource::FileResourceLoader;
    use kiln_aot::error::ResourceError;
    use kiln_aot::resource::{load_to_string, ResourceLoader};
    use std::fs;
    use std::path::PathBuf;

    fn create_resource_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "kiln-resource-test-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("hello"), "hello from a bundled resource").unwrap();

        dir
    }

    #[test]
    fn should_load_bundled_resource() {
        let dir = create_resource_dir();
        let loader = FileResourceLoader::new(&dir);

        assert_eq!(
            load_to_string(&loader, "/hello").unwrap(),
            "hello from a bundled resource"
        );
        assert_eq!(
            load_to_string(&loader, "hello").unwrap(),
            "hello from a bundled resource"
        );
    }

    #[test]
    fn should_report_missing_resource() {
        let dir = create_resource_dir();
        let loader = FileResourceLoader::new(&dir);

        assert_eq!(
            loader.load("/missing").unwrap_err(),
            ResourceError::NotFound("/missing".to_string())
        );
    }
}
