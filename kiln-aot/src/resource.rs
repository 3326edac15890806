//! Contract for loading bundled, classpath-style resources. The pipeline itself only records
//! which paths must remain loadable after packaging (see
//! [RuntimeHints::register_resource](crate::hints::RuntimeHints::register_resource)) - actual
//! loading is an external collaborator's job.

use crate::error::ResourceError;
#[cfg(test)]
use mockall::automock;

/// Loads the content of bundled resources by path.
#[cfg_attr(test, automock)]
pub trait ResourceLoader {
    fn load(&self, path: &str) -> Result<Vec<u8>, ResourceError>;
}

/// Loads a resource and decodes it as UTF-8 text.
pub fn load_to_string(loader: &dyn ResourceLoader, path: &str) -> Result<String, ResourceError> {
    let content = loader.load(path)?;
    String::from_utf8(content).map_err(|error| ResourceError::Io {
        path: path.to_string(),
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use crate::error::ResourceError;
    use crate::resource::{load_to_string, MockResourceLoader};

    #[test]
    fn should_load_text_resource() {
        let mut loader = MockResourceLoader::new();
        loader
            .expect_load()
            .times(1)
            .returning(|_| Ok(b"hello".to_vec()));

        assert_eq!(load_to_string(&loader, "/hello").unwrap(), "hello");
    }

    #[test]
    fn should_forward_missing_resource() {
        let mut loader = MockResourceLoader::new();
        loader
            .expect_load()
            .times(1)
            .returning(|path| Err(ResourceError::NotFound(path.to_string())));

        assert_eq!(
            load_to_string(&loader, "/missing").unwrap_err(),
            ResourceError::NotFound("/missing".to_string())
        );
    }

    #[test]
    fn should_reject_invalid_text() {
        let mut loader = MockResourceLoader::new();
        loader
            .expect_load()
            .times(1)
            .returning(|_| Ok(vec![0xff, 0xfe]));

        assert!(matches!(
            load_to_string(&loader, "/binary").unwrap_err(),
            ResourceError::Io { .. }
        ));
    }
}
