use std::{collections::HashMap, fs, io};

/// Reads the source text of files included with `ext`.
pub trait SourceLoader {
    fn read_text(&self, path: &str) -> io::Result<String>;
}

/// Reads files from the file system, relative to the working directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn read_text(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Serves files from memory.
///
/// # Examples
/// ```
/// use noktoy::interpreter::loader::{MemoryLoader, SourceLoader};
///
/// let loader = MemoryLoader::new().with_file("lib.nk", "let answer = 42");
/// assert_eq!(loader.read_text("lib.nk").unwrap(), "let answer = 42");
/// assert!(loader.read_text("missing.nk").is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: HashMap<String, String>,
}

impl MemoryLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: &str, source: &str) -> Self {
        self.files.insert(path.to_string(), source.to_string());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn read_text(&self, path: &str) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}
