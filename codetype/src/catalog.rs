use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use derive_more::From;
use quill::reference::normalize_line_endings;
use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Snippet pools shipped with the binary
const BUILTIN_POOLS: [(&str, &str); 3] = [
    ("python.toml", include_str!("../snippets/python.toml")),
    ("javascript.toml", include_str!("../snippets/javascript.toml")),
    ("c.toml", include_str!("../snippets/c.toml")),
];

#[derive(Debug, From, Error)]
pub enum CatalogError {
    #[error("Failed to read snippets directory '{directory}': {error}")]
    #[from(skip)]
    ReadDirectory {
        directory: PathBuf,
        error: std::io::Error,
    },

    #[error("Failed to read snippet file: {0}")]
    ReadFile(std::io::Error),

    #[error("Failed to parse snippet file '{name}': {error}")]
    #[from(skip)]
    ParseFile { name: String, error: toml::de::Error },

    #[error("Language '{0}' has no snippets")]
    #[from(skip)]
    EmptyPool(String),

    #[error("Snippet #{index} of language '{language}' is empty")]
    #[from(skip)]
    EmptySnippet { language: String, index: usize },

    #[error("Unknown language '{0}'")]
    #[from(skip)]
    UnknownLanguage(String),
}

/// On-disk shape of a snippet file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetFile {
    pub language: String,
    #[serde(default)]
    pub snippets: Vec<String>,
}

/// Snippet pools keyed by language identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pools: BTreeMap<String, Vec<String>>,
    tab_width: usize,
}

impl Catalog {
    /// An empty catalog; snippets added to it get their tabs expanded to `tab_width` spaces
    pub const fn new(tab_width: usize) -> Self {
        Self {
            pools: BTreeMap::new(),
            tab_width,
        }
    }

    /// The built-in pools
    pub fn builtin(tab_width: usize) -> Result<Self, CatalogError> {
        let mut catalog = Self::new(tab_width);
        for (name, content) in BUILTIN_POOLS {
            catalog.add_file(name, content)?;
        }
        Ok(catalog)
    }

    /// The built-in pools extended with every `*.toml` file in `from_dir`, validated
    pub fn load(from_dir: &Path, tab_width: usize) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin(tab_width)?;
        catalog.extend_from_dir(from_dir)?;
        catalog.validate()?;

        info!(
            languages = catalog.pools.len(),
            snippets = catalog.pools.values().map(Vec::len).sum::<usize>(),
            "snippet catalog loaded"
        );
        Ok(catalog)
    }

    /// Append the snippets of every `*.toml` file in `from_dir`
    ///
    /// Creates the directory if it doesn't exist.
    pub fn extend_from_dir(&mut self, from_dir: &Path) -> Result<(), CatalogError> {
        if !from_dir.exists() {
            std::fs::create_dir_all(from_dir)?;
        }

        let files = from_dir
            .read_dir()
            .map_err(|error| CatalogError::ReadDirectory {
                directory: from_dir.to_path_buf(),
                error,
            })?;

        // Sorted, so the pool order doesn't depend on the file system
        let mut paths = Vec::new();
        for entry in files {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let content = std::fs::read_to_string(&path)?;
            let name = path.display().to_string();
            self.add_file(&name, &content)?;
        }

        Ok(())
    }

    fn add_file(&mut self, name: &str, content: &str) -> Result<(), CatalogError> {
        let file: SnippetFile = toml::from_str(content).map_err(|error| CatalogError::ParseFile {
            name: name.to_string(),
            error,
        })?;

        debug!(
            file = name,
            language = %file.language,
            snippets = file.snippets.len(),
            "snippet file read"
        );

        let tab_width = self.tab_width;
        self.pools.entry(file.language).or_default().extend(
            file.snippets
                .iter()
                .map(|snippet| prepare_snippet(snippet, tab_width)),
        );

        Ok(())
    }

    /// Make sure every language can produce a snippet
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (language, pool) in &self.pools {
            if pool.is_empty() {
                return Err(CatalogError::EmptyPool(language.clone()));
            }

            if let Some(index) = pool.iter().position(String::is_empty) {
                return Err(CatalogError::EmptySnippet {
                    language: language.clone(),
                    index,
                });
            }
        }

        Ok(())
    }

    /// All language identifiers, sorted
    pub fn languages(&self) -> Vec<&str> {
        self.pools.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, language: &str) -> bool {
        self.pools.contains_key(language)
    }

    pub fn snippets(&self, language: &str) -> Option<&[String]> {
        self.pools.get(language).map(Vec::as_slice)
    }

    /// Draw a snippet of `language` uniformly at random
    pub fn pick_random(&self, language: &str) -> Result<&str, CatalogError> {
        self.pick_random_with(language, &mut rand::thread_rng())
    }

    pub fn pick_random_with<R: Rng + ?Sized>(
        &self,
        language: &str,
        rng: &mut R,
    ) -> Result<&str, CatalogError> {
        let pool = self
            .pools
            .get(language)
            .ok_or_else(|| CatalogError::UnknownLanguage(language.to_string()))?;

        pool.choose(rng)
            .map(String::as_str)
            .ok_or_else(|| CatalogError::EmptyPool(language.to_string()))
    }

    /// The language after `current`, wrapping around
    ///
    /// Unknown languages yield the first language.
    pub fn next_language(&self, current: &str) -> Option<&str> {
        let languages = self.languages();
        let next = languages
            .iter()
            .position(|language| *language == current)
            .map_or(0, |index| (index + 1) % languages.len());

        languages.get(next).copied()
    }
}

/// Normalize a snippet for typing: CRLF to LF, tabs to spaces, no trailing line breaks
fn prepare_snippet(snippet: &str, tab_width: usize) -> String {
    normalize_line_endings(snippet)
        .replace('\t', &" ".repeat(tab_width))
        .trim_end_matches('\n')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn write_file(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_builtin_pools() {
        let catalog = Catalog::builtin(4).unwrap();

        assert_eq!(catalog.languages(), vec!["c", "javascript", "python"]);
        for language in catalog.languages() {
            assert_eq!(catalog.snippets(language).unwrap().len(), 4);
        }
        catalog.validate().unwrap();

        let first_python = &catalog.snippets("python").unwrap()[0];
        assert!(first_python.starts_with("def binary_search(arr, target):\n    left, right"));
        assert!(first_python.ends_with("return -1"));
    }

    #[test]
    fn test_builtin_template_literals_are_kept() {
        let catalog = Catalog::builtin(4).unwrap();
        let person = &catalog.snippets("javascript").unwrap()[1];

        assert!(person.contains("`Hello, my name is ${this.name}"));
    }

    #[test]
    fn test_user_snippets_extend_pools() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "rust.toml",
            "language = \"rust\"\nsnippets = [\"fn main() {\\n\\tprintln!()\\n}\\n\"]\n",
        );
        write_file(
            dir.path(),
            "more_python.toml",
            "language = \"python\"\nsnippets = [\"print('hi')\"]\n",
        );
        write_file(dir.path(), "notes.txt", "not a snippet file");

        let catalog = Catalog::load(dir.path(), 4).unwrap();

        assert_eq!(catalog.languages(), vec!["c", "javascript", "python", "rust"]);
        assert_eq!(catalog.snippets("python").unwrap().len(), 5);
        // Tabs expanded, trailing newline dropped
        assert_eq!(
            catalog.snippets("rust").unwrap(),
            &["fn main() {\n    println!()\n}".to_string()]
        );
    }

    #[test]
    fn test_missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let snippets_dir = dir.path().join("snippets");

        Catalog::load(&snippets_dir, 4).unwrap();
        assert!(snippets_dir.is_dir());
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "go.toml", "language = \"go\"\nsnippets = []\n");

        let error = Catalog::load(dir.path(), 4).unwrap_err();
        assert!(matches!(error, CatalogError::EmptyPool(language) if language == "go"));
    }

    #[test]
    fn test_empty_snippet_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "go.toml", "language = \"go\"\nsnippets = [\"x\", \"\\n\"]\n");

        let error = Catalog::load(dir.path(), 4).unwrap_err();
        assert!(matches!(error, CatalogError::EmptySnippet { index: 1, .. }));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "broken.toml", "snippets = 3");

        let error = Catalog::load(dir.path(), 4).unwrap_err();
        assert!(matches!(error, CatalogError::ParseFile { .. }));
    }

    #[test]
    fn test_pick_random() {
        let catalog = Catalog::builtin(4).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let snippet = catalog.pick_random_with("c", &mut rng).unwrap();
            assert!(snippet.starts_with("#include"));
        }

        assert!(matches!(
            catalog.pick_random("cobol"),
            Err(CatalogError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_empty_pool_cannot_be_picked() {
        let mut catalog = Catalog::new(4);
        catalog
            .add_file("empty.toml", "language = \"zig\"\nsnippets = []")
            .unwrap();

        assert!(matches!(
            catalog.pick_random("zig"),
            Err(CatalogError::EmptyPool(_))
        ));
    }

    #[test]
    fn test_next_language_wraps() {
        let catalog = Catalog::builtin(4).unwrap();

        assert_eq!(catalog.next_language("c"), Some("javascript"));
        assert_eq!(catalog.next_language("python"), Some("c"));
        assert_eq!(catalog.next_language("unknown"), Some("c"));
        assert_eq!(Catalog::new(4).next_language("c"), None);
    }
}
