use crate::project::{ProjectError, ProjectModel};
use std::path::{Path, PathBuf};

/// Output of one importer run over one source document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportResult {
    /// One model per valid target
    pub projects: Vec<ProjectModel>,

    /// Configuration names, empty for formats without configurations
    pub configurations: Vec<String>,
}

impl ImportResult {
    /// Create a result from imported projects and configuration names
    pub fn new(projects: Vec<ProjectModel>, configurations: Vec<String>) -> Self {
        Self {
            projects,
            configurations,
        }
    }

    /// Result for a missing source document
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Trait for build-metadata importers
///
/// Each importer understands one source format. `discover` looks for the
/// format's marker files below a root directory; `import` parses one of them.
pub trait ProjectImporter: Send + Sync {
    /// Short identifier of the source format (e.g. "gn", "vs")
    fn name(&self) -> &str;

    /// Marker files this importer would read for `root`, empty if none
    fn discover(&self, root: &Path) -> Vec<PathBuf>;

    /// Parse one source document
    ///
    /// Returns:
    /// - Ok(empty result) if the document does not exist
    /// - Ok(result) with every target that could be parsed
    /// - Err(error) if the document exists but cannot be read as a whole
    fn import(&self, path: &Path) -> Result<ImportResult, ProjectError>;

    /// Write a project back to its source format
    fn save(&self, _project: &ProjectModel) -> Result<(), ProjectError> {
        Err(ProjectError::not_implemented(format!("{}::save", self.name())))
    }
}

/// Registry of importers in priority order
///
/// Acts as the factory that picks exactly one importer for a root directory
/// based on which marker files are present.
pub struct ImporterRegistry {
    importers: Vec<Box<dyn ProjectImporter>>,
}

impl ImporterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            importers: Vec::new(),
        }
    }

    /// Add an importer; earlier importers take precedence
    pub fn with_importer(mut self, importer: Box<dyn ProjectImporter>) -> Self {
        self.importers.push(importer);
        self
    }

    /// Pick the first importer whose marker files exist under `root`
    pub fn select(&self, root: &Path) -> Option<(&dyn ProjectImporter, Vec<PathBuf>)> {
        self.importers.iter().find_map(|importer| {
            let files = importer.discover(root);
            if files.is_empty() {
                None
            } else {
                Some((importer.as_ref(), files))
            }
        })
    }

    /// Number of registered importers
    pub fn len(&self) -> usize {
        self.importers.len()
    }

    /// Whether no importer is registered
    pub fn is_empty(&self) -> bool {
        self.importers.is_empty()
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
