use std::path::Path;
use std::time::Instant;
use tracing::{Level, info, warn};

use crate::{log_import, log_timing};
use crate::project::{
    CodeBlocksProvider, GnProvider, ImporterConfig, ImporterRegistry, ProjectError,
    ProjectWorkspace, VsProvider,
};

/// Runs one import pass over a workspace root
///
/// The scanner asks its registry which importer owns the root, imports every
/// marker file that importer discovered and assembles the results into a
/// fresh ProjectWorkspace.
pub struct ProjectScanner {
    registry: ImporterRegistry,
}

impl ProjectScanner {
    /// Create a new project scanner with the given importer registry
    pub fn new(registry: ImporterRegistry) -> Self {
        Self { registry }
    }

    /// Create a scanner with the GN, Visual Studio and Code::Blocks importers,
    /// in that priority order
    pub fn with_default_providers(config: &ImporterConfig) -> Self {
        let registry = ImporterRegistry::new()
            .with_importer(Box::new(GnProvider::from_config(config)))
            .with_importer(Box::new(VsProvider::from_config(config)))
            .with_importer(Box::new(CodeBlocksProvider::new()));

        Self::new(registry)
    }

    /// Import the projects found under `root_path`
    ///
    /// # Returns
    /// - Err(PathNotFound) if the root does not exist
    /// - Ok(empty workspace) if no importer recognises the root
    /// - Ok(workspace) with every project from every marker file otherwise;
    ///   a marker file that fails to import is logged and skipped
    pub fn scan_project(&self, root_path: &Path) -> Result<ProjectWorkspace, ProjectError> {
        if !root_path.is_dir() {
            return Err(ProjectError::PathNotFound {
                path: root_path.to_string_lossy().to_string(),
            });
        }

        let Some((importer, files)) = self.registry.select(root_path) else {
            info!("No build metadata found under {}", root_path.display());
            return Ok(ProjectWorkspace::new(
                root_path.to_path_buf(),
                String::new(),
                Vec::new(),
                Vec::new(),
            ));
        };

        let mut projects = Vec::new();
        let mut configurations: Vec<String> = Vec::new();

        let start = Instant::now();
        for file in &files {
            match importer.import(file) {
                Ok(result) => {
                    log_import!(
                        Level::DEBUG,
                        importer.name(),
                        file,
                        result.projects.len(),
                        result.configurations.len()
                    );
                    projects.extend(result.projects);
                    for config in result.configurations {
                        if !configurations.contains(&config) {
                            configurations.push(config);
                        }
                    }
                }
                Err(e) => {
                    // Log the error but keep importing the remaining files
                    warn!("Failed to import {}: {}", file.display(), e);
                }
            }
        }
        log_timing!(Level::INFO, "import_pass", start.elapsed());

        info!(
            "{} importer found {} projects and {} configurations under {}",
            importer.name(),
            projects.len(),
            configurations.len(),
            root_path.display()
        );

        Ok(ProjectWorkspace::new(
            root_path.to_path_buf(),
            importer.name().to_string(),
            projects,
            configurations,
        ))
    }
}

impl Default for ProjectScanner {
    fn default() -> Self {
        Self::with_default_providers(&ImporterConfig::default())
    }
}
