//! Visual Studio solution importer
//!
//! Import runs in two stages: the `.sln` text gives the member projects and
//! the solution-to-project configuration mapping, then each `.vcxproj` is
//! parsed and resolved once per solution configuration.

pub mod macros;
pub mod solution;
pub mod vcxproj;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::project::paths::files_with_extension;
use crate::project::{
    ConfigurationValues, ImportResult, ImporterConfig, ProjectError, ProjectImporter,
    ProjectModel,
};

pub use solution::{Solution, SolutionProject};
pub use vcxproj::{LinkSettings, VcxProject};

use macros::split_config;

/// Directory searched for solutions besides the root
pub const BUILD_FILES_DIR: &str = "BuildFiles";

/// Extensions of project files shown for Visual Studio projects
const VS_SOURCE_EXTENSIONS: [&str; 11] =
    ["c", "cpp", "cc", "cxx", "h", "hh", "hpp", "hxx", "m", "mm", "java"];

/// Importer for Visual Studio `.sln` + `.vcxproj` projects
pub struct VsProvider {
    msbuild_path: String,
    msvc_host: bool,
}

impl VsProvider {
    /// Create a new Visual Studio provider with host defaults
    pub fn new() -> Self {
        Self::from_config(&ImporterConfig::default())
    }

    /// Create a Visual Studio provider from the shared importer settings
    pub fn from_config(config: &ImporterConfig) -> Self {
        Self {
            msbuild_path: config.msbuild_path.clone(),
            msvc_host: config.msvc_host,
        }
    }

    fn commands(&self, solution: &Solution, target: &str, config: &str) -> (String, String) {
        let (configuration, platform) = split_config(config);

        if solution.is_cmake_generated() {
            let dir = cmake_build_dir(solution.directory());
            let dir = dir.display();
            return (
                format!("cmake --build {dir} --target {target} --config {configuration}"),
                format!("cmake --build {dir} --target clean --config {configuration}"),
            );
        }

        let sln = solution.path().display();
        let msbuild = &self.msbuild_path;
        (
            format!(
                "{msbuild} {sln} -t:{target} -property:Configuration={configuration} -property:Platform={platform}"
            ),
            format!(
                "{msbuild} {sln} -t:Clean -property:Configuration={configuration} -property:Platform={platform}"
            ),
        )
    }

    fn build_project(&self, solution: &Solution, container: &str, vcxproj: &VcxProject) -> ProjectModel {
        let root_dir = solution.directory().to_string_lossy().to_string();
        let files = vcxproj
            .files()
            .into_iter()
            .filter(|file| has_listed_extension(file))
            .collect();

        let mut configurations = BTreeMap::new();
        for config in solution.configurations() {
            let project_config = solution.project_config(vcxproj.uuid(), config);
            if project_config.is_empty() {
                debug!("{} has no ActiveCfg for {}", vcxproj.name(), config);
            }

            let (build_command, clean_command) = self.commands(solution, vcxproj.name(), config);
            configurations.insert(
                config.clone(),
                ConfigurationValues {
                    root_dir: root_dir.clone(),
                    binary_path: vcxproj.binary_path(project_config),
                    project_type: vcxproj.project_type(project_config),
                    defines: vcxproj.defines(project_config),
                    include_dirs: vcxproj.include_dirs(project_config),
                    compile_flags: vcxproj.compile_flags(project_config),
                    build_command,
                    clean_command,
                },
            );
        }

        ProjectModel::new(
            vcxproj.name(),
            format!("{}:{}", container, vcxproj.path().display()),
            files,
            configurations,
            !(vcxproj.has_extension_targets() && self.msvc_host),
        )
    }
}

impl ProjectImporter for VsProvider {
    fn name(&self) -> &str {
        "vs"
    }

    fn discover(&self, root: &Path) -> Vec<PathBuf> {
        let mut solutions = files_with_extension(root, "sln");
        solutions.extend(files_with_extension(&root.join(BUILD_FILES_DIR), "sln"));
        solutions
    }

    fn import(&self, path: &Path) -> Result<ImportResult, ProjectError> {
        if !path.exists() {
            warn!("Solution not found: {}", path.display());
            return Ok(ImportResult::empty());
        }

        let solution = Solution::load(path)?;
        let container = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut projects = Vec::new();
        for entry in solution.projects() {
            match VcxProject::load(entry, solution.directory()) {
                Ok(vcxproj) => projects.push(self.build_project(&solution, &container, &vcxproj)),
                Err(e) => warn!("Skipping project {} ({}): {}", entry.name, entry.path.display(), e),
            }
        }

        info!(
            "Imported {} of {} projects with {} configurations from {}",
            projects.len(),
            solution.projects().len(),
            solution.configurations().len(),
            path.display()
        );

        Ok(ImportResult::new(projects, solution.configurations().to_vec()))
    }
}

impl Default for VsProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// CMake build tree for a generated solution: the `BuildFiles` directory
/// the solution sits in, or the one below it
fn cmake_build_dir(solution_dir: &Path) -> PathBuf {
    if solution_dir.file_name().is_some_and(|name| name == BUILD_FILES_DIR) {
        solution_dir.to_path_buf()
    } else {
        solution_dir.join(BUILD_FILES_DIR)
    }
}

fn has_listed_extension(file: &str) -> bool {
    Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| VS_SOURCE_EXTENSIONS.contains(&ext))
}
