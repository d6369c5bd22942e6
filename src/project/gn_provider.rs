use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::project::paths::normalize_separators;
use crate::project::{
    ConfigurationValues, ImportResult, ImporterConfig, ProjectError, ProjectImporter,
    ProjectModel, ProjectType,
};

/// Marker file produced by `gn gen --ide=json`
pub const GN_MARKER: &str = "gn.json";

/// Extensions of files shown for GN targets
const GN_SOURCE_EXTENSIONS: [&str; 18] = [
    "c", "cc", "cpp", "cxx", "h", "hh", "hpp", "hxx", "m", "mm", "java", "cs", "py", "vb", "lua",
    "go", "ts", "js",
];

/// Top level of a GN JSON build description
#[derive(Debug, Default, Deserialize)]
struct GnDescription {
    #[serde(default)]
    targets: BTreeMap<String, GnTarget>,
    #[serde(default)]
    args: HashMap<String, serde_json::Value>,
    #[serde(default)]
    build_settings: GnBuildSettings,
}

#[derive(Debug, Default, Deserialize)]
struct GnBuildSettings {
    root_path: Option<String>,
}

/// One entry of the `targets` object; unknown keys are ignored
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GnTarget {
    #[serde(rename = "type")]
    kind: String,
    sources: Vec<String>,
    inputs: Vec<String>,
    defines: Vec<String>,
    include_dirs: Vec<String>,
    cflags: Vec<String>,
    cflags_c: Vec<String>,
    cflags_cc: Vec<String>,
    cflags_objc: Vec<String>,
    cflags_objcc: Vec<String>,
    build_dir: Option<String>,
    dependency_output_file: Option<String>,
    ninja_path: Option<String>,
    is_major: bool,
    complete_static_lib: bool,
}

impl GnTarget {
    /// Targets that bypass the empty-sources filter
    fn is_major(&self) -> bool {
        self.is_major || self.complete_static_lib
    }

    fn is_valid(&self, sources: &[String]) -> bool {
        match self.kind.as_str() {
            "shared_library" | "loadable_module" | "executable" => true,
            _ if self.is_major() => true,
            "static_library" | "source_set" | "action" | "action_foreach" => !sources.is_empty(),
            _ => false,
        }
    }

    fn project_type(&self) -> ProjectType {
        match self.kind.as_str() {
            "executable" => ProjectType::Executable,
            "shared_library" | "loadable_module" => ProjectType::SharedLibrary,
            "static_library" => ProjectType::StaticLibrary,
            _ => ProjectType::SourceSet,
        }
    }

    /// All cflags lists concatenated, first occurrence of each flag kept
    fn compile_flags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        [
            &self.cflags,
            &self.cflags_c,
            &self.cflags_cc,
            &self.cflags_objc,
            &self.cflags_objcc,
        ]
        .into_iter()
        .flatten()
        .filter(|flag| seen.insert(flag.as_str()))
        .cloned()
        .collect()
    }
}

/// Importer for GN JSON build descriptions
///
/// GN output is not partitioned by configuration here: every target gets a
/// single `""` configuration and the import reports no configuration names.
pub struct GnProvider {
    system_includes: bool,
}

impl GnProvider {
    /// Create a new GN provider with host defaults
    pub fn new() -> Self {
        Self::from_config(&ImporterConfig::default())
    }

    /// Create a GN provider from the shared importer settings
    pub fn from_config(config: &ImporterConfig) -> Self {
        Self {
            system_includes: config.system_includes,
        }
    }

    /// Enable or disable reading system includes from `environment.<cpu>`
    pub fn with_system_includes(mut self, enabled: bool) -> Self {
        self.system_includes = enabled;
        self
    }

    fn parse_description(&self, path: &Path) -> Result<GnDescription, ProjectError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| ProjectError::Json {
            path: path.to_string_lossy().to_string(),
            source,
        })
    }

    fn build_project(
        &self,
        container: &str,
        target_id: &str,
        target: &GnTarget,
        sources: Vec<String>,
        description: &GnDescription,
    ) -> ProjectModel {
        let root = description.build_settings.root_path.as_deref();

        let work_dir = target
            .build_dir
            .as_deref()
            .map_or_else(|| "./".to_string(), |dir| resolve_source_absolute(root, dir));
        let binary = target.dependency_output_file.clone().unwrap_or_default();
        let ninja = target.ninja_path.as_deref().unwrap_or("ninja");

        // environment.<cpu> lives in the build dir; without one there is nothing to read
        let mut include_dirs = Vec::new();
        if self.system_includes
            && target.build_dir.is_some()
            && let Some(cpu) = description.args.get("target_cpu").and_then(|v| v.as_str())
        {
            include_dirs.extend(read_system_includes(Path::new(&work_dir), cpu));
        }
        include_dirs.extend(
            target
                .include_dirs
                .iter()
                .map(|dir| resolve_source_absolute(root, dir)),
        );

        let values = ConfigurationValues {
            root_dir: work_dir.clone(),
            binary_path: binary.clone(),
            project_type: target.project_type(),
            defines: target.defines.clone(),
            include_dirs,
            compile_flags: target.compile_flags(),
            build_command: format!("{ninja} -C {work_dir} {binary}"),
            clean_command: format!("{ninja} -C {work_dir} -t clean {binary}"),
        };

        ProjectModel::new(
            target_short_name(target_id),
            format!("{container}:{target_id}"),
            sources,
            BTreeMap::from([(String::new(), values)]),
            true,
        )
    }
}

impl ProjectImporter for GnProvider {
    fn name(&self) -> &str {
        "gn"
    }

    fn discover(&self, root: &Path) -> Vec<PathBuf> {
        let marker = root.join(GN_MARKER);
        if marker.is_file() {
            vec![marker]
        } else {
            Vec::new()
        }
    }

    fn import(&self, path: &Path) -> Result<ImportResult, ProjectError> {
        if !path.exists() {
            warn!("GN description not found: {}", path.display());
            return Ok(ImportResult::empty());
        }

        let description = self.parse_description(path)?;
        let container = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let root = description.build_settings.root_path.as_deref();

        let mut projects = Vec::new();
        for (target_id, target) in &description.targets {
            let sources = filtered_sources(target, root);
            if !target.is_valid(&sources) {
                debug!("Skipping GN target {} ({})", target_id, target.kind);
                continue;
            }

            debug!(
                "GN target {} ({}) with {} files",
                target_id,
                target.kind,
                sources.len()
            );
            projects.push(self.build_project(&container, target_id, target, sources, &description));
        }

        info!(
            "Imported {} of {} GN targets from {}",
            projects.len(),
            description.targets.len(),
            path.display()
        );

        Ok(ImportResult::new(projects, Vec::new()))
    }
}

impl Default for GnProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Short target name: toolchain suffix removed, segment after the last `:`
pub fn target_short_name(target_id: &str) -> String {
    let without_toolchain = target_id
        .find('(')
        .map_or(target_id, |index| &target_id[..index]);
    without_toolchain
        .rsplit(':')
        .next()
        .unwrap_or(without_toolchain)
        .to_string()
}

fn filtered_sources(target: &GnTarget, root: Option<&str>) -> Vec<String> {
    target
        .sources
        .iter()
        .chain(&target.inputs)
        .filter(|file| has_listed_extension(file))
        .map(|file| resolve_source_absolute(root, file))
        .collect()
}

fn has_listed_extension(file: &str) -> bool {
    Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| GN_SOURCE_EXTENSIONS.contains(&ext))
}

/// Resolve a GN source-absolute `//path` against the checkout root
fn resolve_source_absolute(root: Option<&str>, path: &str) -> String {
    match (root, path.strip_prefix("//")) {
        (Some(root), Some(relative)) => Path::new(root).join(relative).to_string_lossy().to_string(),
        _ => path.to_string(),
    }
}

/// System include directories from the toolchain environment block
///
/// A missing file or a block without `INCLUDE=` yields no directories.
fn read_system_includes(build_dir: &Path, cpu: &str) -> Vec<String> {
    let file = build_dir.join(format!("environment.{cpu}"));
    match fs::read(&file) {
        Ok(block) => parse_environment_block(&block),
        Err(e) => {
            debug!("No toolchain environment at {}: {}", file.display(), e);
            Vec::new()
        }
    }
}

/// Extract the `INCLUDE=` entry of a NUL separated environment block
pub fn parse_environment_block(block: &[u8]) -> Vec<String> {
    const MARKER: &[u8] = b"INCLUDE=";

    let Some(start) = block
        .windows(MARKER.len())
        .rposition(|window| window == MARKER)
        .map(|index| index + MARKER.len())
    else {
        return Vec::new();
    };

    let rest = &block[start..];
    let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());

    String::from_utf8_lossy(&rest[..end])
        .split(';')
        .map(|dir| normalize_separators(dir).trim().to_string())
        .filter(|dir| !dir.is_empty())
        .collect()
}
