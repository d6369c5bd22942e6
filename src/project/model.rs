use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::project::paths::is_absolute_like;
use crate::project::{CompileFlags, ConfigSelector, FileGroup};

/// Values keyed by configuration name (`""` for unconfigured formats)
pub type PerConfig<T> = BTreeMap<String, T>;

/// Kind of artifact a target produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Executable,
    StaticLibrary,
    SharedLibrary,
    SourceSet,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executable => "executable",
            Self::StaticLibrary => "static_library",
            Self::SharedLibrary => "shared_library",
            Self::SourceSet => "source_set",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything an importer resolved for one configuration of one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationValues {
    pub root_dir: String,
    pub binary_path: String,
    pub project_type: ProjectType,
    pub defines: Vec<String>,
    pub include_dirs: Vec<String>,
    pub compile_flags: Vec<String>,
    pub build_command: String,
    pub clean_command: String,
}

impl ConfigurationValues {
    /// Empty values for a target of the given type
    pub fn new(project_type: ProjectType) -> Self {
        Self {
            root_dir: String::new(),
            binary_path: String::new(),
            project_type,
            defines: Vec::new(),
            include_dirs: Vec::new(),
            compile_flags: Vec::new(),
            build_command: String::new(),
            clean_command: String::new(),
        }
    }
}

/// Entry of a `tasks.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTask {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub command: String,
}

/// Entry of a `launch.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub request: String,
    pub program: String,
    pub cwd: String,
    pub pre_launch_task: String,
}

/// One configuration block of a `c_cpp_properties.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyConfiguration {
    pub name: String,
    pub include_path: Vec<String>,
    pub defines: Vec<String>,
    pub c_standard: String,
    pub cpp_standard: String,
}

/// Compiler-properties descriptor for the active configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub configurations: Vec<PropertyConfiguration>,
    pub version: u32,
}

/// Unified, configuration-aware view of one build target
///
/// Every per-configuration map carries the same key set; the constructor
/// derives them all from one `ConfigurationValues` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectModel {
    name: String,
    full_name: String,
    root_dir: PerConfig<String>,
    binary_path: PerConfig<String>,
    project_type: PerConfig<ProjectType>,
    files: BTreeMap<FileGroup, Vec<String>>,
    all_files: Vec<String>,
    defines: PerConfig<Vec<String>>,
    include_dirs: PerConfig<Vec<String>>,
    compile_flags: PerConfig<Vec<String>>,
    build_command: PerConfig<String>,
    clean_command: PerConfig<String>,
    c_standard: PerConfig<String>,
    cpp_standard: PerConfig<String>,
    read_only: bool,
    can_build: bool,
}

impl ProjectModel {
    /// Build a model from fully parsed importer output
    ///
    /// Defines and include directories of each configuration are the explicit
    /// values followed by whatever the tokenizer finds in its compile flags.
    pub fn new(
        name: impl Into<String>,
        full_name: impl Into<String>,
        files: Vec<String>,
        configurations: BTreeMap<String, ConfigurationValues>,
        read_only: bool,
    ) -> Self {
        let mut model = Self {
            name: name.into(),
            full_name: full_name.into(),
            root_dir: PerConfig::new(),
            binary_path: PerConfig::new(),
            project_type: PerConfig::new(),
            files: BTreeMap::new(),
            all_files: Vec::new(),
            defines: PerConfig::new(),
            include_dirs: PerConfig::new(),
            compile_flags: PerConfig::new(),
            build_command: PerConfig::new(),
            clean_command: PerConfig::new(),
            c_standard: PerConfig::new(),
            cpp_standard: PerConfig::new(),
            read_only,
            can_build: false,
        };

        for file in files {
            model.push_file(file);
        }

        for (config, values) in configurations {
            let parsed = CompileFlags::parse(&values.compile_flags);

            let mut defines = values.defines;
            defines.extend(parsed.defines);
            let mut include_dirs = values.include_dirs;
            include_dirs.extend(parsed.include_dirs);

            model.can_build |= !values.build_command.trim().is_empty();

            model.root_dir.insert(config.clone(), values.root_dir);
            model.binary_path.insert(config.clone(), values.binary_path);
            model.project_type.insert(config.clone(), values.project_type);
            model.defines.insert(config.clone(), defines);
            model.include_dirs.insert(config.clone(), include_dirs);
            model.compile_flags.insert(config.clone(), values.compile_flags);
            model.build_command.insert(config.clone(), values.build_command);
            model.clean_command.insert(config.clone(), values.clean_command);
            model.c_standard.insert(config.clone(), parsed.c_std);
            model.cpp_standard.insert(config, parsed.cpp_std);
        }

        model
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity key, stable across re-imports of an unchanged target
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn can_build(&self) -> bool {
        self.can_build
    }

    /// Configuration names this model has values for
    pub fn configurations(&self) -> impl Iterator<Item = &str> {
        self.project_type.keys().map(String::as_str)
    }

    // Per-configuration maps, for callers that need a specific configuration.

    pub fn root_dir_map(&self) -> &PerConfig<String> {
        &self.root_dir
    }

    pub fn binary_path_map(&self) -> &PerConfig<String> {
        &self.binary_path
    }

    pub fn project_type_map(&self) -> &PerConfig<ProjectType> {
        &self.project_type
    }

    pub fn defines_map(&self) -> &PerConfig<Vec<String>> {
        &self.defines
    }

    pub fn include_dirs_map(&self) -> &PerConfig<Vec<String>> {
        &self.include_dirs
    }

    pub fn compile_flags_map(&self) -> &PerConfig<Vec<String>> {
        &self.compile_flags
    }

    pub fn build_command_map(&self) -> &PerConfig<String> {
        &self.build_command
    }

    pub fn clean_command_map(&self) -> &PerConfig<String> {
        &self.clean_command
    }

    pub fn c_standard_map(&self) -> &PerConfig<String> {
        &self.c_standard
    }

    pub fn cpp_standard_map(&self) -> &PerConfig<String> {
        &self.cpp_standard
    }

    // Active-configuration accessors.

    pub fn root_dir(&self, selector: &ConfigSelector) -> &str {
        lookup_str(&self.root_dir, selector)
    }

    pub fn binary_path(&self, selector: &ConfigSelector) -> &str {
        lookup_str(&self.binary_path, selector)
    }

    pub fn project_type(&self, selector: &ConfigSelector) -> Option<ProjectType> {
        self.project_type.get(selector.active()).copied()
    }

    pub fn defines(&self, selector: &ConfigSelector) -> &[String] {
        lookup_list(&self.defines, selector)
    }

    pub fn include_dirs(&self, selector: &ConfigSelector) -> &[String] {
        lookup_list(&self.include_dirs, selector)
    }

    pub fn compile_flags(&self, selector: &ConfigSelector) -> &[String] {
        lookup_list(&self.compile_flags, selector)
    }

    pub fn build_command(&self, selector: &ConfigSelector) -> &str {
        lookup_str(&self.build_command, selector)
    }

    pub fn clean_command(&self, selector: &ConfigSelector) -> &str {
        lookup_str(&self.clean_command, selector)
    }

    pub fn c_standard(&self, selector: &ConfigSelector) -> &str {
        self.c_standard
            .get(selector.active())
            .map_or(crate::project::compile_flags::DEFAULT_C_STANDARD, String::as_str)
    }

    pub fn cpp_standard(&self, selector: &ConfigSelector) -> &str {
        self.cpp_standard
            .get(selector.active())
            .map_or(crate::project::compile_flags::DEFAULT_CPP_STANDARD, String::as_str)
    }

    // Files.

    /// Flat list of every file in the project
    pub fn files(&self) -> &[String] {
        &self.all_files
    }

    pub fn files_by_group(&self) -> &BTreeMap<FileGroup, Vec<String>> {
        &self.files
    }

    /// Groups in display order with their files sorted
    pub fn groups(&self) -> Vec<(FileGroup, Vec<String>)> {
        self.files
            .iter()
            .map(|(group, files)| {
                let mut files = files.clone();
                files.sort();
                (*group, files)
            })
            .collect()
    }

    /// Add a file to the raw list and its group; returns false if already present
    pub fn add_file(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.all_files.contains(&path) {
            return false;
        }
        self.push_file(path);
        true
    }

    /// Remove a file from the raw list and its group; returns false if absent
    pub fn delete_file(&mut self, path: &str) -> bool {
        let before = self.all_files.len();
        self.all_files.retain(|f| f != path);
        if self.all_files.len() == before {
            return false;
        }

        let group = FileGroup::classify(path);
        if let Some(files) = self.files.get_mut(&group) {
            files.retain(|f| f != path);
            if files.is_empty() {
                self.files.remove(&group);
            }
        }
        true
    }

    fn push_file(&mut self, path: String) {
        self.files
            .entry(FileGroup::classify(&path))
            .or_default()
            .push(path.clone());
        self.all_files.push(path);
    }

    // Descriptors consumed by the task, launch and properties writers.

    pub fn build_task_label(&self) -> String {
        format!("build {}", self.full_name)
    }

    pub fn build_task(&self, selector: &ConfigSelector) -> BuildTask {
        BuildTask {
            label: self.build_task_label(),
            kind: "shell".to_string(),
            command: self.build_command(selector).to_string(),
        }
    }

    pub fn clean_task(&self, selector: &ConfigSelector) -> BuildTask {
        BuildTask {
            label: format!("clean {}", self.full_name),
            kind: "shell".to_string(),
            command: self.clean_command(selector).to_string(),
        }
    }

    /// Debug launch descriptor; `None` unless the active type is executable
    pub fn launch_config(&self, selector: &ConfigSelector) -> Option<LaunchConfig> {
        if self.project_type(selector) != Some(ProjectType::Executable) {
            return None;
        }

        let cwd = self.root_dir(selector);
        let binary = self.binary_path(selector);
        let program = if binary.is_empty() || cwd.is_empty() || is_absolute_like(binary) {
            binary.to_string()
        } else {
            Path::new(cwd).join(binary).to_string_lossy().to_string()
        };

        Some(LaunchConfig {
            name: self.name.clone(),
            kind: "cppdbg".to_string(),
            request: "launch".to_string(),
            program,
            cwd: cwd.to_string(),
            pre_launch_task: self.build_task_label(),
        })
    }

    pub fn property_config(&self, selector: &ConfigSelector) -> PropertyConfig {
        PropertyConfig {
            configurations: vec![PropertyConfiguration {
                name: self.full_name.clone(),
                include_path: self.include_dirs(selector).to_vec(),
                defines: self.defines(selector).to_vec(),
                c_standard: format!("c{}", self.c_standard(selector)),
                cpp_standard: format!("c++{}", self.cpp_standard(selector)),
            }],
            version: 4,
        }
    }
}

fn lookup_str<'a>(map: &'a PerConfig<String>, selector: &ConfigSelector) -> &'a str {
    map.get(selector.active()).map_or("", String::as_str)
}

fn lookup_list<'a>(map: &'a PerConfig<Vec<String>>, selector: &ConfigSelector) -> &'a [String] {
    map.get(selector.active())
        .map(Vec::as_slice)
        .unwrap_or_default()
}
