use regex::Regex;
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use crate::project::paths::{
    normalize_lexically, normalize_separators, parent_dir, resolve_against,
};
use crate::project::vs::macros::{MacroTable, split_config};
use crate::project::vs::solution::SolutionProject;
use crate::project::{ProjectError, ProjectType};

/// MSBuild inheritance markers such as `%(PreprocessorDefinitions)`
static INHERITANCE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%\([^)]*\)").expect("Failed to compile inheritance pattern"));

/// Item kinds that contribute files to a project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    ClCompile,
    ClInclude,
    CustomBuild,
    None,
}

impl SourceKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ClCompile" => Some(Self::ClCompile),
            "ClInclude" => Some(Self::ClInclude),
            "CustomBuild" => Some(Self::CustomBuild),
            "None" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub kind: SourceKind,
    /// Path resolved against the `.vcxproj` directory
    pub path: String,
}

/// `ClCompile` settings of one `ItemDefinitionGroup` condition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileSettings {
    pub defines: Vec<String>,
    pub include_dirs: Vec<String>,
    pub options: Vec<String>,
}

/// `Link` settings of one `ItemDefinitionGroup` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    pub sub_system: String,
    pub generate_debug_information: String,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            sub_system: String::new(),
            generate_debug_information: "true".to_string(),
        }
    }
}

/// `OutDir`/`TargetName` of one unlabelled `PropertyGroup` condition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct OutputProperties {
    out_dir: Option<String>,
    target_name: Option<String>,
}

/// Parsed `.vcxproj` document
///
/// Settings are kept per `Condition` key (`""` when the element has no
/// condition) and resolved for a `"Cfg|Platform"` string on request.
#[derive(Debug, Clone)]
pub struct VcxProject {
    name: String,
    path: PathBuf,
    uuid: String,
    sources: Vec<SourceItem>,
    configurations: Vec<String>,
    compile: HashMap<String, CompileSettings>,
    link: HashMap<String, LinkSettings>,
    properties: HashMap<String, OutputProperties>,
    configuration_types: HashMap<String, String>,
    extension_targets: bool,
    macros: MacroTable,
}

impl VcxProject {
    /// Read the `.vcxproj` a solution entry points at
    pub fn load(project: &SolutionProject, solution_dir: &Path) -> Result<Self, ProjectError> {
        if !project.path.exists() {
            return Err(ProjectError::PathNotFound {
                path: project.path.to_string_lossy().to_string(),
            });
        }
        let content = fs::read_to_string(&project.path)?;
        Self::parse(project, solution_dir, &content)
    }

    /// Parse `.vcxproj` text for a solution entry
    pub fn parse(
        project: &SolutionProject,
        solution_dir: &Path,
        content: &str,
    ) -> Result<Self, ProjectError> {
        let path_str = project.path.to_string_lossy().to_string();
        let mut vcxproj = Self {
            name: project.name.clone(),
            path: project.path.clone(),
            uuid: project.uuid.clone(),
            sources: Vec::new(),
            configurations: Vec::new(),
            compile: HashMap::new(),
            link: HashMap::new(),
            properties: HashMap::new(),
            configuration_types: HashMap::new(),
            extension_targets: false,
            macros: MacroTable::new(
                &solution_dir.to_string_lossy(),
                &project.name,
                &path_str,
            ),
        };

        let document = Document::parse(content.trim_start_matches('\u{feff}'))
            .map_err(|e| ProjectError::xml(&project.path, e))?;
        let root = document.root_element();
        if root.tag_name().name() != "Project" {
            return Err(ProjectError::xml(&project.path, "root element is not <Project>"));
        }

        let project_dir = parent_dir(&project.path).to_path_buf();
        for node in root.children().filter(Node::is_element) {
            match node.tag_name().name() {
                "ItemGroup" => vcxproj.read_item_group(node, &project_dir),
                "ItemDefinitionGroup" => vcxproj.read_item_definition_group(node, &project_dir),
                "PropertyGroup" => vcxproj.read_property_group(node),
                "ImportGroup" => {
                    if node.attribute("Label") == Some("ExtensionTargets") {
                        vcxproj.extension_targets = true;
                    }
                }
                _ => {}
            }
        }

        debug!(
            "Parsed {} with {} files and {} conditions",
            path_str,
            vcxproj.sources.len(),
            vcxproj.compile.len()
        );
        Ok(vcxproj)
    }

    fn read_item_group(&mut self, group: Node, project_dir: &Path) {
        let is_configuration_list = group.attribute("Label") == Some("ProjectConfigurations");

        for item in group.children().filter(Node::is_element) {
            if is_configuration_list {
                if let Some(config) = item.attribute("Include") {
                    self.configurations.push(config.to_string());
                }
                continue;
            }

            let Some(kind) = SourceKind::from_tag(item.tag_name().name()) else {
                continue;
            };
            let Some(include) = item.attribute("Include") else {
                continue;
            };
            self.sources.push(SourceItem {
                kind,
                path: resolve_against(project_dir, &normalize_separators(include)),
            });
        }
    }

    fn read_item_definition_group(&mut self, group: Node, project_dir: &Path) {
        let condition = condition_key(group);

        for child in group.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "ClCompile" => {
                    let settings = self.compile.entry(condition.clone()).or_default();
                    if let Some(defines) = child_text(child, "PreprocessorDefinitions") {
                        settings.defines.extend(split_list(defines, ';'));
                    }
                    if let Some(includes) = child_text(child, "AdditionalIncludeDirectories") {
                        settings.include_dirs.extend(
                            split_list(&normalize_separators(includes), ';')
                                .into_iter()
                                .map(|dir| resolve_include(project_dir, &dir)),
                        );
                    }
                    if let Some(options) = child_text(child, "AdditionalOptions") {
                        let options = strip_inheritance(options);
                        settings
                            .options
                            .extend(options.split_whitespace().map(str::to_string));
                    }
                }
                "Link" => {
                    let settings = self.link.entry(condition.clone()).or_default();
                    if let Some(sub_system) = child_text(child, "SubSystem") {
                        settings.sub_system = sub_system.trim().to_string();
                    }
                    if let Some(debug_info) = child_text(child, "GenerateDebugInformation") {
                        settings.generate_debug_information = debug_info.trim().to_string();
                    }
                }
                _ => {}
            }
        }
    }

    fn read_property_group(&mut self, group: Node) {
        let condition = condition_key(group);

        match group.attribute("Label") {
            Some("Configuration") => {
                if let Some(kind) = child_text(group, "ConfigurationType") {
                    self.configuration_types
                        .insert(condition, kind.trim().to_string());
                }
            }
            None => {
                let properties = self.properties.entry(condition).or_default();
                if let Some(out_dir) = child_text(group, "OutDir") {
                    properties.out_dir = Some(normalize_separators(out_dir.trim()));
                }
                if let Some(target_name) = child_text(group, "TargetName") {
                    properties.target_name = Some(target_name.trim().to_string());
                }
            }
            Some(_) => {}
        }
    }

    /// Project name as listed in the solution
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved path of the `.vcxproj` file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Project GUID as written in the solution
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// Source items with their item kind, in document order
    pub fn sources(&self) -> &[SourceItem] {
        &self.sources
    }

    /// Paths of every source item in document order
    pub fn files(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.path.clone()).collect()
    }

    /// Entries of the `ProjectConfigurations` item group
    pub fn configurations(&self) -> &[String] {
        &self.configurations
    }

    /// Whether the project imports an `ExtensionTargets` group
    pub fn has_extension_targets(&self) -> bool {
        self.extension_targets
    }

    /// Unconditioned values followed by the values matching `config`
    fn union<T: Clone>(
        &self,
        config: &str,
        pick: impl Fn(&CompileSettings) -> &Vec<T>,
    ) -> Vec<T> {
        let mut values: Vec<T> = self.compile.get("").map(&pick).cloned().unwrap_or_default();
        if !config.is_empty()
            && let Some(settings) = self.compile.get(config)
        {
            values.extend(pick(settings).iter().cloned());
        }
        values
    }

    /// Preprocessor definitions for `config`
    pub fn defines(&self, config: &str) -> Vec<String> {
        self.union(config, |s| &s.defines)
    }

    /// Include directories with MSBuild macros substituted for `config`
    pub fn include_dirs(&self, config: &str) -> Vec<String> {
        let macros = self.macros.for_config(config);
        self.union(config, |s| &s.include_dirs)
            .iter()
            .map(|dir| normalize_lexically(&macros.substitute(dir)))
            .collect()
    }

    /// `AdditionalOptions` for `config`, split on whitespace
    pub fn compile_flags(&self, config: &str) -> Vec<String> {
        self.union(config, |s| &s.options)
    }

    /// Link settings for `config`, falling back to the unconditioned group
    pub fn link_settings(&self, config: &str) -> LinkSettings {
        self.link
            .get(config)
            .or_else(|| self.link.get(""))
            .cloned()
            .unwrap_or_default()
    }

    /// Raw `ConfigurationType` for `config`, falling back to the unconditioned group
    pub fn configuration_type(&self, config: &str) -> &str {
        self.configuration_types
            .get(config)
            .or_else(|| self.configuration_types.get(""))
            .map_or("", String::as_str)
    }

    /// Artifact type mapped from `ConfigurationType`
    pub fn project_type(&self, config: &str) -> ProjectType {
        match self.configuration_type(config) {
            "Application" => ProjectType::Executable,
            "DynamicLibrary" => ProjectType::SharedLibrary,
            _ => ProjectType::StaticLibrary,
        }
    }

    /// Output directory for `config` with macros substituted
    ///
    /// Uses the matching `OutDir`, else the unconditioned one, else the
    /// Visual Studio default for the configuration's platform.
    pub fn output_dir(&self, config: &str) -> String {
        let out_dir = [config, ""]
            .iter()
            .find_map(|key| self.properties.get(*key).and_then(|p| p.out_dir.clone()))
            .unwrap_or_else(|| default_out_dir(config).to_string());
        self.macros.for_config(config).substitute(&out_dir)
    }

    /// `TargetName` for `config`, else the project name
    pub fn target_name(&self, config: &str) -> String {
        [config, ""]
            .iter()
            .find_map(|key| self.properties.get(*key).and_then(|p| p.target_name.clone()))
            .unwrap_or_else(|| self.name.clone())
    }

    /// Full path of the artifact built for `config`
    ///
    /// Empty for the unresolved `""` configuration, whose output directory
    /// would still contain `$(Configuration)`.
    pub fn binary_path(&self, config: &str) -> String {
        if config.is_empty() {
            return String::new();
        }

        let extension = match self.project_type(config) {
            ProjectType::Executable => ".exe",
            ProjectType::SharedLibrary => ".dll",
            _ => ".lib",
        };

        let mut binary = self.output_dir(config);
        if !binary.is_empty() && !binary.ends_with('/') {
            binary.push('/');
        }
        binary.push_str(&self.target_name(config));
        binary.push_str(extension);
        binary
    }

    /// Write the project back to disk; not supported
    pub fn save(&self) -> Result<(), ProjectError> {
        Err(ProjectError::not_implemented("VcxProject::save"))
    }

    /// Add a source item; not supported
    pub fn add_file(&mut self, _file: &str) -> Result<(), ProjectError> {
        Err(ProjectError::not_implemented("VcxProject::add_file"))
    }

    /// Remove a source item; not supported
    pub fn remove_file(&mut self, _file: &str, _permanent: bool) -> Result<(), ProjectError> {
        Err(ProjectError::not_implemented("VcxProject::remove_file"))
    }
}

/// Condition key of an element: the quoted value after `==`, or `""`
fn condition_key(node: Node) -> String {
    node.attribute("Condition")
        .and_then(|condition| condition.split_once("=="))
        .map(|(_, value)| value.trim().trim_matches(|c: char| c == '\'' || c == '"').to_string())
        .unwrap_or_default()
}

fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
        .and_then(|child| child.text())
}

fn strip_inheritance(value: &str) -> String {
    INHERITANCE_MARKER.replace_all(value, "").to_string()
}

/// Split a delimited MSBuild list, dropping inheritance markers and empty entries
fn split_list(value: &str, delimiter: char) -> Vec<String> {
    strip_inheritance(value)
        .split(delimiter)
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn resolve_include(project_dir: &Path, dir: &str) -> String {
    if dir.starts_with("$(") {
        dir.to_string()
    } else {
        resolve_against(project_dir, dir)
    }
}

fn default_out_dir(config: &str) -> &'static str {
    let platform = if config.is_empty() {
        "Win32"
    } else {
        split_config(config).1
    };

    match platform {
        "Win32" | "x86" => "$(SolutionDir)$(Configuration)/",
        _ => "$(SolutionDir)$(Platform)/$(Configuration)/",
    }
}
