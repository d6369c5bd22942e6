use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::project::ProjectError;
use crate::project::paths::{normalize_separators, parent_dir, resolve_against};

/// Project names CMake adds to every solution it generates
const CMAKE_UTILITY_PROJECTS: [&str; 2] = ["ALL_BUILD", "ZERO_CHECK"];

/// A `Project(...) = ...` entry that points at a `.vcxproj`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionProject {
    pub name: String,
    /// `.vcxproj` path resolved against the solution directory
    pub path: PathBuf,
    /// Project GUID as written in the solution, braces included
    pub uuid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    SolutionConfigurations,
    ProjectConfigurations,
}

/// Parsed `.sln` text
///
/// Only the parts needed to assemble projects are kept: the `.vcxproj`
/// entries, the solution configuration names and the `ActiveCfg` mapping
/// from `(project GUID, solution configuration)` to a project configuration.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    path: PathBuf,
    projects: Vec<SolutionProject>,
    configurations: Vec<String>,
    project_configs: HashMap<(String, String), String>,
    cmake_generated: bool,
}

impl Solution {
    /// Read and parse a solution file
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(path, &content))
    }

    /// Parse solution text; malformed lines and sections are skipped
    pub fn parse(path: &Path, content: &str) -> Self {
        let solution_dir = parent_dir(path);
        let mut solution = Self {
            path: path.to_path_buf(),
            ..Self::default()
        };

        let mut section = Section::Outside;
        for line in content.trim_start_matches('\u{feff}').lines() {
            let line = line.trim();

            if line.starts_with("EndGlobalSection") {
                section = Section::Outside;
                continue;
            }

            match section {
                Section::SolutionConfigurations => {
                    solution.push_solution_config(line);
                    continue;
                }
                Section::ProjectConfigurations => {
                    solution.push_project_config(line);
                    continue;
                }
                Section::Outside => {}
            }

            if line.starts_with("Project(") {
                solution.push_project(solution_dir, line);
            } else if line.starts_with("GlobalSection(SolutionConfigurationPlatforms)") {
                section = Section::SolutionConfigurations;
            } else if line.starts_with("GlobalSection(ProjectConfigurationPlatforms)") {
                section = Section::ProjectConfigurations;
            }
        }

        debug!(
            "Solution {} lists {} projects and {} configurations",
            path.display(),
            solution.projects.len(),
            solution.configurations.len()
        );
        solution
    }

    fn push_project(&mut self, solution_dir: &Path, line: &str) {
        let parts: Vec<&str> = line.split(',').collect();
        let [head, project_path, uuid, ..] = parts.as_slice() else {
            warn!("Malformed project entry in {}: {}", self.path.display(), line);
            return;
        };

        let Some((_, name)) = head.split_once('=') else {
            warn!("Malformed project entry in {}: {}", self.path.display(), line);
            return;
        };
        let name = unquote(name);
        let project_path = unquote(project_path);
        let uuid = unquote(uuid);

        if CMAKE_UTILITY_PROJECTS.contains(&name) {
            self.cmake_generated = true;
        }

        if !project_path.ends_with("vcxproj") {
            debug!("Skipping non-vcxproj solution entry {}", name);
            return;
        }

        self.projects.push(SolutionProject {
            name: name.to_string(),
            path: PathBuf::from(resolve_against(
                solution_dir,
                &normalize_separators(project_path),
            )),
            uuid: uuid.to_string(),
        });
    }

    fn push_solution_config(&mut self, line: &str) {
        let name = line.split('=').next().unwrap_or_default().trim();
        if !name.is_empty() && !self.configurations.iter().any(|c| c == name) {
            self.configurations.push(name.to_string());
        }
    }

    fn push_project_config(&mut self, line: &str) {
        let Some((property, project_config)) = line.split_once('=') else {
            return;
        };
        let Some(property) = property.trim().strip_suffix(".ActiveCfg") else {
            return;
        };
        let Some((uuid, solution_config)) = property.split_once('.') else {
            return;
        };

        self.project_configs.insert(
            (uuid_key(uuid), solution_config.to_string()),
            project_config.trim().to_string(),
        );
    }

    /// Path of the `.sln` file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the solution file
    pub fn directory(&self) -> &Path {
        parent_dir(&self.path)
    }

    /// `.vcxproj` entries in file order
    pub fn projects(&self) -> &[SolutionProject] {
        &self.projects
    }

    /// Solution configuration names in file order
    pub fn configurations(&self) -> &[String] {
        &self.configurations
    }

    /// Project configuration active for a solution configuration
    ///
    /// Returns `""` when the solution has no `ActiveCfg` entry for the pair.
    pub fn project_config(&self, uuid: &str, solution_config: &str) -> &str {
        self.project_configs
            .get(&(uuid_key(uuid), solution_config.to_string()))
            .map_or("", String::as_str)
    }

    /// Whether the solution was generated by CMake rather than authored in
    /// Visual Studio
    pub fn is_cmake_generated(&self) -> bool {
        self.cmake_generated
    }

    /// Write the solution back to disk; not supported
    pub fn save(&self) -> Result<(), ProjectError> {
        Err(ProjectError::not_implemented("Solution::save"))
    }

    /// Add a project entry; not supported
    pub fn add_project(&mut self, _project: SolutionProject) -> Result<(), ProjectError> {
        Err(ProjectError::not_implemented("Solution::add_project"))
    }

    /// Remove a project entry; not supported
    pub fn remove_project(&mut self, _uuid: &str) -> Result<(), ProjectError> {
        Err(ProjectError::not_implemented("Solution::remove_project"))
    }

    /// Add a solution configuration; not supported
    pub fn add_configuration(&mut self, _copy_from: Option<&str>) -> Result<(), ProjectError> {
        Err(ProjectError::not_implemented("Solution::add_configuration"))
    }
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"')
}

/// Case-insensitive lookup key for a project GUID
fn uuid_key(raw: &str) -> String {
    let raw = raw.trim();
    Uuid::parse_str(raw)
        .map(|uuid| uuid.hyphenated().to_string())
        .unwrap_or_else(|_| raw.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLN: &str = r#"
Microsoft Visual Studio Solution File, Format Version 12.00
# Visual Studio Version 17
Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91F3942}") = "app", "app\app.vcxproj", "{11111111-2222-3333-4444-555555555555}"
EndProject
Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91F3942}") = "core", "core\core.vcxproj", "{AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE}"
	ProjectSection(ProjectDependencies) = postProject
	EndProjectSection
EndProject
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "Docs", "Docs", "{99999999-2222-3333-4444-555555555555}"
EndProject
Global
	GlobalSection(SolutionConfigurationPlatforms) = preSolution
		Debug|x64 = Debug|x64
		Release|x64 = Release|x64
	EndGlobalSection
	GlobalSection(ProjectConfigurationPlatforms) = postSolution
		{11111111-2222-3333-4444-555555555555}.Debug|x64.ActiveCfg = Debug|x64
		{11111111-2222-3333-4444-555555555555}.Debug|x64.Build.0 = Debug|x64
		{11111111-2222-3333-4444-555555555555}.Release|x64.ActiveCfg = Release|x64
		{aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee}.Debug|x64.ActiveCfg = Debug|Win32
	EndGlobalSection
EndGlobal
"#;

    fn parse() -> Solution {
        Solution::parse(Path::new("/work/demo.sln"), SLN)
    }

    #[test]
    fn test_projects_keep_only_vcxproj() {
        let solution = parse();
        let names: Vec<_> = solution.projects().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["app", "core"]);
        assert_eq!(solution.projects()[0].path, PathBuf::from("/work/app/app.vcxproj"));
        assert_eq!(solution.projects()[1].uuid, "{AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE}");
        assert!(!solution.is_cmake_generated());
    }

    #[test]
    fn test_configuration_names_from_left_hand_side() {
        assert_eq!(parse().configurations(), ["Debug|x64", "Release|x64"]);
    }

    #[test]
    fn test_active_cfg_lookup() {
        let solution = parse();
        let app = "{11111111-2222-3333-4444-555555555555}";
        assert_eq!(solution.project_config(app, "Debug|x64"), "Debug|x64");
        assert_eq!(solution.project_config(app, "Release|x64"), "Release|x64");

        // GUIDs compare without regard to case
        let core = "{AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE}";
        assert_eq!(solution.project_config(core, "Debug|x64"), "Debug|Win32");
    }

    #[test]
    fn test_lookup_miss_is_empty() {
        let solution = parse();
        let core = "{AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE}";
        assert_eq!(solution.project_config(core, "Release|x64"), "");
        assert_eq!(solution.project_config("{unknown}", "Debug|x64"), "");
    }

    #[test]
    fn test_missing_sections_degrade() {
        let solution = Solution::parse(
            Path::new("broken.sln"),
            "Project(\"{X}\") = \"only name\"\nGlobal\nEndGlobal\n",
        );
        assert!(solution.projects().is_empty());
        assert!(solution.configurations().is_empty());
        assert_eq!(solution.directory(), Path::new("."));
    }

    #[test]
    fn test_cmake_generated_detection() {
        let sln = r#"
Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91F3942}") = "ALL_BUILD", "ALL_BUILD.vcxproj", "{3E2B0C51-0000-0000-0000-000000000001}"
EndProject
Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91F3942}") = "hello", "hello.vcxproj", "{3E2B0C51-0000-0000-0000-000000000002}"
EndProject
"#;
        let solution = Solution::parse(Path::new("/p/BuildFiles/hello.sln"), sln);
        assert!(solution.is_cmake_generated());
        assert_eq!(solution.projects().len(), 2);
    }

    #[test]
    fn test_mutations_are_not_implemented() {
        let mut solution = parse();
        assert!(matches!(solution.save(), Err(ProjectError::NotImplemented { .. })));
        assert!(matches!(
            solution.remove_project("{x}"),
            Err(ProjectError::NotImplemented { .. })
        ));
        assert!(matches!(
            solution.add_configuration(None),
            Err(ProjectError::NotImplemented { .. })
        ));
    }
}
