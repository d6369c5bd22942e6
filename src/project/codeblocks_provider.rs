use roxmltree::{Document, Node};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::project::paths::{files_with_extension, parent_dir, resolve_against};
use crate::project::vs::BUILD_FILES_DIR;
use crate::project::{
    ConfigurationValues, ImportResult, ProjectError, ProjectImporter, ProjectModel, ProjectType,
};

/// One `Build/Target` element of a Code::Blocks project
#[derive(Debug, Clone, PartialEq, Eq)]
struct CodeBlocksTarget {
    title: String,
    kind: String,
    output: String,
    object_output: String,
    working_dir: String,
    include_dirs: Vec<String>,
    options: Vec<String>,
    files: Vec<String>,
}

impl CodeBlocksTarget {
    fn parse(node: Node) -> Option<Self> {
        let title = node.attribute("title")?.to_string();
        let mut target = Self {
            title,
            kind: String::new(),
            output: String::new(),
            object_output: String::new(),
            working_dir: String::new(),
            include_dirs: Vec::new(),
            options: Vec::new(),
            files: Vec::new(),
        };

        for child in node.children().filter(Node::is_element) {
            match child.tag_name().name() {
                "Option" => {
                    if let Some(kind) = child.attribute("type") {
                        target.kind = kind.to_string();
                    }
                    if let Some(output) = child.attribute("output") {
                        target.output = output.to_string();
                    }
                    if let Some(object_output) = child.attribute("object_output") {
                        target.object_output = object_output.to_string();
                    }
                    if let Some(working_dir) = child.attribute("working_dir") {
                        target.working_dir = working_dir.to_string();
                    }
                }
                "Compiler" => {
                    for add in child
                        .children()
                        .filter(|n| n.is_element() && n.tag_name().name() == "Add")
                    {
                        if let Some(directory) = add.attribute("directory") {
                            target.include_dirs.push(directory.to_string());
                        }
                        if let Some(option) = add.attribute("option") {
                            target.options.push(option.to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        Some(target)
    }

    /// Type for the numeric `type` option; `None` for non-artifact targets
    fn project_type(&self) -> Option<ProjectType> {
        match self.kind.as_str() {
            "1" => Some(ProjectType::Executable),
            "2" => Some(ProjectType::StaticLibrary),
            "3" => Some(ProjectType::SharedLibrary),
            _ => None,
        }
    }
}

/// Importer for Code::Blocks `.cbp` projects, as generated by CMake's
/// "CodeBlocks" extra generator
pub struct CodeBlocksProvider;

impl CodeBlocksProvider {
    /// Create a new Code::Blocks provider
    pub fn new() -> Self {
        Self
    }

    fn parse_targets(&self, path: &Path, content: &str) -> Result<Vec<CodeBlocksTarget>, ProjectError> {
        let document = Document::parse(content.trim_start_matches('\u{feff}'))
            .map_err(|e| ProjectError::xml(path, e))?;
        let root = document.root_element();
        if root.tag_name().name() != "CodeBlocks_project_file" {
            return Err(ProjectError::xml(path, "root element is not <CodeBlocks_project_file>"));
        }

        let Some(project) = child_element(root, "Project") else {
            warn!("No <Project> element in {}", path.display());
            return Ok(Vec::new());
        };

        let mut targets: Vec<CodeBlocksTarget> = child_element(project, "Build")
            .map(|build| {
                build
                    .children()
                    .filter(|n| n.is_element() && n.tag_name().name() == "Target")
                    .filter_map(CodeBlocksTarget::parse)
                    .collect()
            })
            .unwrap_or_default();

        let cbp_dir = parent_dir(path);
        for unit in project
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "Unit")
        {
            let Some(filename) = unit.attribute("filename") else {
                continue;
            };
            let file = resolve_against(cbp_dir, filename);

            for owner in unit
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "Option")
                .filter_map(|option| option.attribute("target"))
                .filter(|owner| !owner.is_empty())
            {
                match targets.iter_mut().find(|t| t.title == owner) {
                    Some(target) => target.files.push(file.clone()),
                    None => debug!("Unit {} references unknown target {}", filename, owner),
                }
            }
        }

        Ok(targets)
    }

    fn build_project(&self, container: &str, cbp_dir: &Path, target: CodeBlocksTarget) -> Option<ProjectModel> {
        let project_type = match target.project_type() {
            Some(project_type) => project_type,
            None if !target.files.is_empty() => ProjectType::SourceSet,
            None => {
                debug!("Skipping Code::Blocks target {} (type {})", target.title, target.kind);
                return None;
            }
        };

        let dir = cbp_dir.display();
        let root_dir = [&target.working_dir, &target.object_output]
            .into_iter()
            .find(|candidate| !candidate.is_empty())
            .cloned()
            .unwrap_or_else(|| cbp_dir.to_string_lossy().to_string());

        let values = ConfigurationValues {
            root_dir,
            binary_path: target.output,
            project_type,
            defines: Vec::new(),
            include_dirs: target.include_dirs,
            compile_flags: target.options,
            build_command: format!("cmake --build {dir} --target {}", target.title),
            clean_command: format!("cmake --build {dir} --target clean"),
        };

        Some(ProjectModel::new(
            target.title.clone(),
            format!("{container}:{}", target.title),
            target.files,
            BTreeMap::from([(String::new(), values)]),
            true,
        ))
    }
}

impl ProjectImporter for CodeBlocksProvider {
    fn name(&self) -> &str {
        "codeblocks"
    }

    fn discover(&self, root: &Path) -> Vec<PathBuf> {
        files_with_extension(&root.join(BUILD_FILES_DIR), "cbp")
    }

    fn import(&self, path: &Path) -> Result<ImportResult, ProjectError> {
        if !path.exists() {
            warn!("Code::Blocks project not found: {}", path.display());
            return Ok(ImportResult::empty());
        }

        let content = fs::read_to_string(path)?;
        let targets = self.parse_targets(path, &content)?;
        let target_count = targets.len();

        let container = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let cbp_dir = parent_dir(path);

        let projects: Vec<ProjectModel> = targets
            .into_iter()
            .filter_map(|target| self.build_project(&container, cbp_dir, target))
            .collect();

        info!(
            "Imported {} of {} Code::Blocks targets from {}",
            projects.len(),
            target_count,
            path.display()
        );

        Ok(ImportResult::new(projects, Vec::new()))
    }
}

impl Default for CodeBlocksProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{ConfigSelector, FileGroup};
    use crate::test_utils::integration::TestWorkspace;

    // Auto-initialize logging for all tests in this module
    #[cfg(feature = "test-logging")]
    #[ctor::ctor]
    fn init_test_logging() {
        crate::test_utils::logging::init();
    }

    fn write_cbp(dir: &Path, xml: &str) -> PathBuf {
        let build_files = dir.join(BUILD_FILES_DIR);
        fs::create_dir_all(&build_files).unwrap();
        let path = build_files.join("Project.cbp");
        fs::write(&path, xml).unwrap();
        path
    }

    fn find<'a>(result: &'a ImportResult, name: &str) -> &'a ProjectModel {
        result
            .projects
            .iter()
            .find(|p| p.name() == name)
            .unwrap_or_else(|| panic!("target {name} not imported"))
    }

    #[test]
    fn test_fixture_targets() {
        let workspace = TestWorkspace::codeblocks();
        let provider = CodeBlocksProvider::new();
        let projects = provider.discover(workspace.path());
        assert_eq!(projects, [workspace.path().join("BuildFiles/Project.cbp")]);

        let result = provider.import(&projects[0]).unwrap();
        assert!(result.configurations.is_empty());

        let mut names: Vec<_> = result.projects.iter().map(|p| p.name()).collect();
        names.sort();
        assert_eq!(names, ["hello", "util"]);

        let hello = find(&result, "hello");
        let selector = ConfigSelector::new(&result.configurations);
        assert_eq!(hello.full_name(), "Project.cbp:hello");
        assert_eq!(hello.project_type(&selector), Some(ProjectType::Executable));
        assert_eq!(hello.binary_path(&selector), "/tmp/hello/build/hello");
        assert_eq!(hello.root_dir(&selector), "/tmp/hello/build");
        assert_eq!(hello.defines(&selector), ["HELLO_VERSION=2"]);
        assert_eq!(hello.include_dirs(&selector), ["/tmp/hello/include"]);
        assert_eq!(hello.cpp_standard(&selector), "14");

        let dir = workspace.path().join("BuildFiles");
        assert_eq!(
            hello.build_command(&selector),
            format!("cmake --build {} --target hello", dir.display())
        );
        assert_eq!(
            hello.clean_command(&selector),
            format!("cmake --build {} --target clean", dir.display())
        );

        let util = find(&result, "util");
        assert_eq!(util.project_type(&selector), Some(ProjectType::StaticLibrary));
        assert_eq!(util.files(), ["/tmp/hello/src/util.cpp", "/tmp/hello/src/common.h"]);
    }

    #[test]
    fn test_unit_shared_by_targets() {
        let workspace = TestWorkspace::codeblocks();
        let result = CodeBlocksProvider::new()
            .import(&workspace.path().join("BuildFiles/Project.cbp"))
            .unwrap();

        let hello = find(&result, "hello");
        assert!(hello.files().contains(&"/tmp/hello/src/common.h".to_string()));
        assert_eq!(
            hello.files_by_group()[&FileGroup::SourceFiles],
            ["/tmp/hello/src/main.cpp"]
        );
        assert!(!hello.files().iter().any(|f| f.ends_with("CMakeLists.txt")));
    }

    #[test]
    fn test_command_targets_dropped_unless_source_bearing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_cbp(
            dir.path(),
            r#"<?xml version="1.0" encoding="UTF-8"?>
<CodeBlocks_project_file>
  <Project>
    <Build>
      <Target title="all"><Option type="4"/></Target>
      <Target title="generated"><Option type="4"/></Target>
      <Target title="tool"><Option type="1"/></Target>
    </Build>
    <Unit filename="gen/out.cpp"><Option target="generated"/></Unit>
    <Unit filename="orphan.cpp"><Option target="missing"/></Unit>
    <Unit filename="CMakeLists.txt"></Unit>
  </Project>
</CodeBlocks_project_file>"#,
        );

        let result = CodeBlocksProvider::new().import(&path).unwrap();
        let mut names: Vec<_> = result.projects.iter().map(|p| p.name()).collect();
        names.sort();
        assert_eq!(names, ["generated", "tool"]);

        let generated = find(&result, "generated");
        assert_eq!(generated.project_type_map()[""], ProjectType::SourceSet);

        // Relative units resolve against the .cbp directory
        let expected = dir.path().join("BuildFiles").join("gen/out.cpp");
        assert_eq!(generated.files(), [expected.to_string_lossy().to_string()]);

        // Without working_dir or object_output the .cbp directory is used
        let tool = find(&result, "tool");
        assert_eq!(
            tool.root_dir_map()[""],
            dir.path().join("BuildFiles").to_string_lossy()
        );
        assert!(tool.files().is_empty());
    }

    #[test]
    fn test_parent_relative_units_are_normalized() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_cbp(
            dir.path(),
            r#"<CodeBlocks_project_file>
  <Project>
    <Build>
      <Target title="hello"><Option type="1"/></Target>
    </Build>
    <Unit filename="../src/main.cpp"><Option target="hello"/></Unit>
    <Unit filename="./../include/./hello.h"><Option target="hello"/></Unit>
  </Project>
</CodeBlocks_project_file>"#,
        );

        let mut result = CodeBlocksProvider::new().import(&path).unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let hello = &mut result.projects[0];
        assert_eq!(
            hello.files(),
            [format!("{root}/src/main.cpp"), format!("{root}/include/hello.h")]
        );

        // The absolute spelling names the same file
        assert!(!hello.add_file(format!("{root}/src/main.cpp")));
        assert!(hello.delete_file(&format!("{root}/include/hello.h")));
        assert_eq!(hello.files().len(), 1);
    }

    #[test]
    fn test_reimport_is_deterministic() {
        let workspace = TestWorkspace::codeblocks();
        let path = workspace.path().join("BuildFiles/Project.cbp");
        let provider = CodeBlocksProvider::new();
        assert_eq!(provider.import(&path).unwrap(), provider.import(&path).unwrap());
    }

    #[test]
    fn test_missing_sections_yield_no_targets() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_cbp(
            dir.path(),
            "<CodeBlocks_project_file><FileVersion major=\"1\"/></CodeBlocks_project_file>",
        );
        let result = CodeBlocksProvider::new().import(&path).unwrap();
        assert!(result.projects.is_empty());
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write_cbp(dir.path(), "<CodeBlocks_project_file><Project>");
        let err = CodeBlocksProvider::new().import(&path).unwrap_err();
        assert!(matches!(err, ProjectError::Xml { .. }));
    }

    #[test]
    fn test_missing_project_is_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        let provider = CodeBlocksProvider::new();
        assert!(provider.discover(dir.path()).is_empty());
        let result = provider
            .import(&dir.path().join("BuildFiles/Project.cbp"))
            .unwrap();
        assert!(result.projects.is_empty());
    }
}
