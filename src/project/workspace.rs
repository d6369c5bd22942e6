use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::project::{
    BuildTask, ConfigSelector, LaunchConfig, ProjectError, ProjectModel, PropertyConfig,
};

/// `tasks.json` document written for the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasksDocument {
    pub version: String,
    pub tasks: Vec<BuildTask>,
}

/// `launch.json` document written for the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchDocument {
    pub version: String,
    pub configurations: Vec<LaunchConfig>,
}

/// Result of one import pass over a workspace root
///
/// A ProjectWorkspace is never updated in place by a re-import: the next
/// pass builds a new one and `replace_with` swaps it in wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectWorkspace {
    /// Root directory that was scanned
    pub project_root_path: PathBuf,

    /// Importer that produced the projects (e.g., "gn", "vs"), empty if none matched
    pub provider_type: String,

    /// Imported projects in import order
    pub projects: Vec<ProjectModel>,

    /// Configuration names reported by the importer, empty for GN and Code::Blocks
    pub configurations: Vec<String>,

    /// Active configuration used by the single-value accessors
    pub selector: ConfigSelector,

    /// Timestamp when this project workspace was imported
    pub discovered_at: DateTime<Utc>,
}

impl ProjectWorkspace {
    /// Create a new project workspace with the first configuration active
    pub fn new(
        project_root_path: PathBuf,
        provider_type: String,
        projects: Vec<ProjectModel>,
        configurations: Vec<String>,
    ) -> Self {
        let selector = ConfigSelector::new(&configurations);
        Self {
            project_root_path,
            provider_type,
            projects,
            configurations,
            selector,
            discovered_at: Utc::now(),
        }
    }

    /// Get a project by its full name
    pub fn get_project(&self, full_name: &str) -> Option<&ProjectModel> {
        self.projects.iter().find(|p| p.full_name() == full_name)
    }

    /// Get a mutable project by its full name, for file additions and removals
    pub fn get_project_mut(&mut self, full_name: &str) -> Option<&mut ProjectModel> {
        self.projects.iter_mut().find(|p| p.full_name() == full_name)
    }

    /// Get the number of imported projects
    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Make another configuration active
    pub fn select_configuration(&mut self, name: &str) -> Result<(), ProjectError> {
        self.selector.select(name)
    }

    /// Build and clean task of every project for the active configuration
    pub fn build_tasks(&self) -> Vec<BuildTask> {
        self.projects
            .iter()
            .flat_map(|p| [p.build_task(&self.selector), p.clean_task(&self.selector)])
            .collect()
    }

    /// Launch descriptors of the executable projects
    pub fn launch_configurations(&self) -> Vec<LaunchConfig> {
        self.projects
            .iter()
            .filter_map(|p| p.launch_config(&self.selector))
            .collect()
    }

    /// Compiler properties of one project for the active configuration
    pub fn property_config(&self, full_name: &str) -> Result<PropertyConfig, ProjectError> {
        self.get_project(full_name)
            .map(|p| p.property_config(&self.selector))
            .ok_or_else(|| ProjectError::ProjectNotFound {
                full_name: full_name.to_string(),
            })
    }

    pub fn tasks_document(&self) -> TasksDocument {
        TasksDocument {
            version: "2.0.0".to_string(),
            tasks: self.build_tasks(),
        }
    }

    pub fn launch_document(&self) -> LaunchDocument {
        LaunchDocument {
            version: "0.2.0".to_string(),
            configurations: self.launch_configurations(),
        }
    }

    /// Replace this workspace with the result of a newer import pass
    ///
    /// The active configuration carries over when the new pass still
    /// reports it.
    pub fn replace_with(&mut self, other: ProjectWorkspace) {
        let active = self.selector.active().to_string();
        *self = other;
        if !active.is_empty() && self.selector.select(&active).is_err() {
            tracing::debug!("Configuration {} no longer available", active);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{ConfigurationValues, ProjectType};
    use std::collections::BTreeMap;

    fn project(name: &str, project_type: ProjectType, configs: &[&str]) -> ProjectModel {
        let configurations: BTreeMap<String, ConfigurationValues> = configs
            .iter()
            .map(|config| {
                (
                    config.to_string(),
                    ConfigurationValues {
                        root_dir: "/out".to_string(),
                        binary_path: name.to_string(),
                        defines: vec![format!("CFG_{}", config.replace('|', "_"))],
                        build_command: format!("build {name} {config}"),
                        clean_command: format!("clean {name} {config}"),
                        ..ConfigurationValues::new(project_type)
                    },
                )
            })
            .collect();

        ProjectModel::new(name, format!("demo.sln:{name}"), vec![], configurations, true)
    }

    fn workspace() -> ProjectWorkspace {
        let configs = ["Debug|x64", "Release|x64"];
        ProjectWorkspace::new(
            PathBuf::from("/work"),
            "vs".to_string(),
            vec![
                project("app", ProjectType::Executable, &configs),
                project("core", ProjectType::StaticLibrary, &configs),
            ],
            configs.iter().map(|c| c.to_string()).collect(),
        )
    }

    #[test]
    fn test_tasks_follow_active_configuration() {
        let mut workspace = workspace();
        let tasks = workspace.build_tasks();
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[0].label, "build demo.sln:app");
        assert_eq!(tasks[0].command, "build app Debug|x64");
        assert_eq!(tasks[1].label, "clean demo.sln:app");

        workspace.select_configuration("Release|x64").unwrap();
        assert_eq!(workspace.build_tasks()[0].command, "build app Release|x64");
    }

    #[test]
    fn test_unknown_configuration_rejected() {
        let mut workspace = workspace();
        let err = workspace.select_configuration("Profile|x64").unwrap_err();
        assert!(matches!(err, ProjectError::UnknownConfiguration { .. }));
        assert_eq!(workspace.selector.active(), "Debug|x64");
    }

    #[test]
    fn test_launch_only_for_executables() {
        let workspace = workspace();
        let launch = workspace.launch_document();
        assert_eq!(launch.version, "0.2.0");
        assert_eq!(launch.configurations.len(), 1);
        assert_eq!(launch.configurations[0].name, "app");
        assert_eq!(launch.configurations[0].program, "/out/app");
        assert_eq!(launch.configurations[0].pre_launch_task, "build demo.sln:app");
    }

    #[test]
    fn test_property_config_lookup() {
        let workspace = workspace();
        let properties = workspace.property_config("demo.sln:core").unwrap();
        assert_eq!(properties.version, 4);
        assert_eq!(properties.configurations[0].defines, ["CFG_Debug_x64"]);

        let err = workspace.property_config("demo.sln:missing").unwrap_err();
        assert!(matches!(err, ProjectError::ProjectNotFound { .. }));
    }

    #[test]
    fn test_documents_serialize_in_editor_shape() {
        let workspace = workspace();
        let tasks = serde_json::to_value(workspace.tasks_document()).unwrap();
        assert_eq!(tasks["version"], "2.0.0");
        assert_eq!(tasks["tasks"][0]["type"], "shell");

        let launch = serde_json::to_value(workspace.launch_document()).unwrap();
        assert_eq!(launch["configurations"][0]["preLaunchTask"], "build demo.sln:app");
        assert_eq!(launch["configurations"][0]["type"], "cppdbg");
    }

    #[test]
    fn test_replace_with_keeps_available_selection() {
        let mut current = workspace();
        current.select_configuration("Release|x64").unwrap();

        current.replace_with(workspace());
        assert_eq!(current.selector.active(), "Release|x64");

        current.replace_with(ProjectWorkspace::new(
            PathBuf::from("/work"),
            "gn".to_string(),
            vec![],
            vec![],
        ));
        assert_eq!(current.selector.active(), "");
        assert_eq!(current.project_count(), 0);
    }

    #[test]
    fn test_file_edits_through_workspace() {
        let mut workspace = workspace();
        let app = workspace.get_project_mut("demo.sln:app").unwrap();
        assert!(app.add_file("src/x.cpp"));
        assert!(!app.add_file("src/x.cpp"));
        assert!(!app.delete_file("src/missing.cpp"));
        assert_eq!(workspace.get_project("demo.sln:app").unwrap().files(), ["src/x.cpp"]);
    }
}
