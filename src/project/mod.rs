//! Build metadata import
//!
//! This module turns the metadata of different build systems into one
//! configuration-aware project model through a provider pattern. Each
//! importer detects and parses the marker files of its build system.

pub mod codeblocks_provider;
pub mod compile_flags;
pub mod config;
pub mod config_selector;
pub mod error;
pub mod file_group;
pub mod gn_provider;
pub mod model;
pub mod paths;
pub mod provider;
pub mod scanner;
pub mod vs;
pub mod workspace;

pub use codeblocks_provider::CodeBlocksProvider;
pub use compile_flags::CompileFlags;
pub use config::ImporterConfig;
pub use config_selector::ConfigSelector;
pub use error::ProjectError;
pub use file_group::FileGroup;
pub use gn_provider::GnProvider;
pub use model::{
    BuildTask, ConfigurationValues, LaunchConfig, PerConfig, ProjectModel, ProjectType,
    PropertyConfig, PropertyConfiguration,
};
pub use provider::{ImportResult, ImporterRegistry, ProjectImporter};
pub use scanner::ProjectScanner;
pub use vs::VsProvider;
pub use workspace::{LaunchDocument, ProjectWorkspace, TasksDocument};
