use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Semantic bucket a project file is shown under
///
/// Grouping depends on the file name only, never on the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FileGroup {
    #[serde(rename = "CMake Files")]
    CMakeFiles,
    #[serde(rename = "Header Files")]
    HeaderFiles,
    #[serde(rename = "Java Files")]
    JavaFiles,
    #[serde(rename = "Object Files")]
    ObjectFiles,
    #[serde(rename = "Source Files")]
    SourceFiles,
}

impl FileGroup {
    /// Classify a file path into its group by extension
    pub fn classify(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if path.file_name().and_then(|n| n.to_str()) == Some("CMakeLists.txt") {
            return Self::CMakeFiles;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some("c" | "cc" | "cxx" | "cpp" | "m" | "mm") => Self::SourceFiles,
            Some("h" | "hh" | "hpp" | "hxx") => Self::HeaderFiles,
            Some("java") => Self::JavaFiles,
            _ => Self::ObjectFiles,
        }
    }

    /// Display name used by the tree view
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CMakeFiles => "CMake Files",
            Self::HeaderFiles => "Header Files",
            Self::JavaFiles => "Java Files",
            Self::ObjectFiles => "Object Files",
            Self::SourceFiles => "Source Files",
        }
    }
}

impl fmt::Display for FileGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group name for a path, as a plain string
pub fn group_name(path: impl AsRef<Path>) -> &'static str {
    FileGroup::classify(path).as_str()
}
