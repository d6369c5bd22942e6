use std::env;

/// Default MSBuild executable used in Visual Studio build commands
pub const DEFAULT_MSBUILD: &str = "msbuild";

/// Host-dependent settings shared by the importers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImporterConfig {
    /// Executable used for MSBuild build and clean commands
    pub msbuild_path: String,

    /// Whether the host can run the full MSBuild toolchain, which is what
    /// makes Visual Studio projects writable
    pub msvc_host: bool,

    /// Whether GN targets pick up system includes from `environment.<cpu>`
    pub system_includes: bool,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            msbuild_path: DEFAULT_MSBUILD.to_string(),
            msvc_host: cfg!(windows),
            system_includes: cfg!(windows),
        }
    }
}

impl ImporterConfig {
    /// Create ImporterConfig from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(msbuild) = env::var("MSBUILD_PATH")
            && !msbuild.is_empty()
        {
            config.msbuild_path = msbuild;
        }
        config
    }

    /// Override values from CLI arguments
    pub fn with_overrides(mut self, msbuild_path: Option<String>) -> Self {
        if let Some(msbuild_path) = msbuild_path {
            self.msbuild_path = msbuild_path;
        }
        self
    }
}
