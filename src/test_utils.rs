//! Test utilities and global setup
//!
//! Provides centralized test logging configuration and fixture workspaces.

/// Test logging utilities
#[cfg(all(test, feature = "test-logging"))]
pub mod logging {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize test logging globally - safe to call multiple times
    ///
    /// For automatic initialization in a test module:
    /// ```rust
    /// #[cfg(test)]
    /// mod tests {
    ///     // Auto-initialize logging for all tests in this module
    ///     #[cfg(feature = "test-logging")]
    ///     #[ctor::ctor]
    ///     fn init_test_logging() {
    ///         crate::test_utils::logging::init();
    ///     }
    /// }
    /// ```
    ///
    /// # Environment Variables
    ///
    /// - `RUST_LOG`: Controls log level (default: "debug")
    ///
    /// ```bash
    /// RUST_LOG=cpp_solution_explorer::project::vs=trace cargo test --features test-logging
    /// ```
    pub fn init() {
        INIT.call_once(|| {
            let env_filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

            fmt()
                .with_env_filter(env_filter)
                .with_test_writer() // Ensures logs don't interfere with test output
                .with_target(true)
                .compact()
                .try_init()
                .ok(); // Ignore errors if already initialized by another test
        });
    }
}

/// Fixture workspaces copied from test/fixtures
#[cfg(test)]
pub mod integration {
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use walkdir::WalkDir;

    const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/test/fixtures");

    /// Temporary copy of one fixture tree, removed on drop
    pub struct TestWorkspace {
        _temp_dir: TempDir, // Underscore prefix keeps it alive until drop
        pub root: PathBuf,
    }

    impl TestWorkspace {
        /// Copy the named fixture directory into a fresh temporary root
        pub fn from_fixture(name: &str) -> Result<Self, std::io::Error> {
            let temp_dir = TempDir::new()?;
            // Canonical so paths compare equal with what importers produce
            let root = temp_dir.path().canonicalize()?;
            copy_dir_recursively(&Self::fixture_path(name), &root)?;

            Ok(TestWorkspace {
                _temp_dir: temp_dir,
                root,
            })
        }

        /// GN workspace with a `gn.json` at the root
        pub fn gn() -> Self {
            Self::from_fixture("gn").expect("failed to copy gn fixture")
        }

        /// Visual Studio solution with two projects
        pub fn vs() -> Self {
            Self::from_fixture("vs").expect("failed to copy vs fixture")
        }

        /// Code::Blocks project under BuildFiles/
        pub fn codeblocks() -> Self {
            Self::from_fixture("codeblocks").expect("failed to copy codeblocks fixture")
        }

        /// Location of a pristine fixture in the source tree
        pub fn fixture_path(name: &str) -> PathBuf {
            Path::new(FIXTURES_DIR).join(name)
        }

        /// Get the workspace root path
        pub fn path(&self) -> &Path {
            &self.root
        }
    }

    fn copy_dir_recursively(src: &Path, dst: &Path) -> Result<(), std::io::Error> {
        if !src.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Source directory {} does not exist", src.display()),
            ));
        }

        for entry in WalkDir::new(src) {
            let entry = entry?;
            let rel_path = entry
                .path()
                .strip_prefix(src)
                .map_err(std::io::Error::other)?;
            let dst_path = dst.join(rel_path);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dst_path)?;
            } else {
                fs::copy(entry.path(), &dst_path)?;
            }
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_fixture_copied() {
            let workspace = TestWorkspace::vs();
            assert!(workspace.path().join("demo.sln").exists());
            assert!(workspace.path().join("app/app.vcxproj").exists());
            assert!(workspace.path().join("core/core.vcxproj").exists());
        }

        #[test]
        fn test_workspaces_are_independent() {
            let first = TestWorkspace::gn();
            let second = TestWorkspace::gn();
            fs::remove_file(first.path().join("gn.json")).unwrap();
            assert!(second.path().join("gn.json").exists());
            assert!(TestWorkspace::fixture_path("gn").join("gn.json").exists());
        }

        #[test]
        fn test_copy_dir_recursively_missing_source() {
            let temp_dir = TempDir::new().unwrap();
            let result = copy_dir_recursively(Path::new("nonexistent/path"), temp_dir.path());
            assert!(result.is_err());
            assert_eq!(result.unwrap_err().kind(), std::io::ErrorKind::NotFound);
        }
    }
}
