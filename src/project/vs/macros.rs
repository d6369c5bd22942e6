//! Literal substitution of the MSBuild macros used in output paths and
//! include directories
//!
//! This is string replacement over a fixed token table, not MSBuild property
//! evaluation: each token is replaced at its first occurrence only, in table
//! order, and unknown `$(...)` references are left as they are.

/// Split a `"Cfg|Platform"` string into its two halves
///
/// A string without `|` yields an empty platform.
pub fn split_config(config: &str) -> (&str, &str) {
    config.split_once('|').unwrap_or((config, ""))
}

/// `$(PlatformShortName)` for a platform name
pub fn platform_short_name(platform: &str) -> &str {
    match platform {
        "Win32" => "x86",
        other => other,
    }
}

/// Ordered token table for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroTable {
    entries: Vec<(&'static str, String)>,
}

impl MacroTable {
    /// Tokens that do not depend on the configuration
    pub fn new(solution_dir: &str, project_name: &str, project_path: &str) -> Self {
        let mut solution_dir = solution_dir.to_string();
        if !solution_dir.ends_with('/') {
            solution_dir.push('/');
        }

        Self {
            entries: vec![
                ("$(SolutionDir)", solution_dir),
                ("$(ProjectName)", project_name.to_string()),
                ("$(ProjectPath)", project_path.to_string()),
            ],
        }
    }

    /// Table extended with the tokens of a `"Cfg|Platform"` configuration
    ///
    /// An empty configuration adds nothing, so configuration tokens stay
    /// unsubstituted.
    pub fn for_config(&self, config: &str) -> Self {
        let mut table = self.clone();
        if config.is_empty() {
            return table;
        }

        let (configuration, platform) = split_config(config);
        table.entries.extend([
            ("$(PlatformShortName)", platform_short_name(platform).to_string()),
            ("$(Platform)", platform.to_string()),
            ("$(Configuration)", configuration.to_string()),
            ("$(ConfigurationName)", configuration.to_string()),
        ]);
        table
    }

    /// Replace the first occurrence of each macro, in table order
    pub fn substitute(&self, value: &str) -> String {
        self.entries
            .iter()
            .fold(value.to_string(), |acc, (token, replacement)| {
                acc.replacen(token, replacement, 1)
            })
    }
}
