//! Compiler command-line tokenizer
//!
//! Extracts include directories, preprocessor defines and language standard
//! selections from an uncurated list of GCC/Clang/MSVC style flags. Anything
//! that is not recognized is ignored.

use serde::{Deserialize, Serialize};

/// Default C standard when no `-std=` flag selects one
pub const DEFAULT_C_STANDARD: &str = "99";

/// Default C++ standard when no `-std=` flag selects one
pub const DEFAULT_CPP_STANDARD: &str = "11";

const CPP_STD_MARKERS: [&str; 2] = ["-std=c++", "-std=gnu++"];
const C_STD_MARKERS: [&str; 2] = ["-std=c", "-std=gnu"];

/// Structured view of one configuration's compile flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileFlags {
    pub include_dirs: Vec<String>,
    pub defines: Vec<String>,
    pub c_std: String,
    pub cpp_std: String,
}

impl Default for CompileFlags {
    fn default() -> Self {
        Self {
            include_dirs: Vec::new(),
            defines: Vec::new(),
            c_std: DEFAULT_C_STANDARD.to_string(),
            cpp_std: DEFAULT_CPP_STANDARD.to_string(),
        }
    }
}

impl CompileFlags {
    /// Parse a flat token list left to right
    ///
    /// `-I`/`/I` and `-D`/`/D` accept the value glued to the flag or as the
    /// next token. `-isystem` always takes the next token. The last `-std=`
    /// flag of each language wins.
    pub fn parse<S: AsRef<str>>(flags: &[S]) -> Self {
        let mut parsed = Self::default();
        let mut tokens = flags.iter().map(AsRef::as_ref);

        while let Some(token) = tokens.next() {
            if token == "-isystem" {
                if let Some(dir) = tokens.next() {
                    parsed.include_dirs.push(dir.to_string());
                }
            } else if let Some(value) = strip_switch(token, 'I') {
                match value {
                    "" => {
                        if let Some(dir) = tokens.next() {
                            parsed.include_dirs.push(dir.to_string());
                        }
                    }
                    dir => parsed.include_dirs.push(dir.to_string()),
                }
            } else if let Some(value) = strip_switch(token, 'D') {
                match value {
                    "" => {
                        if let Some(define) = tokens.next() {
                            parsed.defines.push(define.to_string());
                        }
                    }
                    define => parsed.defines.push(define.to_string()),
                }
            } else if let Some(version) = strip_any(token, &CPP_STD_MARKERS) {
                parsed.cpp_std = version.to_string();
            } else if let Some(version) = strip_any(token, &C_STD_MARKERS) {
                parsed.c_std = version.to_string();
            }
        }

        parsed
    }
}

/// Strip a `-X` or `/X` switch prefix, returning the glued value
fn strip_switch(token: &str, switch: char) -> Option<&str> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some('-' | '/'), Some(c)) if c == switch => Some(chars.as_str()),
        _ => None,
    }
}

fn strip_any<'a>(token: &'a str, markers: &[&str]) -> Option<&'a str> {
    markers
        .iter()
        .find_map(|marker| token.strip_prefix(marker))
        .filter(|version| !version.is_empty())
}
