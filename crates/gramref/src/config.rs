//! Configuration types for a documentation build.
//!
//! This module provides the configuration object constructed once per build
//! invocation and passed through the pipeline; there is no process-wide
//! grammar state. All types implement [`serde::Deserialize`] for flexible
//! loading from the host build tool's own configuration.
//!
//! # Example
//!
//! ```
//! # use gramref::config::BuildConfig;
//! let config = BuildConfig::default();
//! assert!(config.main_paths().len() >= 1);
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

fn default_grammar_dir() -> PathBuf {
    PathBuf::from("grammar")
}

fn default_base() -> String {
    "base.grammar".to_string()
}

fn default_control() -> String {
    "control.grammar".to_string()
}

/// Top-level build configuration.
///
/// Names the well-known grammar fragment set: a canonical base grammar plus
/// zero or more override/extension fragments for the main configuration
/// language, and the single mapbody file for the control-channel language.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Directory holding the grammar source files.
    #[serde(default = "default_grammar_dir")]
    grammar_dir: PathBuf,

    /// Main configuration language section.
    #[serde(default)]
    main: MainGrammarConfig,

    /// Control-channel configuration language section.
    #[serde(default)]
    control: ControlGrammarConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            grammar_dir: default_grammar_dir(),
            main: MainGrammarConfig::default(),
            control: ControlGrammarConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Creates a new [`BuildConfig`] with the specified sections.
    pub fn new(
        grammar_dir: impl Into<PathBuf>,
        main: MainGrammarConfig,
        control: ControlGrammarConfig,
    ) -> Self {
        Self {
            grammar_dir: grammar_dir.into(),
            main,
            control,
        }
    }

    /// Returns the grammar source directory.
    pub fn grammar_dir(&self) -> &Path {
        &self.grammar_dir
    }

    /// Returns the main-grammar section.
    pub fn main(&self) -> &MainGrammarConfig {
        &self.main
    }

    /// Returns the control-grammar section.
    pub fn control(&self) -> &ControlGrammarConfig {
        &self.control
    }

    /// The main-grammar fragment files in merge precedence order: the base
    /// grammar first, override/extension fragments after.
    pub fn main_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.grammar_dir.join(self.main.base())];
        paths.extend(
            self.main
                .fragments()
                .iter()
                .map(|name| self.grammar_dir.join(name)),
        );
        paths
    }

    /// The control-channel grammar file.
    pub fn control_path(&self) -> PathBuf {
        self.grammar_dir.join(self.control.file())
    }
}

/// Fragment set for the main configuration language.
#[derive(Debug, Clone, Deserialize)]
pub struct MainGrammarConfig {
    /// The canonical base grammar file name.
    #[serde(default = "default_base")]
    base: String,

    /// Override/extension fragment file names, lowest precedence first.
    #[serde(default)]
    fragments: Vec<String>,
}

impl Default for MainGrammarConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            fragments: Vec::new(),
        }
    }
}

impl MainGrammarConfig {
    /// Creates a new [`MainGrammarConfig`].
    pub fn new(base: impl Into<String>, fragments: Vec<String>) -> Self {
        Self {
            base: base.into(),
            fragments,
        }
    }

    /// Returns the base grammar file name.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the fragment file names in precedence order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

/// Grammar file for the control-channel configuration language.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlGrammarConfig {
    /// The mapbody grammar file name.
    #[serde(default = "default_control")]
    file: String,
}

impl Default for ControlGrammarConfig {
    fn default() -> Self {
        Self {
            file: default_control(),
        }
    }
}

impl ControlGrammarConfig {
    /// Creates a new [`ControlGrammarConfig`].
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }

    /// Returns the mapbody grammar file name.
    pub fn file(&self) -> &str {
        &self.file
    }
}
