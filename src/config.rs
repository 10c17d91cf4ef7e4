//! Compiler and project configuration.
//!
//! `CompileOptions` travels with every compilation (and is part of the cache
//! key). `ProjectConfig` is the CLI's view of an `inscribeConfig.json` file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::class_builder::ClassVisibility;
use crate::imports::ImportOrigin;

pub const CONFIG_FILE_NAME: &str = "inscribeConfig.json";

/// Module specifiers implicit imports are resolved from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Libraries {
    pub core: String,
    pub gui: String,
    pub runtime: String,
    pub utility: String,
}

impl Default for Libraries {
    fn default() -> Self {
        Self {
            core: "@babylonjs/core".to_string(),
            gui: "@babylonjs/gui".to_string(),
            runtime: "inscribejs".to_string(),
            utility: "lodash".to_string(),
        }
    }
}

impl Libraries {
    pub fn module_for(&self, origin: ImportOrigin) -> &str {
        match origin {
            ImportOrigin::Core => &self.core,
            ImportOrigin::Gui => &self.gui,
            ImportOrigin::Runtime => &self.runtime,
            ImportOrigin::Utility => &self.utility,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    pub libraries: Libraries,
    pub class_visibility: ClassVisibility,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub source_dir: PathBuf,
    pub out_dir: PathBuf,
    /// View document extension, without the dot.
    pub extension: String,
    pub cache_dir: PathBuf,
    pub compile: CompileOptions,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("src"),
            out_dir: PathBuf::from("src/generated"),
            extension: "xml".to_string(),
            cache_dir: PathBuf::from(".inscribe/cache"),
            compile: CompileOptions::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl ProjectConfig {
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Walks up from `start` looking for the config file.
    pub fn find(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Loads the nearest config, falling back to defaults rooted at `start`.
    pub fn discover(start: &Path) -> Result<Self, ConfigError> {
        match Self::find(start) {
            Some(path) => {
                log::info!("using {}", path.display());
                Self::load(&path)
            }
            None => {
                log::info!("no {} found, using defaults", CONFIG_FILE_NAME);
                let mut config = Self::default();
                config.resolve_relative_to(start);
                Ok(config)
            }
        }
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for dir in [&mut self.source_dir, &mut self.out_dir, &mut self.cache_dir] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = ProjectConfig::parse(
            r#"{ "outDir": "gen", "compile": { "libraries": { "runtime": "../../index" } } }"#,
        )
        .unwrap();
        assert_eq!(config.out_dir, PathBuf::from("gen"));
        assert_eq!(config.extension, "xml");
        assert_eq!(config.compile.libraries.runtime, "../../index");
        assert_eq!(config.compile.libraries.core, "@babylonjs/core");
        assert_eq!(config.compile.class_visibility, ClassVisibility::ExportDefault);
    }

    #[test]
    fn test_class_visibility_names() {
        let options: CompileOptions =
            serde_json::from_str(r#"{ "classVisibility": "export" }"#).unwrap();
        assert_eq!(options.class_visibility, ClassVisibility::Export);
        assert!(serde_json::from_str::<CompileOptions>(r#"{ "classVisibility": "public" }"#).is_err());
    }

    #[test]
    fn test_find_walks_up() {
        let root = std::env::temp_dir().join(format!("inscribe-config-{}", std::process::id()));
        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join(CONFIG_FILE_NAME), r#"{ "extension": "view" }"#).unwrap();

        let found = ProjectConfig::find(&nested).unwrap();
        assert_eq!(found, root.join(CONFIG_FILE_NAME));
        let config = ProjectConfig::load(&found).unwrap();
        assert_eq!(config.extension, "view");
        assert_eq!(config.source_dir, root.join("src"));

        fs::remove_dir_all(&root).ok();
    }
}
