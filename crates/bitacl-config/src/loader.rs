//! Role file loader with multi-source merging

use crate::{AclConfig, AssertionRegistry};
use anyhow::{Context, Result};
use bitacl::RoleRegistry;
use directories::ProjectDirs;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

const USER_FILE: &str = "roles.toml";
const PROJECT_FILE: &str = "bitacl.toml";
const LOCAL_FILE: &str = "bitacl.local.toml";

/// Role file loader with builder pattern
///
/// Layers, lowest precedence first:
/// 1. ~/.config/bitacl/roles.toml (user defaults)
/// 2. bitacl.toml (git-tracked, project roles)
/// 3. bitacl.local.toml (gitignored, local overrides)
///
/// A role in a later layer replaces the role with the same name.
pub struct ConfigLoader {
    project_dir: PathBuf,
    user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            user_config: true,
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Skip the user-level role file
    pub fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    /// Load and merge role definitions from all sources
    pub fn load(self) -> Result<AclConfig> {
        let mut merged = AclConfig::default();

        for path in self.sources() {
            let layer: AclConfig = config::Config::builder()
                .add_source(config::File::from(path.clone()).format(config::FileFormat::Toml))
                .build()
                .with_context(|| format!("Failed to read role file {}", path.display()))?
                .try_deserialize()
                .with_context(|| format!("Failed to deserialize role file {}", path.display()))?;

            debug!(
                path = %path.display(),
                roles = layer.roles.len(),
                "Loaded role file"
            );
            merged.merge(layer);
        }

        Ok(merged)
    }

    /// Load role definitions and build a validated registry
    pub fn load_registry(self, assertions: &AssertionRegistry) -> Result<RoleRegistry> {
        let config = self.load()?;
        config
            .build(assertions)
            .context("Failed to build role registry")
    }

    /// Existing role files in precedence order (lowest first)
    fn sources(&self) -> Vec<PathBuf> {
        let mut sources = Vec::new();

        if self.user_config
            && let Some(user_file) = user_config_file()
        {
            sources.push(user_file);
        }
        sources.push(self.project_dir.join(PROJECT_FILE));
        sources.push(self.project_dir.join(LOCAL_FILE));

        sources.retain(|path| path.exists());
        sources
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// User role file in the platform config directory, if one can be determined
fn user_config_file() -> Option<PathBuf> {
    ProjectDirs::from("dev", "bitacl", "bitacl").map(|dirs| dirs.config_dir().join(USER_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitacl::{Assertion, Evaluator, Identity};
    use bitacl_types::{IdentityId, Privilege, Resource, RoleMask};
    use std::fs;
    use std::sync::Arc;
    use tempfile::tempdir;

    const PROJECT_ROLES: &str = r#"
[[roles]]
id = 1
name = "guest"

[[roles.rules]]
resource = "main"
privileges = ["read"]

[[roles]]
id = 2
name = "registered"
parents = ["guest"]

[[roles.rules]]
resource = "user"
privileges = ["loggedIn"]
"#;

    #[test]
    fn test_user_config_file() {
        // Platform dependent; must not panic
        if let Some(path) = user_config_file() {
            assert!(path.to_string_lossy().contains("bitacl"));
            assert!(path.ends_with(USER_FILE));
        }
    }

    #[test]
    fn test_sources_skip_missing_files() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();
        fs::write(project_dir.join(LOCAL_FILE), "").expect("Failed to write local config");

        let sources = ConfigLoader::new()
            .with_project_dir(project_dir)
            .without_user_config()
            .sources();

        assert_eq!(sources, [project_dir.join(LOCAL_FILE)]);
    }

    #[test]
    fn test_load_empty_project() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = ConfigLoader::new()
            .with_project_dir(temp_dir.path())
            .without_user_config()
            .load()
            .expect("Failed to load config");

        assert!(config.roles.is_empty());
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();
        fs::write(project_dir.join("bitacl.toml"), PROJECT_ROLES).expect("Failed to write config");

        let config = ConfigLoader::new()
            .with_project_dir(project_dir)
            .without_user_config()
            .load()
            .expect("Failed to load config");

        assert_eq!(config.roles.len(), 2);
        assert_eq!(config.roles[1].name, "registered");
        assert_eq!(config.roles[1].parents, ["guest"]);
        assert_eq!(config.roles[1].rules[0].privileges, ["loggedIn"]);
    }

    #[test]
    fn test_local_overrides() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();
        fs::write(project_dir.join("bitacl.toml"), PROJECT_ROLES)
            .expect("Failed to write project config");

        // Local file widens guest and adds admin
        fs::write(
            project_dir.join("bitacl.local.toml"),
            r#"
[[roles]]
id = 1
name = "guest"

[[roles.rules]]
resource = "main"
privileges = ["read", "search"]

[[roles]]
id = 4
name = "admin"

[[roles.rules]]
resource = "admin"
"#,
        )
        .expect("Failed to write local config");

        let config = ConfigLoader::new()
            .with_project_dir(project_dir)
            .without_user_config()
            .load()
            .expect("Failed to load config");

        let names: Vec<&str> = config.roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["guest", "registered", "admin"]);
        assert_eq!(config.roles[0].rules[0].privileges, ["read", "search"]);
    }

    #[test]
    fn test_load_registry_evaluates() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();
        fs::write(
            project_dir.join("bitacl.toml"),
            r#"
[[roles]]
id = 1
name = "owner"

[[roles.rules]]
resource = "profile"
privileges = ["edit"]
assertions = ["is_seven"]
"#,
        )
        .expect("Failed to write config");

        let assertions =
            AssertionRegistry::new().with(Assertion::on("is_seven", |id: &u64| *id == 7));
        let registry = ConfigLoader::new()
            .with_project_dir(project_dir)
            .without_user_config()
            .load_registry(&assertions)
            .expect("Failed to build registry");

        let evaluator = Evaluator::new(
            Arc::new(registry),
            Identity::new(IdentityId::new(7), RoleMask::new(1)),
        );
        let (profile, edit) = (Resource::from("profile"), Privilege::from("edit"));
        assert!(evaluator.is_allowed(&profile, &edit, Some(&7u64)));
        assert!(!evaluator.is_allowed(&profile, &edit, Some(&8u64)));
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();
        fs::write(project_dir.join("bitacl.toml"), "[[roles]]\nid = \"one\"\n")
            .expect("Failed to write config");

        let err = ConfigLoader::new()
            .with_project_dir(project_dir)
            .without_user_config()
            .load()
            .unwrap_err();

        assert!(format!("{err:#}").contains("bitacl.toml"));
    }
}
