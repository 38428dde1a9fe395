//! Script catalog - which external invocation each command triggers

use crate::config::{ConfigError, ScriptsConfig};
use dronectl_shared::CommandKind;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A fully resolved external invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl ScriptSpec {
    /// Shell-like rendering for log lines
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Maps every enabled command to its script
#[derive(Debug, Clone)]
pub struct ScriptCatalog {
    entries: BTreeMap<CommandKind, ScriptSpec>,
}

impl ScriptCatalog {
    /// Build the catalog from configuration, applying overrides and
    /// dropping disabled commands
    pub fn from_config(config: &ScriptsConfig) -> Result<Self, ConfigError> {
        let mut entries = BTreeMap::new();

        for kind in CommandKind::ALL {
            if config.disabled.contains(&kind) {
                continue;
            }

            let override_ = config.overrides.get(kind.id());
            let program = override_
                .and_then(|o| o.program.clone())
                .unwrap_or_else(|| config.program.clone());
            let script = override_
                .and_then(|o| o.script.as_deref())
                .unwrap_or(kind.default_script());

            let mut args = vec![config.script_dir.join(script).display().to_string()];
            if let Some(o) = override_ {
                args.extend(o.args.iter().cloned());
            }

            entries.insert(
                kind,
                ScriptSpec {
                    program,
                    args,
                    working_dir: config.working_dir.clone(),
                },
            );
        }

        for key in config.overrides.keys() {
            CommandKind::parse(key).map_err(|_| ConfigError::UnknownOverride(key.clone()))?;
        }

        Ok(Self { entries })
    }

    pub fn get(&self, kind: CommandKind) -> Option<&ScriptSpec> {
        self.entries.get(&kind)
    }

    pub fn is_enabled(&self, kind: CommandKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScriptOverride;

    #[test]
    fn test_default_catalog_matches_page() {
        let catalog = ScriptCatalog::from_config(&ScriptsConfig::default()).unwrap();
        assert_eq!(catalog.len(), CommandKind::ALL.len());

        let arm = catalog.get(CommandKind::Arm).unwrap();
        assert_eq!(arm.command_line(), "python3 Scripts/BasicArdu/arming.py");

        let square = catalog.get(CommandKind::Square).unwrap();
        assert_eq!(
            square.command_line(),
            "python3 Scripts/BasicArdu/squareMovement.py"
        );
        assert_eq!(square.working_dir, None);
    }

    #[test]
    fn test_override_replaces_script() {
        let mut config = ScriptsConfig::default();
        config.overrides.insert(
            "arm".into(),
            ScriptOverride {
                program: None,
                script: Some("takeoffA.py".into()),
                args: vec!["--alt".into(), "5".into()],
            },
        );

        let catalog = ScriptCatalog::from_config(&config).unwrap();
        let arm = catalog.get(CommandKind::Arm).unwrap();
        assert_eq!(
            arm.command_line(),
            "python3 Scripts/BasicArdu/takeoffA.py --alt 5"
        );

        // Other commands untouched
        let disarm = catalog.get(CommandKind::Disarm).unwrap();
        assert_eq!(disarm.args, vec!["Scripts/BasicArdu/disarming.py".to_string()]);
    }

    #[test]
    fn test_override_program() {
        let mut config = ScriptsConfig::default();
        config.overrides.insert(
            "landing".into(),
            ScriptOverride {
                program: Some("/usr/bin/python3.11".into()),
                ..Default::default()
            },
        );

        let catalog = ScriptCatalog::from_config(&config).unwrap();
        let landing = catalog.get(CommandKind::Landing).unwrap();
        assert_eq!(landing.program, "/usr/bin/python3.11");
        assert_eq!(landing.args, vec!["Scripts/BasicArdu/landing.py".to_string()]);
    }

    #[test]
    fn test_disabled_commands_are_absent() {
        let config = ScriptsConfig {
            disabled: vec![CommandKind::Waypoint, CommandKind::Square],
            ..Default::default()
        };

        let catalog = ScriptCatalog::from_config(&config).unwrap();
        assert!(!catalog.is_enabled(CommandKind::Waypoint));
        assert!(!catalog.is_enabled(CommandKind::Square));
        assert!(catalog.is_enabled(CommandKind::Takeoff));
        assert_eq!(catalog.len(), CommandKind::ALL.len() - 2);
    }

    #[test]
    fn test_unknown_override_key() {
        let mut config = ScriptsConfig::default();
        config.overrides.insert("hover".into(), ScriptOverride::default());

        let err = ScriptCatalog::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOverride(_)));
    }

    #[test]
    fn test_working_dir_propagates() {
        let config = ScriptsConfig {
            working_dir: Some(PathBuf::from("/srv/drone")),
            ..Default::default()
        };

        let catalog = ScriptCatalog::from_config(&config).unwrap();
        for kind in CommandKind::ALL {
            assert_eq!(
                catalog.get(kind).unwrap().working_dir,
                Some(PathBuf::from("/srv/drone"))
            );
        }
    }
}
