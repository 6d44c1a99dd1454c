//! Configuration discovery and effective settings resolution.
//!
//! Cadmig reads `cadmig.toml|yaml|yml` from the repository root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `include`: `["**/*.cdc"]`
//! - `hosts`: none
//! - `templates`: `["templates/**/*.json"]`
//! - `output`: `human`
//! - `allowLegacySyntax`: false
//! - `maxPasses`: 3
//! - `fix.write|diff|check`: false
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::ConfigError;
use crate::rewrite::MAX_PASSES;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone)]
/// Rewrite-related configuration section under `[fix]`.
pub struct FixCfg {
    pub write: Option<bool>,
    pub diff: Option<bool>,
    pub check: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Rule selection under `[rules]`.
pub struct RulesCfg {
    #[serde(default)]
    pub disable: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `cadmig.toml|yaml`.
pub struct CadmigConfig {
    pub include: Option<Vec<String>>,
    pub hosts: Option<Vec<String>>,
    pub templates: Option<Vec<String>>,
    pub output: Option<String>,
    #[serde(rename = "allowLegacySyntax")]
    pub allow_legacy_syntax: Option<bool>,
    #[serde(rename = "maxPasses")]
    pub max_passes: Option<usize>,
    /// Extra phrases that mark a fragment as an intentional legacy example
    pub markers: Option<Vec<String>>,
    #[serde(default)]
    pub rules: Option<RulesCfg>,
    pub fix: Option<FixCfg>,
}

#[derive(Debug, Default, Clone)]
/// Values given on the command line; `None` defers to config/defaults.
pub struct Overrides<'a> {
    pub repo_root: Option<&'a str>,
    pub output: Option<&'a str>,
    pub allow_legacy_syntax: Option<bool>,
    pub write: Option<bool>,
    pub diff: Option<bool>,
    pub check: Option<bool>,
    pub paths: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub include: Vec<String>,
    pub hosts: Vec<String>,
    pub templates: Vec<String>,
    pub output: String,
    pub allow_legacy_syntax: bool,
    pub max_passes: usize,
    pub markers: Vec<String>,
    pub disabled_rules: Vec<String>,
    pub write: bool,
    pub diff: bool,
    pub check: bool,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `cadmig.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("cadmig.toml").exists()
            || cur.join("cadmig.yaml").exists()
            || cur.join("cadmig.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `CadmigConfig` from `cadmig.toml` or `cadmig.yaml|yml` if present.
///
/// `Ok(None)` when no config file exists.
pub fn load_config(root: &Path) -> Result<Option<CadmigConfig>, ConfigError> {
    let toml_path = root.join("cadmig.toml");
    if toml_path.exists() {
        let s = read_config(&toml_path)?;
        let cfg: CadmigConfig = toml::from_str(&s).map_err(|e| ConfigError::Parse {
            path: toml_path.clone(),
            message: e.to_string(),
        })?;
        return Ok(Some(cfg));
    }
    for yml in ["cadmig.yaml", "cadmig.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = read_config(&p)?;
            let cfg: CadmigConfig = serde_yaml::from_str(&s).map_err(|e| ConfigError::Parse {
                path: p.clone(),
                message: e.to_string(),
            })?;
            return Ok(Some(cfg));
        }
    }
    Ok(None)
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
///
/// Positional `paths` on the command line replace `include`, `hosts` and
/// `templates`; each command picks the list it needs.
pub fn resolve_effective(cli: &Overrides<'_>) -> Effective {
    let start = PathBuf::from(cli.repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let cfg = match load_config(&repo_root) {
        Ok(cfg) => cfg.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "config ignored; using defaults");
            CadmigConfig::default()
        }
    };

    let (include, hosts, templates) = match cli.paths.clone().filter(|p| !p.is_empty()) {
        Some(paths) => (paths.clone(), Vec::new(), paths),
        None => (
            cfg.include.unwrap_or_else(|| vec!["**/*.cdc".to_string()]),
            cfg.hosts.unwrap_or_default(),
            cfg.templates
                .unwrap_or_else(|| vec!["templates/**/*.json".to_string()]),
        ),
    };

    let output = cli
        .output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let allow_legacy_syntax = cli
        .allow_legacy_syntax
        .or(cfg.allow_legacy_syntax)
        .unwrap_or(false);

    let write = cli
        .write
        .or_else(|| cfg.fix.as_ref().and_then(|f| f.write))
        .unwrap_or(false);
    let diff = cli
        .diff
        .or_else(|| cfg.fix.as_ref().and_then(|f| f.diff))
        .unwrap_or(false);
    let check = cli
        .check
        .or_else(|| cfg.fix.as_ref().and_then(|f| f.check))
        .unwrap_or(false);

    Effective {
        repo_root,
        include,
        hosts,
        templates,
        output,
        allow_legacy_syntax,
        max_passes: cfg.max_passes.unwrap_or(MAX_PASSES).max(1),
        markers: cfg.markers.unwrap_or_default(),
        disabled_rules: cfg.rules.map(|r| r.disable).unwrap_or_default(),
        write,
        diff,
        check,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("cadmig.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
include = ["contracts/**/*.cdc"]
hosts = ["src/**/*.ts"]
output = "json"
allowLegacySyntax = true
maxPasses = 2
markers = ["OLD STYLE"]
[rules]
disable = ["legacy-account-type"]
[fix]
write = true
    "#
        )
        .unwrap();

        // Resolve using explicit repo_root to avoid global CWD races
        let eff = resolve_effective(&Overrides {
            repo_root: root.to_str(),
            ..Default::default()
        });
        assert_eq!(eff.include, vec!["contracts/**/*.cdc"]);
        assert_eq!(eff.hosts, vec!["src/**/*.ts"]);
        assert_eq!(eff.output, "json");
        assert!(eff.allow_legacy_syntax);
        assert_eq!(eff.max_passes, 2);
        assert_eq!(eff.markers, vec!["OLD STYLE"]);
        assert_eq!(eff.disabled_rules, vec!["legacy-account-type"]);
        assert!(eff.write);
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("cadmig.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output: human
fix:
  diff: true
            "#
        )
        .unwrap();

        let eff = resolve_effective(&Overrides {
            repo_root: root.to_str(),
            ..Default::default()
        });
        assert_eq!(eff.include, vec!["**/*.cdc"]);
        assert!(eff.hosts.is_empty());
        assert_eq!(eff.templates, vec!["templates/**/*.json"]);
        assert_eq!(eff.output, "human");
        assert!(eff.diff);
        assert!(!eff.allow_legacy_syntax);
        assert_eq!(eff.max_passes, MAX_PASSES);
    }

    #[test]
    fn test_cli_takes_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("cadmig.toml"),
            "output = \"json\"\nallowLegacySyntax = true\n[fix]\nwrite = true\n",
        )
        .unwrap();
        let eff = resolve_effective(&Overrides {
            repo_root: root.to_str(),
            output: Some("human"),
            allow_legacy_syntax: Some(false),
            write: Some(false),
            paths: Some(vec!["a.cdc".into()]),
            ..Default::default()
        });
        assert_eq!(eff.output, "human");
        assert!(!eff.allow_legacy_syntax);
        assert!(!eff.write);
        assert_eq!(eff.include, vec!["a.cdc"]);
        assert!(eff.hosts.is_empty());
    }

    #[test]
    fn test_malformed_config_is_reported_and_defaults_apply() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("cadmig.toml"), "include = [\"a.cdc\"\noutput = \"json\"\n").unwrap();
        match load_config(root) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, root.join("cadmig.toml")),
            other => panic!("unexpected: {:?}", other.map(|c| c.is_some())),
        }
        let eff = resolve_effective(&Overrides {
            repo_root: root.to_str(),
            ..Default::default()
        });
        assert_eq!(eff.include, vec!["**/*.cdc"]);
        assert_eq!(eff.output, "human");
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempdir().unwrap();
        assert!(load_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_detect_repo_root_walks_up_to_git() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("a/b")).unwrap();
        assert_eq!(detect_repo_root(&root.join("a/b")), root.to_path_buf());
    }
}
