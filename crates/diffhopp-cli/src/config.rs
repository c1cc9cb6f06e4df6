use crate::error::{CliError, Result};
use diffhopp::engine::config::ToolPaths;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Optional TOML configuration file.
///
/// Everything in here is an override: absent keys keep their built-in
/// defaults, and CLI flags always win over file values.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub tools: Option<FileTools>,
    pub scoring: Option<FileScoring>,
}

/// `[tools]` section: program names or explicit paths for the external
/// binaries the pipeline invokes.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileTools {
    pub sampler: Option<String>,
    pub trainer: Option<String>,
    pub gnina: Option<String>,
    pub qvina: Option<String>,
    pub autodock_gpu: Option<String>,
    pub autogrid: Option<String>,
    pub obabel: Option<String>,
    pub prepare_receptor: Option<String>,
}

/// `[scoring]` section: docking search parameters.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileScoring {
    pub box_size: Option<f64>,
    pub exhaustiveness: Option<u32>,
}

impl FileConfig {
    /// Reads the configuration file, or returns defaults when no path was
    /// given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        debug!("Loading configuration file from {}", path.display());
        let text = fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| CliError::Config(format!("failed to parse '{}': {e}", path.display())))
    }

    /// Tool paths with the file's `[tools]` overrides applied over the
    /// defaults.
    pub fn tool_paths(&self) -> ToolPaths {
        let mut tools = ToolPaths::default();
        let Some(file) = &self.tools else {
            return tools;
        };
        if let Some(v) = &file.sampler {
            tools.sampler = v.clone();
        }
        if let Some(v) = &file.trainer {
            tools.trainer = v.clone();
        }
        if let Some(v) = &file.gnina {
            tools.gnina = v.clone();
        }
        if let Some(v) = &file.qvina {
            tools.qvina = v.clone();
        }
        if let Some(v) = &file.autodock_gpu {
            tools.autodock_gpu = v.clone();
        }
        if let Some(v) = &file.autogrid {
            tools.autogrid = v.clone();
        }
        if let Some(v) = &file.obabel {
            tools.obabel = v.clone();
        }
        if let Some(v) = &file.prepare_receptor {
            tools.prepare_receptor = v.clone();
        }
        tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn no_path_yields_the_defaults() {
        let config = FileConfig::load(None).unwrap();
        assert!(config.tools.is_none());
        assert!(config.scoring.is_none());
        assert_eq!(config.tool_paths(), ToolPaths::default());
    }

    #[test]
    fn file_overrides_apply_over_the_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let toml = r#"
            [tools]
            gnina = "/opt/gnina/gnina"
            autodock-gpu = "autodock_gpu_128wi"

            [scoring]
            box-size = 25.0
            exhaustiveness = 4
            "#;
        fs::write(&path, toml).unwrap();

        let config = FileConfig::load(Some(&path)).unwrap();
        let tools = config.tool_paths();
        assert_eq!(tools.gnina, "/opt/gnina/gnina");
        assert_eq!(tools.autodock_gpu, "autodock_gpu_128wi");
        assert_eq!(tools.qvina, ToolPaths::default().qvina);
        assert_eq!(tools.sampler, ToolPaths::default().sampler);

        let scoring = config.scoring.unwrap();
        assert_eq!(scoring.box_size, Some(25.0));
        assert_eq!(scoring.exhaustiveness, Some(4));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scoring]\nbox-szie = 20.0\n").unwrap();

        let err = FileConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("box-szie"));
    }

    #[test]
    fn missing_file_propagates_an_io_error() {
        let err = FileConfig::load(Some(Path::new("/no/such/config.toml"))).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
