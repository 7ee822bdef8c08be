//! Run configuration.
//!
//! Loaded from `evalscan.toml`; every value has a default so a run works with
//! no configuration file when the inputs carry their historical names.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How input bytes are decoded into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// ISO-8859-1: each byte is the code point of the same value.
    #[default]
    Latin1,
    /// UTF-8, with invalid sequences replaced.
    Utf8,
}

impl Encoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Latin1 => bytes.iter().map(|&b| char::from(b)).collect(),
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Latin1 => write!(f, "latin1"),
            Encoding::Utf8 => write!(f, "utf8"),
        }
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Encoding::Latin1),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            other => Err(format!("unknown encoding: {other}")),
        }
    }
}

/// Paths to the evaluation corpus and the four vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPaths {
    #[serde(default = "default_evaluations")]
    pub evaluations: PathBuf,
    #[serde(default = "default_questions")]
    pub questions: PathBuf,
    #[serde(default = "default_course_questions")]
    pub course_questions: PathBuf,
    #[serde(default = "default_instructor_questions")]
    pub instructor_questions: PathBuf,
    #[serde(default = "default_agree_disagree_questions")]
    pub agree_disagree_questions: PathBuf,
}

fn default_evaluations() -> PathBuf {
    PathBuf::from("unique_evals.csv")
}
fn default_questions() -> PathBuf {
    PathBuf::from("manually_cleaned_eval_questions.csv")
}
fn default_course_questions() -> PathBuf {
    PathBuf::from("course_quality_questions.csv")
}
fn default_instructor_questions() -> PathBuf {
    PathBuf::from("instructor_quality_questions.csv")
}
fn default_agree_disagree_questions() -> PathBuf {
    PathBuf::from("agree-disagree_questions.csv")
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            evaluations: default_evaluations(),
            questions: default_questions(),
            course_questions: default_course_questions(),
            instructor_questions: default_instructor_questions(),
            agree_disagree_questions: default_agree_disagree_questions(),
        }
    }
}

/// Top-level evalscan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalscanConfig {
    #[serde(default)]
    pub inputs: InputPaths,
    /// Decoding for every input file.
    #[serde(default)]
    pub encoding: Encoding,
    /// Max concurrent scanning workers.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Where the record document is written.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Directory for score reports.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
}

fn default_parallelism() -> usize {
    4
}
fn default_output() -> PathBuf {
    PathBuf::from("evals.json")
}
fn default_report_dir() -> PathBuf {
    PathBuf::from("./evalscan-results")
}

impl Default for EvalscanConfig {
    fn default() -> Self {
        Self {
            inputs: InputPaths::default(),
            encoding: Encoding::default(),
            parallelism: default_parallelism(),
            output: default_output(),
            report_dir: default_report_dir(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `evalscan.toml` in the current directory
/// 2. `~/.config/evalscan/config.toml`
///
/// Environment variable override: `EVALSCAN_PARALLELISM`.
pub fn load_config() -> Result<EvalscanConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<EvalscanConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("evalscan.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<EvalscanConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => EvalscanConfig::default(),
    };

    if let Ok(value) = std::env::var("EVALSCAN_PARALLELISM") {
        config.parallelism = value
            .trim()
            .parse()
            .with_context(|| format!("invalid EVALSCAN_PARALLELISM: '{value}'"))?;
    }

    let inputs = &mut config.inputs;
    inputs.evaluations = resolve_path(&inputs.evaluations);
    inputs.questions = resolve_path(&inputs.questions);
    inputs.course_questions = resolve_path(&inputs.course_questions);
    inputs.instructor_questions = resolve_path(&inputs.instructor_questions);
    inputs.agree_disagree_questions = resolve_path(&inputs.agree_disagree_questions);
    config.output = resolve_path(&config.output);
    config.report_dir = resolve_path(&config.report_dir);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("evalscan"))
}
