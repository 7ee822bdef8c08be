pub mod extract;
pub mod init;
pub mod score;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use evalscan_core::config::{load_config_from, Encoding, EvalscanConfig};

/// Input file flags shared by `extract` and `validate`. Each one overrides
/// the matching configuration value.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Evaluation corpus (one escaped evaluation per line, or a .json array)
    #[arg(long)]
    pub evaluations: Option<PathBuf>,

    /// Full question list
    #[arg(long)]
    pub questions: Option<PathBuf>,

    /// Course-quality question list
    #[arg(long)]
    pub course_questions: Option<PathBuf>,

    /// Instructor-quality question list
    #[arg(long)]
    pub instructor_questions: Option<PathBuf>,

    /// Agree/disagree question list
    #[arg(long)]
    pub agree_questions: Option<PathBuf>,

    /// Input encoding: latin1, utf8
    #[arg(long)]
    pub encoding: Option<Encoding>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl InputArgs {
    /// Load configuration and apply the flag overrides.
    pub fn resolve(self) -> Result<EvalscanConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        let inputs = &mut config.inputs;
        if let Some(p) = self.evaluations {
            inputs.evaluations = p;
        }
        if let Some(p) = self.questions {
            inputs.questions = p;
        }
        if let Some(p) = self.course_questions {
            inputs.course_questions = p;
        }
        if let Some(p) = self.instructor_questions {
            inputs.instructor_questions = p;
        }
        if let Some(p) = self.agree_questions {
            inputs.agree_disagree_questions = p;
        }
        if let Some(e) = self.encoding {
            config.encoding = e;
        }
        Ok(config)
    }
}
