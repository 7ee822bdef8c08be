//! The `evalscan validate` command.

use anyhow::Result;

use evalscan_core::loader::{load_evaluations, load_vocabulary, validate_inputs};

use super::InputArgs;

pub fn execute(inputs: InputArgs) -> Result<()> {
    let config = inputs.resolve()?;
    let vocabulary = load_vocabulary(&config.inputs, config.encoding)?;
    let evaluations = load_evaluations(&config.inputs.evaluations, config.encoding)?;

    println!(
        "Evaluations: {} ({})",
        evaluations.len(),
        config.inputs.evaluations.display()
    );
    println!(
        "Vocabulary: {} questions, {} course, {} instructor, {} agree/disagree",
        vocabulary.questions.len(),
        vocabulary.course_questions.len(),
        vocabulary.instructor_questions.len(),
        vocabulary.agree_disagree_questions.len()
    );

    let warnings = validate_inputs(&vocabulary, &evaluations);
    for w in &warnings {
        let prefix = w
            .source
            .as_ref()
            .map(|s| format!("  [{s}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("All inputs valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
