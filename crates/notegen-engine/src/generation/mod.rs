//! The content generation collaborator.
//!
//! The engine never talks to a model itself. It describes what it wants as a
//! [`GenerationRequest`] and accepts whatever HTML fragment comes back; how
//! the fragment is produced (a local program, an HTTP service, a canned
//! string in tests) is the [`ContentGenerator`] implementation's business.

mod command;
mod format;

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use command::CommandGenerator;
pub use format::{
    AnswerType, DEFAULT_LANGUAGE, GenerationSettings, OutputFormat, UpscOptions, WordLimit,
};

/// What the generator is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
    /// Notes on a topic given as the instruction
    Topic,
    /// Notes built from raw text given as the context
    Text,
    /// The current table as context, back with more rows added
    ExtendTable,
    Rewrite,
    Expand,
    Continue,
    NextTopic,
    Diagram,
    Table,
    CellRewrite,
    CellExpand,
    /// One line per body cell back for a whole column
    ColumnRewrite,
}

impl Task {
    pub fn as_str(self) -> &'static str {
        match self {
            Task::Topic => "topic",
            Task::Text => "text",
            Task::ExtendTable => "extend-table",
            Task::Rewrite => "rewrite",
            Task::Expand => "expand",
            Task::Continue => "continue",
            Task::NextTopic => "next-topic",
            Task::Diagram => "diagram",
            Task::Table => "table",
            Task::CellRewrite => "cell-rewrite",
            Task::CellExpand => "cell-expand",
            Task::ColumnRewrite => "column-rewrite",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    #[default]
    Fast,
    Quality,
}

impl ModelTier {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelTier::Fast => "fast",
            ModelTier::Quality => "quality",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub task: Task,
    /// HTML (or plain text) the generator works from
    pub context: String,
    /// Free-form user instruction; may be empty
    pub instruction: String,
    pub model: ModelTier,
    /// Language the output is written in
    pub language: String,
    /// Shape of a whole document; `None` for edits of part of one
    pub format: Option<OutputFormat>,
    /// Set only alongside [`OutputFormat::UpscAnswer`]
    pub upsc: Option<UpscOptions>,
}

impl GenerationRequest {
    pub fn new(task: Task, context: impl Into<String>) -> Self {
        Self {
            task,
            context: context.into(),
            instruction: String::new(),
            model: ModelTier::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            format: None,
            upsc: None,
        }
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn with_model(mut self, model: ModelTier) -> Self {
        self.model = model;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Ask for a whole document in `format`; `upsc` is only carried for
    /// [`OutputFormat::UpscAnswer`].
    pub fn with_format(mut self, format: OutputFormat, upsc: &UpscOptions) -> Self {
        self.format = Some(format);
        self.upsc = (format == OutputFormat::UpscAnswer).then(|| upsc.clone());
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Failed to run generator `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error talking to generator: {0}")]
    Io(#[from] std::io::Error),
    #[error("Generator exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
    #[error("Generator output is not valid UTF-8")]
    InvalidOutput(#[from] std::string::FromUtf8Error),
    #[error("Generation unavailable: {0}")]
    Unavailable(String),
}

pub trait ContentGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

impl<F> ContentGenerator for F
where
    F: Fn(&GenerationRequest) -> Result<String, GenerationError>,
{
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self(request)
    }
}

/// Strip Markdown code fences models like to wrap HTML in, then trim.
pub fn clean_model_output(raw: &str) -> String {
    static CODE_FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = CODE_FENCE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*```[A-Za-z]*[ \t]*$\n?").expect("Invalid code fence regex")
    });
    fence.replace_all(raw, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("<p>x</p>", "<p>x</p>")]
    #[case("  <p>x</p>\n\n", "<p>x</p>")]
    #[case("```html\n<p>x</p>\n```", "<p>x</p>")]
    #[case("```\n<ul><li>a</li></ul>\n```\n", "<ul><li>a</li></ul>")]
    #[case("```html\n<p>one</p>\n```\n```html\n<p>two</p>\n```", "<p>one</p>\n<p>two</p>")]
    #[case("```html\n```", "")]
    fn cleans_model_output(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(clean_model_output(raw), expected);
    }

    #[test]
    fn inline_backticks_survive() {
        assert_eq!(
            clean_model_output("<p>use <code>```</code> fences</p>"),
            "<p>use <code>```</code> fences</p>"
        );
    }

    #[test]
    fn upsc_options_only_travel_with_upsc_answers() {
        let upsc = UpscOptions::default();
        let notes = GenerationRequest::new(Task::Topic, "").with_format(OutputFormat::TableOnly, &upsc);
        assert_eq!(notes.format, Some(OutputFormat::TableOnly));
        assert_eq!(notes.upsc, None);

        let answer = GenerationRequest::new(Task::Topic, "").with_format(OutputFormat::UpscAnswer, &upsc);
        assert_eq!(answer.upsc, Some(upsc));
    }

    #[test]
    fn closures_are_generators() {
        let echo = |request: &GenerationRequest| {
            Ok::<_, GenerationError>(format!("<p>{}</p>", request.instruction))
        };
        let request = GenerationRequest::new(Task::Topic, "").with_instruction("Rust");
        assert_eq!(echo.generate(&request).unwrap(), "<p>Rust</p>");
    }
}
