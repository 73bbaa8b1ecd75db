//! Shapes a whole generated document can take, and the settings sent along
//! with every request.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ModelTier;

pub const DEFAULT_LANGUAGE: &str = "Hindi";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    DetailedNotes,
    TableOnly,
    CompactTimeline,
    /// A single table that later requests extend with more rows
    IncrementalTable,
    StructuredNotes,
    /// One self-contained table meant to be exported as an image
    PngTable,
    /// An exam answer shaped by [`UpscOptions`]
    UpscAnswer,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::DetailedNotes,
        OutputFormat::TableOnly,
        OutputFormat::CompactTimeline,
        OutputFormat::IncrementalTable,
        OutputFormat::StructuredNotes,
        OutputFormat::PngTable,
        OutputFormat::UpscAnswer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::DetailedNotes => "detailed-notes",
            OutputFormat::TableOnly => "table-only",
            OutputFormat::CompactTimeline => "compact-timeline",
            OutputFormat::IncrementalTable => "incremental-table",
            OutputFormat::StructuredNotes => "structured-notes",
            OutputFormat::PngTable => "png-table",
            OutputFormat::UpscAnswer => "upsc-answer",
        }
    }

    /// The format after this one, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WordLimit {
    #[serde(rename = "none")]
    Unlimited,
    #[serde(rename = "150")]
    Words150,
    #[default]
    #[serde(rename = "250")]
    Words250,
    #[serde(rename = "500")]
    Words500,
}

impl WordLimit {
    pub fn as_str(self) -> &'static str {
        match self {
            WordLimit::Unlimited => "none",
            WordLimit::Words150 => "150",
            WordLimit::Words250 => "250",
            WordLimit::Words500 => "500",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    #[default]
    Standard,
    Analytical,
    Descriptive,
    Critical,
}

impl AnswerType {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerType::Standard => "standard",
            AnswerType::Analytical => "analytical",
            AnswerType::Descriptive => "descriptive",
            AnswerType::Critical => "critical",
        }
    }
}

/// Parameters of [`OutputFormat::UpscAnswer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpscOptions {
    /// Paper or subject name, free text (`GS1`, `Essay`, ...)
    pub subject: String,
    pub word_limit: WordLimit,
    pub answer_type: AnswerType,
    pub custom_instruction: String,
}

impl Default for UpscOptions {
    fn default() -> Self {
        Self {
            subject: "GS1".to_string(),
            word_limit: WordLimit::default(),
            answer_type: AnswerType::default(),
            custom_instruction: String::new(),
        }
    }
}

/// Everything about a request that comes from the user's settings rather
/// than from the edit itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    pub model: ModelTier,
    pub language: String,
    pub format: OutputFormat,
    pub upsc: UpscOptions,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: ModelTier::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            format: OutputFormat::default(),
            upsc: UpscOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(OutputFormat::DetailedNotes, OutputFormat::TableOnly)]
    #[case(OutputFormat::PngTable, OutputFormat::UpscAnswer)]
    #[case(OutputFormat::UpscAnswer, OutputFormat::DetailedNotes)]
    fn formats_cycle(#[case] from: OutputFormat, #[case] to: OutputFormat) {
        assert_eq!(from.next(), to);
    }

    #[test]
    fn defaults_match_a_fresh_session() {
        let settings = GenerationSettings::default();
        assert_eq!(settings.language, "Hindi");
        assert_eq!(settings.format, OutputFormat::DetailedNotes);
        assert_eq!(settings.upsc.subject, "GS1");
        assert_eq!(settings.upsc.word_limit.as_str(), "250");
        assert_eq!(settings.upsc.answer_type, AnswerType::Standard);
    }
}
