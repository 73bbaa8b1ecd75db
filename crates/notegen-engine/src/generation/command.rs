use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

use super::{ContentGenerator, GenerationError, GenerationRequest};

pub const TASK_VAR: &str = "NOTEGEN_TASK";
pub const INSTRUCTION_VAR: &str = "NOTEGEN_INSTRUCTION";
pub const MODEL_VAR: &str = "NOTEGEN_MODEL";
pub const LANGUAGE_VAR: &str = "NOTEGEN_LANGUAGE";
pub const FORMAT_VAR: &str = "NOTEGEN_FORMAT";
pub const UPSC_SUBJECT_VAR: &str = "NOTEGEN_UPSC_SUBJECT";
pub const UPSC_WORD_LIMIT_VAR: &str = "NOTEGEN_UPSC_WORD_LIMIT";
pub const UPSC_ANSWER_TYPE_VAR: &str = "NOTEGEN_UPSC_ANSWER_TYPE";
pub const UPSC_INSTRUCTION_VAR: &str = "NOTEGEN_UPSC_INSTRUCTION";

/// Runs an external program once per request.
///
/// The request context is written to the program's stdin; everything else
/// in the request is passed in `NOTEGEN_*` environment variables, the
/// format and exam-answer ones only when the request carries them. Whatever
/// the program prints to stdout is the generated fragment. A non-zero exit
/// is a failure and its stderr ends up in the error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl ContentGenerator for CommandGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        log::debug!("running `{}` for {} request", self.program, request.task);

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env(TASK_VAR, request.task.as_str())
            .env(INSTRUCTION_VAR, &request.instruction)
            .env(MODEL_VAR, request.model.as_str())
            .env(LANGUAGE_VAR, &request.language);
        if let Some(format) = request.format {
            command.env(FORMAT_VAR, format.as_str());
        }
        if let Some(upsc) = &request.upsc {
            command
                .env(UPSC_SUBJECT_VAR, &upsc.subject)
                .env(UPSC_WORD_LIMIT_VAR, upsc.word_limit.as_str())
                .env(UPSC_ANSWER_TYPE_VAR, upsc.answer_type.as_str())
                .env(UPSC_INSTRUCTION_VAR, &upsc.custom_instruction);
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GenerationError::Spawn {
                command: self.program.clone(),
                source,
            })?;

        // Feed stdin from its own thread so a chatty child cannot deadlock us
        let writer = child.stdin.take().map(|mut stdin| {
            let context = request.context.clone();
            thread::spawn(move || stdin.write_all(context.as_bytes()))
        });

        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Err(error)) if error.kind() != std::io::ErrorKind::BrokenPipe => {
                    return Err(GenerationError::Io(error));
                }
                _ => {}
            }
        }

        if !output.status.success() {
            return Err(GenerationError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8(output.stdout)?)
    }
}
