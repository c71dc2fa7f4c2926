//! The parameter form shown before a task (or a generated command) runs.

pub mod text_input;

pub use text_input::TextInput;

use crate::catalog::{Parameter, ParameterKind, RunnerSpec, Task};
use crate::handoff::FinalCommand;

pub const GENERATED_COMMAND_TITLE: &str = "AI Command";
pub const GENERATED_COMMAND_PROMPT: &str = "Run: ";
pub const SHELL_PROGRAM: &str = "sh";

#[derive(Debug, Clone, PartialEq, Eq)]
enum FormTarget {
    Task(String),
    /// A single shell command produced by the AI flow; it runs through
    /// `sh -c` instead of the task runner.
    GeneratedCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub prompt: String,
    pub input: TextInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Focus moved to the next field.
    Advanced,
    Finished(FinalCommand),
}

/// One text field per parameter, in declaration order. Always has at least
/// one field, and `focus` always indexes an existing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamForm {
    target: FormTarget,
    parameters: Vec<Parameter>,
    fields: Vec<FormField>,
    focus: usize,
}

impl ParamForm {
    /// `None` for a task without parameters: it runs without a form.
    pub fn for_task(task: &Task) -> Option<Self> {
        if task.parameters.is_empty() {
            return None;
        }
        let fields = task
            .parameters
            .iter()
            .map(|parameter| {
                let mut input = TextInput::new();
                if let Some(default) = &parameter.default {
                    input = input.with_placeholder(&format!("{default} (default)"));
                }
                FormField {
                    prompt: format!("{}: ", parameter.name),
                    input,
                }
            })
            .collect();
        Some(Self {
            target: FormTarget::Task(task.name.clone()),
            parameters: task.parameters.clone(),
            fields,
            focus: 0,
        })
    }

    /// A single-field form pre-filled with generated command text.
    pub fn for_generated_command(command: &str) -> Self {
        Self {
            target: FormTarget::GeneratedCommand,
            parameters: vec![Parameter {
                name: "command".to_string(),
                default: None,
                kind: ParameterKind::Singular,
            }],
            fields: vec![FormField {
                prompt: GENERATED_COMMAND_PROMPT.to_string(),
                input: TextInput::new().with_value(command),
            }],
            focus: 0,
        }
    }

    pub fn title(&self) -> String {
        match &self.target {
            FormTarget::Task(name) => format!("Run Task: {name}"),
            FormTarget::GeneratedCommand => format!("Run Task: {GENERATED_COMMAND_TITLE}"),
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_input_mut(&mut self) -> &mut TextInput {
        &mut self.fields[self.focus].input
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
    }

    /// Enter on a field: advance, or on the last field build the command.
    pub fn submit(&mut self, runner: &RunnerSpec) -> SubmitOutcome {
        if self.focus + 1 < self.fields.len() {
            self.focus += 1;
            return SubmitOutcome::Advanced;
        }
        SubmitOutcome::Finished(self.final_command(runner))
    }

    /// Positional arguments in parameter order. Empty fields take the
    /// default; a field with neither value nor default yields `""`. Variadic
    /// values are split on whitespace.
    pub fn arguments(&self) -> Vec<String> {
        let mut args = Vec::new();
        for (field, parameter) in self.fields.iter().zip(&self.parameters) {
            let mut value = field.input.value().to_string();
            if value.is_empty() {
                if let Some(default) = &parameter.default {
                    value = default.clone();
                }
            }
            if parameter.kind.is_variadic() {
                args.extend(value.split_whitespace().map(str::to_string));
            } else {
                args.push(value);
            }
        }
        args
    }

    pub fn final_command(&self, runner: &RunnerSpec) -> FinalCommand {
        let args = self.arguments();
        match &self.target {
            FormTarget::Task(name) => FinalCommand::new(runner.task_argv(name, args)),
            FormTarget::GeneratedCommand => {
                let command = args.into_iter().next().unwrap_or_default();
                FinalCommand::new(vec![
                    SHELL_PROGRAM.to_string(),
                    "-c".to_string(),
                    command,
                ])
            }
        }
    }
}
