use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Name the shell sees as `$0` when running a templated invocation.
const TEMPLATE_ARG0: &str = "shkit-job";

/// Command prefix applied to every queued argument (e.g. `"gzip -9"`).
///
/// The template is shell text written by the operator. Queued arguments are never
/// spliced into it: they reach the shell as positional parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandTemplate(String);

impl CommandTemplate {
    /// Create a template; fails if it is empty or whitespace-only.
    pub fn new(s: impl Into<String>) -> ModelResult<Self> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommandTemplate {
    type Error = ModelError;
    fn try_from(s: String) -> ModelResult<Self> {
        if s.trim().is_empty() {
            return Err(ModelError::EmptyTemplate);
        }
        Ok(Self(s))
    }
}

impl FromStr for CommandTemplate {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        Self::try_from(s.to_owned())
    }
}

impl From<CommandTemplate> for String {
    fn from(t: CommandTemplate) -> Self {
        t.0
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single unit of work for the job runner.
///
/// Either a standalone command string (`template == None`) or a template plus one argument.
/// Resolved into an argument vector only at dispatch time, see [`JobInvocation::to_argv`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInvocation {
    /// Optional prefix command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<CommandTemplate>,
    /// Queued argument, or the whole command when no template is set.
    pub argument: String,
}

impl JobInvocation {
    /// Invocation executed verbatim by the shell.
    pub fn standalone(command: impl Into<String>) -> Self {
        Self {
            template: None,
            argument: command.into(),
        }
    }

    /// Invocation that runs `template` with `argument` as its last parameter.
    pub fn templated(template: CommandTemplate, argument: impl Into<String>) -> Self {
        Self {
            template: Some(template),
            argument: argument.into(),
        }
    }

    /// Build from an optional template, the way the runner fills its queue.
    pub fn with_template(template: Option<&CommandTemplate>, argument: impl Into<String>) -> Self {
        Self {
            template: template.cloned(),
            argument: argument.into(),
        }
    }

    /// Resolve into `[program, args...]` for the given shell.
    ///
    /// - standalone: `[shell, "-c", argument]`
    /// - templated:  `[shell, "-c", "<template> \"$@\"", "shkit-job", argument]`
    pub fn to_argv(&self, shell: &str) -> Vec<String> {
        match &self.template {
            None => vec![shell.to_string(), "-c".to_string(), self.argument.clone()],
            Some(t) => vec![
                shell.to_string(),
                "-c".to_string(),
                format!("{} \"$@\"", t.as_str()),
                TEMPLATE_ARG0.to_string(),
                self.argument.clone(),
            ],
        }
    }
}

impl fmt::Display for JobInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.template {
            None => f.write_str(&self.argument),
            Some(t) => write!(f, "{} {:?}", t, self.argument),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_rejects_blank() {
        assert!(matches!(
            CommandTemplate::new("   "),
            Err(ModelError::EmptyTemplate)
        ));
        assert!("".parse::<CommandTemplate>().is_err());
        assert_eq!(CommandTemplate::new("gzip -9").unwrap().as_str(), "gzip -9");
    }

    #[test]
    fn standalone_runs_through_shell() {
        let inv = JobInvocation::standalone("sleep 1 && echo a");
        assert_eq!(inv.to_argv("sh"), vec!["sh", "-c", "sleep 1 && echo a"]);
    }

    #[test]
    fn templated_passes_argument_positionally() {
        let t = CommandTemplate::new("echo").unwrap();
        let inv = JobInvocation::templated(t, "a; rm -rf /tmp/x");
        let argv = inv.to_argv("bash");

        assert_eq!(argv[0], "bash");
        assert_eq!(argv[2], "echo \"$@\"");
        assert_eq!(argv.last().map(String::as_str), Some("a; rm -rf /tmp/x"));
        assert!(!argv[2].contains("rm -rf"));
    }

    #[test]
    fn with_template_clones_optional_prefix() {
        let t = CommandTemplate::new("wc -l").unwrap();
        assert_eq!(
            JobInvocation::with_template(Some(&t), "f.txt"),
            JobInvocation::templated(t, "f.txt")
        );
        assert_eq!(
            JobInvocation::with_template(None, "ls"),
            JobInvocation::standalone("ls")
        );
    }

    #[test]
    fn display_shows_command() {
        assert_eq!(JobInvocation::standalone("ls -l").to_string(), "ls -l");
        let t = CommandTemplate::new("cat").unwrap();
        assert_eq!(JobInvocation::templated(t, "a b").to_string(), "cat \"a b\"");
    }

    #[test]
    fn serde_skips_missing_template() {
        let inv = JobInvocation::standalone("true");
        let json = serde_json::to_string(&inv).unwrap();
        assert_eq!(json, r#"{"argument":"true"}"#);

        let back: JobInvocation = serde_json::from_str(r#"{"template":"echo","argument":"x"}"#).unwrap();
        assert_eq!(back.template.as_ref().map(|t| t.as_str()), Some("echo"));
        assert!(serde_json::from_str::<JobInvocation>(r#"{"template":"","argument":"x"}"#).is_err());
    }
}
