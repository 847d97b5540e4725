use super::Interaction;
use anyhow::{Result, bail};
use std::collections::VecDeque;

/// Plays back a fixed list of learner responses.
///
/// Each call consumes the next response. Running out is an error rather
/// than a hang, so a test with a wrong script fails instead of looping.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    responses: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInteraction {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.responses.len()
    }

    fn next(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        match self.responses.pop_front() {
            Some(response) => Ok(response),
            None => bail!("Scripted input exhausted at prompt '{}'", prompt),
        }
    }
}

impl Interaction for ScriptedInteraction {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.next(prompt)
    }

    fn read_text(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        let response = self.next(prompt)?;
        match default {
            Some(default) if response.trim().is_empty() => Ok(default.to_string()),
            _ => Ok(response),
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        let response = self.next(prompt)?;
        Ok(match response.trim().to_lowercase().as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plays_back_in_order() {
        let mut script = ScriptedInteraction::new(["1", "hello"]);
        assert_eq!(script.read_line("pick").unwrap(), "1");
        assert_eq!(script.read_text("say", None).unwrap(), "hello");
        assert_eq!(script.prompts(), ["pick", "say"]);
        assert_eq!(script.remaining(), 0);
    }

    #[test]
    fn test_empty_text_takes_default() {
        let mut script = ScriptedInteraction::new([""]);
        assert_eq!(script.read_text("name", Some("travel")).unwrap(), "travel");
    }

    #[test]
    fn test_confirm_answers() {
        let mut script = ScriptedInteraction::new(["", "n", "YES"]);
        assert!(script.confirm("go?", true).unwrap());
        assert!(!script.confirm("go?", true).unwrap());
        assert!(script.confirm("go?", false).unwrap());
    }

    #[test]
    fn test_exhausted_script_errors() {
        let mut script = ScriptedInteraction::new(Vec::<String>::new());
        let err = script.read_line("anything").unwrap_err();
        assert!(err.to_string().contains("exhausted"));
    }
}
