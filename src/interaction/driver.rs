use super::Interaction;
use crate::errors::MenuError;
use crate::ui::icons::{CHECK, CROSS, FILE_NEW, WAIT};
use crate::ui::{OutputSink, Tone};
use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// One selectable entry in a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption<A> {
    /// What the learner types to pick this option.
    pub key: String,
    /// The git command this option stands for.
    pub command: String,
    pub description: String,
    pub action: A,
}

impl<A> MenuOption<A> {
    pub fn new(
        key: impl Into<String>,
        command: impl Into<String>,
        description: impl Into<String>,
        action: A,
    ) -> Self {
        Self {
            key: key.into(),
            command: command.into(),
            description: description.into(),
            action,
        }
    }
}

fn check_menu<A>(options: &[MenuOption<A>]) -> Result<(), MenuError> {
    if options.is_empty() {
        return Err(MenuError::Empty);
    }
    let mut seen = HashSet::new();
    for option in options {
        if !seen.insert(option.key.as_str()) {
            return Err(MenuError::DuplicateKey(option.key.clone()));
        }
    }
    Ok(())
}

/// Menu-driven interaction surface shared by every stage.
pub struct Driver<'a> {
    sink: &'a dyn OutputSink,
    input: &'a mut dyn Interaction,
}

impl<'a> Driver<'a> {
    pub fn new(sink: &'a dyn OutputSink, input: &'a mut dyn Interaction) -> Self {
        Self { sink, input }
    }

    pub fn sink(&self) -> &'a dyn OutputSink {
        self.sink
    }

    /// Show `options` and block until the learner picks a valid key, or
    /// types an option's command in full.
    ///
    /// Anything else is answered with a warning and asked again; it never
    /// falls back to a default.
    pub fn present_menu<A: Clone>(&mut self, options: &[MenuOption<A>], prompt: &str) -> Result<A> {
        check_menu(options)?;

        self.sink.blank();
        self.sink.line(prompt, Tone::Task);
        for option in options {
            self.sink.line(
                &format!(
                    "  [{}] {:<28} {}",
                    option.key, option.command, option.description
                ),
                Tone::Plain,
            );
        }

        let keys: Vec<&str> = options.iter().map(|o| o.key.as_str()).collect();
        loop {
            let answer = self.input.read_line("Your choice")?;
            let answer = answer.trim();
            let picked = options.iter().find(|o| {
                o.key == answer || (!answer.is_empty() && o.command.eq_ignore_ascii_case(answer))
            });
            if let Some(option) = picked {
                debug!(key = answer, command = %option.command, "menu selection");
                return Ok(option.action.clone());
            }
            debug!(input = answer, "invalid menu selection");
            self.sink.line(
                &format!("'{}' is not an option. Choose one of: {}", answer, keys.join(", ")),
                Tone::Warning,
            );
        }
    }

    /// Free-text prompt. Empty input yields `default` when there is one and
    /// is asked again otherwise.
    pub fn prompt_for_text(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        loop {
            let answer = self.input.read_text(prompt, default)?;
            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(answer.to_string());
            }
            if let Some(default) = default {
                return Ok(default.to_string());
            }
            self.sink.line("Please type something.", Tone::Warning);
        }
    }

    pub fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        self.input.confirm(prompt, default)
    }

    pub fn read_line(&mut self, prompt: &str) -> Result<String> {
        self.input.read_line(prompt)
    }

    /// Block until `path` exists, asking the learner to continue between checks.
    ///
    /// There is no timeout: the learner sets the pace.
    pub fn wait_for_file_creation(&mut self, path: &Path, message: Option<&str>) -> Result<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        if let Some(message) = message {
            self.sink.blank();
            self.sink.panel("Your Task", None, message, Tone::Task);
        }

        loop {
            if path.exists() {
                self.sink
                    .line(&format!("{}Found {}", FILE_NEW, name), Tone::Success);
                return Ok(());
            }
            self.sink.line(
                &format!("{}Waiting for {} ...", WAIT, name),
                Tone::Muted,
            );
            self.input
                .read_line(&format!("Press Enter once you've created {name}"))?;
        }
    }

    /// Echo a command the way a shell would and say whether it worked.
    pub fn report_command_outcome(&self, command: &str, success: bool, message: Option<&str>) {
        self.sink.blank();
        self.sink.line(&format!("$ {command}"), Tone::Command);
        match (success, message) {
            (true, Some(message)) => self
                .sink
                .line(&format!("{}{}", CHECK, message), Tone::Success),
            (true, None) => self.sink.line(&format!("{}Done", CHECK), Tone::Success),
            (false, Some(message)) => self
                .sink
                .line(&format!("{}{}", CROSS, message), Tone::Failure),
            (false, None) => self.sink.line(&format!("{}Failed", CROSS), Tone::Failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::ScriptedInteraction;
    use crate::ui::RecordingSink;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq)]
    enum Act {
        Add,
        Status,
    }

    fn menu() -> Vec<MenuOption<Act>> {
        vec![
            MenuOption::new("1", "git add decision.txt", "Stage your decision", Act::Add),
            MenuOption::new("2", "git status", "See where you are", Act::Status),
        ]
    }

    #[test]
    fn test_menu_returns_chosen_action() {
        let sink = RecordingSink::new();
        let mut input = ScriptedInteraction::new(["2"]);
        let mut driver = Driver::new(&sink, &mut input);
        assert_eq!(driver.present_menu(&menu(), "Stage?").unwrap(), Act::Status);
        assert!(sink.contains("git add decision.txt"));
        assert!(sink.contains("Stage?"));
    }

    #[test]
    fn test_menu_reprompts_on_invalid_input() {
        let sink = RecordingSink::new();
        let mut input = ScriptedInteraction::new(["", "9", "add", " 1 "]);
        let mut driver = Driver::new(&sink, &mut input);
        assert_eq!(driver.present_menu(&menu(), "Stage?").unwrap(), Act::Add);
        assert_eq!(sink.count("is not an option"), 3);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn test_menu_accepts_typed_command() {
        let sink = RecordingSink::new();
        let mut input = ScriptedInteraction::new(["Git Status"]);
        let mut driver = Driver::new(&sink, &mut input);
        assert_eq!(driver.present_menu(&menu(), "Stage?").unwrap(), Act::Status);
        assert_eq!(sink.count("is not an option"), 0);
    }

    #[test]
    fn test_menu_rejects_bad_definitions() {
        let sink = RecordingSink::new();
        let mut input = ScriptedInteraction::new(["1"]);
        let mut driver = Driver::new(&sink, &mut input);

        let empty: Vec<MenuOption<Act>> = Vec::new();
        let err = driver.present_menu(&empty, "?").unwrap_err();
        assert_eq!(err.downcast_ref::<MenuError>(), Some(&MenuError::Empty));

        let dup = vec![
            MenuOption::new("1", "a", "", Act::Add),
            MenuOption::new("1", "b", "", Act::Status),
        ];
        let err = driver.present_menu(&dup, "?").unwrap_err();
        assert_eq!(
            err.downcast_ref::<MenuError>(),
            Some(&MenuError::DuplicateKey("1".into()))
        );
    }

    #[test]
    fn test_prompt_for_text_default_and_retry() {
        let sink = RecordingSink::new();
        let mut input = ScriptedInteraction::new(["", "  ", "startup "]);
        let mut driver = Driver::new(&sink, &mut input);
        assert_eq!(driver.prompt_for_text("Name", Some("travel")).unwrap(), "travel");
        assert_eq!(driver.prompt_for_text("Name", None).unwrap(), "startup");
        assert!(sink.contains("Please type something"));
    }

    #[test]
    fn test_wait_for_existing_file_returns_immediately() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decision.txt");
        std::fs::write(&path, "University").unwrap();

        let sink = RecordingSink::new();
        let mut input = ScriptedInteraction::new(Vec::<String>::new());
        let mut driver = Driver::new(&sink, &mut input);
        driver
            .wait_for_file_creation(&path, Some("Create decision.txt"))
            .unwrap();
        assert!(sink.contains("Found decision.txt"));
        assert!(sink.contains("Create decision.txt"));
    }

    #[test]
    fn test_wait_for_missing_file_keeps_asking() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("decision.txt");

        let sink = RecordingSink::new();
        let mut input = ScriptedInteraction::new(["", ""]);
        let mut driver = Driver::new(&sink, &mut input);
        // the file never appears, so the script runs dry
        let err = driver.wait_for_file_creation(&path, None).unwrap_err();
        assert!(err.to_string().contains("exhausted"));
        assert_eq!(sink.count("Waiting for decision.txt"), 3);
    }

    #[test]
    fn test_report_command_outcome() {
        let sink = RecordingSink::new();
        let mut input = ScriptedInteraction::default();
        let driver = Driver::new(&sink, &mut input);
        driver.report_command_outcome("git commit", false, Some("Nothing to commit"));
        driver.report_command_outcome("git add decision.txt", true, None);
        assert_eq!(sink.lines_with_tone(Tone::Command).len(), 2);
        assert!(sink.lines_with_tone(Tone::Failure)[0].contains("Nothing to commit"));
        assert_eq!(sink.lines_with_tone(Tone::Success).len(), 1);
    }
}
