//! Learner-facing output.
//!
//! Everything the tutorial shows the learner goes through an `OutputSink`
//! passed in at construction. `ConsoleSink` renders to the terminal;
//! `RecordingSink` keeps the blocks in memory for tests.

pub mod console_sink;
pub mod icons;
pub mod recording;

pub use console_sink::ConsoleSink;
pub use recording::RecordingSink;

/// How a block of text should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    /// Narrative and headings.
    Story,
    /// The learner's task.
    Task,
    Success,
    Failure,
    Warning,
    Hint,
    /// Commands as typed at a shell prompt.
    Command,
    Muted,
}

/// One unit of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Panel {
        title: String,
        subtitle: Option<String>,
        body: String,
        tone: Tone,
    },
    Line {
        text: String,
        tone: Tone,
    },
    Blank,
}

impl Block {
    /// All text carried by the block, for searching.
    pub fn text(&self) -> String {
        match self {
            Block::Panel {
                title,
                subtitle,
                body,
                ..
            } => match subtitle {
                Some(sub) => format!("{title}\n{sub}\n{body}"),
                None => format!("{title}\n{body}"),
            },
            Block::Line { text, .. } => text.clone(),
            Block::Blank => String::new(),
        }
    }
}

pub trait OutputSink {
    fn emit(&self, block: Block);

    fn line(&self, text: &str, tone: Tone) {
        self.emit(Block::Line {
            text: text.to_string(),
            tone,
        });
    }

    fn blank(&self) {
        self.emit(Block::Blank);
    }

    fn panel(&self, title: &str, subtitle: Option<&str>, body: &str, tone: Tone) {
        self.emit(Block::Panel {
            title: title.to_string(),
            subtitle: subtitle.map(str::to_string),
            body: body.to_string(),
            tone,
        });
    }
}
