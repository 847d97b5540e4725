use super::{Block, OutputSink, Tone};
use console::{Style, measure_text_width};
use terminal_size::{Width, terminal_size};

const MIN_WIDTH: usize = 40;
const MAX_WIDTH: usize = 90;

/// Renders blocks to stdout with `console` styling.
///
/// Panels are boxed and their bodies wrapped to the terminal width (clamped
/// to a readable range); lines are printed as-is.
pub struct ConsoleSink {
    width: usize,
}

impl ConsoleSink {
    pub fn new() -> Self {
        let width = terminal_size()
            .map(|(Width(w), _)| w as usize)
            .unwrap_or(80);
        Self::with_width(width)
    }

    pub fn with_width(width: usize) -> Self {
        Self {
            width: width.clamp(MIN_WIDTH, MAX_WIDTH),
        }
    }

    fn style(tone: Tone) -> Style {
        match tone {
            Tone::Plain => Style::new(),
            Tone::Story => Style::new().cyan(),
            Tone::Task => Style::new().yellow(),
            Tone::Success => Style::new().green(),
            Tone::Failure => Style::new().red(),
            Tone::Warning => Style::new().yellow(),
            Tone::Hint => Style::new().cyan(),
            Tone::Command => Style::new().green(),
            Tone::Muted => Style::new().dim(),
        }
    }

    /// Render a block to a string, including ANSI styling when enabled.
    pub fn render(&self, block: &Block) -> String {
        match block {
            Block::Blank => String::new(),
            Block::Line { text, tone } => Self::style(*tone).apply_to(text).to_string(),
            Block::Panel {
                title,
                subtitle,
                body,
                tone,
            } => self.render_panel(title, subtitle.as_deref(), body, *tone),
        }
    }

    fn render_panel(&self, title: &str, subtitle: Option<&str>, body: &str, tone: Tone) -> String {
        let border = Self::style(tone);
        let inner = self.width - 4;
        let mut out = Vec::new();

        let heading = if title.is_empty() {
            String::new()
        } else {
            format!(" {title} ")
        };
        let fill = (self.width - 3).saturating_sub(measure_text_width(&heading));
        out.push(format!(
            "{}{}{}",
            border.apply_to("╭─"),
            Style::new().bold().apply_to(&heading),
            border.apply_to(format!("{}╮", "─".repeat(fill)))
        ));

        let mut lines: Vec<String> = Vec::new();
        if let Some(sub) = subtitle {
            lines.push(Style::new().dim().apply_to(sub).to_string());
            lines.push(String::new());
        }
        for line in textwrap::wrap(body, inner) {
            lines.push(line.into_owned());
        }

        for line in lines {
            let pad = inner.saturating_sub(measure_text_width(&line));
            out.push(format!(
                "{} {}{} {}",
                border.apply_to("│"),
                line,
                " ".repeat(pad),
                border.apply_to("│")
            ));
        }

        out.push(
            border
                .apply_to(format!("╰{}╯", "─".repeat(self.width - 2)))
                .to_string(),
        );
        out.join("\n")
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for ConsoleSink {
    fn emit(&self, block: Block) {
        println!("{}", self.render(&block));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> String {
        console::strip_ansi_codes(s).into_owned()
    }

    #[test]
    fn test_width_is_clamped() {
        assert_eq!(ConsoleSink::with_width(10).width, MIN_WIDTH);
        assert_eq!(ConsoleSink::with_width(500).width, MAX_WIDTH);
        assert_eq!(ConsoleSink::with_width(60).width, 60);
    }

    #[test]
    fn test_panel_lines_share_width() {
        let sink = ConsoleSink::with_width(50);
        let rendered = plain(&sink.render(&Block::Panel {
            title: "Act 1: The First Decision".into(),
            subtitle: Some("Age 18".into()),
            body: "You're 18. High school is over. ".repeat(5),
            tone: Tone::Story,
        }));
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines.len() > 4);
        assert!(lines[0].contains("Act 1: The First Decision"));
        for line in &lines {
            assert_eq!(measure_text_width(line), 50, "line: {line:?}");
        }
    }

    #[test]
    fn test_line_keeps_text() {
        let sink = ConsoleSink::with_width(80);
        let rendered = plain(&sink.render(&Block::Line {
            text: "$ git status".into(),
            tone: Tone::Command,
        }));
        assert_eq!(rendered, "$ git status");
        assert_eq!(sink.render(&Block::Blank), "");
    }
}
