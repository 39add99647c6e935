use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Questions the workflow asks; each prompt implementation decides how to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question<'a> {
    BoundaryLayer,
    FeatureLayer,
    LayerName,
    Directory,
    WktColumn,
    Overwrite(&'a Path),
}

impl Question<'_> {
    pub fn text(&self) -> String {
        match self {
            Question::BoundaryLayer => {
                "Select a boundary layer (polygon or multi-polygon)".to_owned()
            }
            Question::FeatureLayer => "Select a feature layer (delimited text)".to_owned(),
            Question::LayerName => "Enter new layer name".to_owned(),
            Question::Directory => "Directory to save the modified feature layer".to_owned(),
            Question::WktColumn => "Select the WKT geometry column".to_owned(),
            Question::Overwrite(path) => {
                format!("The file {} already exists. Overwrite?", path.display())
            }
        }
    }
}

pub trait UserPrompt {
    /// Index into `options`, or `None` if the user cancelled.
    fn choose(&mut self, question: Question<'_>, options: &[String]) -> Option<usize>;

    fn text(&mut self, question: Question<'_>, default: &str) -> Option<String>;

    fn confirm(&mut self, question: Question<'_>) -> bool;
}

/// Line-oriented prompt over any reader/writer pair; stdin/stdout by default.
pub struct StdioPrompt<R, W> {
    input: R,
    output: W,
}

impl StdioPrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self {
            input: io::stdin().lock(),
            output: io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> StdioPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Trimmed line, or `None` on end of input or read failure.
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_owned()),
        }
    }

    fn say(&mut self, text: &str) {
        if let Err(e) = write!(self.output, "{text}").and_then(|_| self.output.flush()) {
            tracing::debug!(error = %e, "prompt output failed");
        }
    }
}

impl<R: BufRead, W: Write> UserPrompt for StdioPrompt<R, W> {
    fn choose(&mut self, question: Question<'_>, options: &[String]) -> Option<usize> {
        if options.is_empty() {
            return None;
        }
        let mut menu = format!("{}:\n", question.text());
        for (i, option) in options.iter().enumerate() {
            menu.push_str(&format!("  {}) {option}\n", i + 1));
        }
        self.say(&menu);

        loop {
            self.say("> ");
            let line = self.read_line()?;
            if line.is_empty() {
                return None;
            }
            if let Ok(n) = line.parse::<usize>() {
                if (1..=options.len()).contains(&n) {
                    return Some(n - 1);
                }
            }
            if let Some(i) = options.iter().position(|o| *o == line) {
                return Some(i);
            }
            self.say(&format!("'{line}' is not one of the options\n"));
        }
    }

    fn text(&mut self, question: Question<'_>, default: &str) -> Option<String> {
        self.say(&format!("{} [{default}]: ", question.text()));
        let line = self.read_line()?;
        Some(if line.is_empty() { default.to_owned() } else { line })
    }

    fn confirm(&mut self, question: Question<'_>) -> bool {
        self.say(&format!("{} [y/N]: ", question.text()));
        matches!(
            self.read_line().as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y" | "yes")
        )
    }
}

/// Answers fixed up front, e.g. from command-line flags. Unanswered choices
/// cancel; unanswered text questions take the offered default.
#[derive(Debug, Clone, Default)]
pub struct PresetPrompt {
    pub boundary_layer: Option<String>,
    pub feature_layer: Option<String>,
    pub layer_name: Option<String>,
    pub directory: Option<PathBuf>,
    pub wkt_column: Option<String>,
    pub overwrite: bool,
}

impl UserPrompt for PresetPrompt {
    fn choose(&mut self, question: Question<'_>, options: &[String]) -> Option<usize> {
        let wanted = match question {
            Question::BoundaryLayer => self.boundary_layer.as_deref(),
            Question::FeatureLayer => self.feature_layer.as_deref(),
            Question::WktColumn => self.wkt_column.as_deref(),
            _ => None,
        }?;
        let found = options.iter().position(|o| o == wanted);
        if found.is_none() {
            tracing::warn!(?question, wanted, ?options, "preset answer is not an option");
        }
        found
    }

    fn text(&mut self, question: Question<'_>, default: &str) -> Option<String> {
        let answer = match question {
            Question::LayerName => self.layer_name.clone(),
            Question::Directory => self
                .directory
                .as_ref()
                .map(|d| d.to_string_lossy().into_owned()),
            _ => None,
        };
        Some(answer.unwrap_or_else(|| default.to_owned()))
    }

    fn confirm(&mut self, question: Question<'_>) -> bool {
        tracing::debug!(?question, answer = self.overwrite, "preset confirmation");
        matches!(question, Question::Overwrite(_)) && self.overwrite
    }
}
