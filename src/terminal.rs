// Terminal front-ends
//
// `TerminalSurface` prints the conversation for a person at a terminal.
// `JsonSurface` prints one JSON object per callback for another process.
// Both only ever append to their writer; an updated message is printed again.

use crate::history::HistoryEntry;
use crate::language::display_name_for_code;
use crate::projector::{
    self, DiffView, ExplanationBody, ExplanationRegion, RenderTree, NO_ERRORS_NOTICE,
    UNRECOGNIZED_LEAD, UNRECOGNIZED_TIPS, UNRECOGNIZED_TIPS_HEADING, UNRECOGNIZED_TITLE,
};
use crate::session::ChatSurface;
use crate::transcript::{BotContent, BotState, Message, MessageBody, MessageId, Subscription, TranscriptView};
use crate::turn::SubmissionSurface;
use serde_json::json;
use std::io::Write;
use std::sync::OnceLock;

/// A [`ChatSurface`] that can also show free-form notices (help, prompts,
/// command errors).
pub trait Console: ChatSurface {
    fn notice(&mut self, text: &str);
}

/// Disabled when `NO_COLOR` is set (any value) or `TERM=dumb`.
pub fn color_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| {
        if std::env::var_os("NO_COLOR").is_some() {
            return false;
        }
        !matches!(std::env::var("TERM").as_deref(), Ok("dumb"))
    })
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const FG_RED: &str = "\x1b[31m";
const FG_GREEN: &str = "\x1b[32m";
const FG_YELLOW: &str = "\x1b[33m";
const FG_CYAN: &str = "\x1b[36m";

#[derive(Debug, Clone, Copy)]
struct Palette {
    color: bool,
}

impl Palette {
    fn styled(&self, codes: &[&str], text: &str) -> String {
        if !self.color || codes.is_empty() {
            return text.to_string();
        }
        format!("{}{}{}", codes.concat(), text, RESET)
    }

    fn bold(&self, text: &str) -> String {
        self.styled(&[BOLD], text)
    }

    fn dim(&self, text: &str) -> String {
        self.styled(&[DIM], text)
    }

    fn red(&self, text: &str) -> String {
        self.styled(&[FG_RED], text)
    }

    fn green(&self, text: &str) -> String {
        self.styled(&[FG_GREEN], text)
    }

    fn amber(&self, text: &str) -> String {
        self.styled(&[FG_YELLOW], text)
    }

    fn cyan(&self, text: &str) -> String {
        self.styled(&[FG_CYAN], text)
    }
}

pub struct TerminalSurface<W: Write> {
    out: W,
    palette: Palette,
    accepting: bool,
}

impl TerminalSurface<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout(), color_enabled())
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            palette: Palette { color },
            accepting: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
    }

    fn render(&self, message: &Message) -> String {
        let p = self.palette;
        let tag = p.dim(&format!("[{}]", message.id));
        match &message.body {
            MessageBody::User { text } => format!("{} {} {}", tag, p.bold("you:"), text),
            MessageBody::Bot(BotState::Pending { label }) => {
                format!("{} {}", tag, p.dim(&format!("... {}", label)))
            }
            MessageBody::Bot(BotState::Resolved { content }) => match content {
                BotContent::Response {
                    tree,
                    subscriptions,
                    ..
                } => format!("{}\n{}", tag, self.render_tree(tree, subscriptions)),
                BotContent::Text { text } => format!("{} {}", tag, text),
                BotContent::Unrecognized => {
                    let mut lines = vec![
                        format!("{} {}", tag, p.amber(&p.bold(UNRECOGNIZED_TITLE))),
                        format!("    {}", UNRECOGNIZED_LEAD),
                        format!("    {}", UNRECOGNIZED_TIPS_HEADING),
                    ];
                    lines.extend(UNRECOGNIZED_TIPS.iter().map(|tip| format!("      - {}", tip)));
                    lines.join("\n")
                }
                BotContent::Error { message } => format!("{} {}", tag, p.red(message)),
            },
        }
    }

    fn render_tree(&self, tree: &RenderTree, subscriptions: &[Subscription]) -> String {
        let p = self.palette;
        let mut lines = Vec::new();
        match &tree.diff {
            DiffView::Unchanged { text } => lines.push(format!("    {}", p.green(text))),
            DiffView::Changed {
                original,
                corrected,
            } => {
                lines.push(format!("    {} {}", p.red("-"), p.red(original)));
                lines.push(format!("    {} {}", p.green("+"), p.green(corrected)));
            }
        }

        lines.extend(self.render_region(&tree.explanations));

        if !tree.actions.is_empty() {
            let buttons: Vec<String> = tree
                .actions
                .iter()
                .zip(subscriptions)
                .map(|(button, sub)| format!("{} {}", p.cyan(&format!("[{}]", sub)), button.kind.label()))
                .collect();
            lines.push(format!("    {}", buttons.join("  ")));
        }

        let options: Vec<String> = projector::language_options(&tree.explanations.language)
            .iter()
            .map(|o| {
                if o.selected {
                    p.bold(&format!("*{}", o.code))
                } else {
                    o.code.to_string()
                }
            })
            .collect();
        lines.push(format!("    {} {}", p.dim("explain in:"), options.join(" ")));
        lines.join("\n")
    }

    fn render_region(&self, region: &ExplanationRegion) -> Vec<String> {
        let p = self.palette;
        let mut lines = Vec::new();
        match &region.body {
            ExplanationBody::NoErrors => lines.push(format!("    {}", p.green(NO_ERRORS_NOTICE))),
            ExplanationBody::Cards(cards) => {
                for card in cards {
                    lines.push(format!(
                        "    {} -> {}: {}",
                        p.red(&card.wrong),
                        p.green(&card.correct),
                        card.explanation
                    ));
                    if let Some(note) = &card.tense_note {
                        lines.push(format!("      {}", p.amber(note)));
                    }
                }
            }
            ExplanationBody::Loading(label) => lines.push(format!("    {}", p.dim(&format!("... {}", label)))),
            ExplanationBody::Failed(message) => lines.push(format!("    {}", p.red(message))),
        }
        if let Some(block) = &region.translation {
            lines.push(format!("    {} {}", p.bold(&format!("{}:", block.label)), block.text));
        }
        lines
    }
}

impl<W: Write> SubmissionSurface for TerminalSurface<W> {
    fn set_submission_enabled(&mut self, enabled: bool) {
        self.accepting = enabled;
    }

    fn focus_input(&mut self) {
        if self.accepting {
            let _ = write!(self.out, "> ");
            let _ = self.out.flush();
        }
    }
}

impl<W: Write> TranscriptView for TerminalSurface<W> {
    fn message_appended(&mut self, message: &Message) {
        let text = self.render(message);
        self.emit(&text);
    }

    fn message_updated(&mut self, message: &Message) {
        let text = self.render(message);
        self.emit(&text);
    }

    fn scroll_to_bottom(&mut self) {
        let _ = self.out.flush();
    }
}

impl<W: Write> ChatSurface for TerminalSurface<W> {
    fn history_changed(&mut self, entries: &[HistoryEntry]) {
        let p = self.palette;
        if entries.is_empty() {
            self.emit(&p.dim("No history yet."));
            return;
        }
        self.emit(&p.bold("Recent searches:"));
        for (i, entry) in entries.iter().enumerate() {
            let line = format!("  {:>2}. {}", i + 1, entry.query);
            self.emit(&line);
        }
    }

    fn language_control_reverted(&mut self, message: MessageId, language: &str) {
        let line = format!(
            "[{}] still explained in {}",
            message,
            display_name_for_code(language)
        );
        let text = self.palette.dim(&line);
        self.emit(&text);
    }
}

impl<W: Write> Console for TerminalSurface<W> {
    fn notice(&mut self, text: &str) {
        self.emit(text);
        let _ = self.out.flush();
    }
}

/// One JSON object per line, keyed by `event`.
pub struct JsonSurface<W: Write> {
    out: W,
}

impl JsonSurface<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> JsonSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn emit(&mut self, value: serde_json::Value) {
        let _ = writeln!(self.out, "{}", value);
        let _ = self.out.flush();
    }
}

impl<W: Write> SubmissionSurface for JsonSurface<W> {
    fn set_submission_enabled(&mut self, enabled: bool) {
        self.emit(json!({ "event": "submission_enabled", "enabled": enabled }));
    }

    fn focus_input(&mut self) {}
}

impl<W: Write> TranscriptView for JsonSurface<W> {
    fn message_appended(&mut self, message: &Message) {
        self.emit(json!({ "event": "message_appended", "message": message }));
    }

    fn message_updated(&mut self, message: &Message) {
        self.emit(json!({ "event": "message_updated", "message": message }));
    }

    fn scroll_to_bottom(&mut self) {}
}

impl<W: Write> ChatSurface for JsonSurface<W> {
    fn history_changed(&mut self, entries: &[HistoryEntry]) {
        self.emit(json!({ "event": "history_changed", "entries": entries }));
    }

    fn language_control_reverted(&mut self, message: MessageId, language: &str) {
        self.emit(json!({
            "event": "language_control_reverted",
            "message": message,
            "language": language,
        }));
    }
}

impl<W: Write> Console for JsonSurface<W> {
    fn notice(&mut self, text: &str) {
        self.emit(json!({ "event": "notice", "text": text }));
    }
}
