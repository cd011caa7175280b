// Terminal command line parsing
//
// Plain text is a submission; lines starting with `/` are controls.

use crate::transcript::{MessageId, Subscription};

pub const HELP_TEXT: &str = "\
Type a sentence and press Enter to check it.
  /history          show recent searches
  /pick N           re-submit history entry N
  /clear            clear history (asks for confirmation)
  /lang CODE        explanation language for new sentences (en, es, fr, de, bn)
  /explain MSG CODE re-explain message MSG in another language
  /action ID        use a rewrite or suggestion button (e.g. /action a3)
  /help             show this help
  /quit             exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    ShowHistory,
    /// Zero-based history index.
    Pick(usize),
    Clear,
    Language(String),
    Explain { message: MessageId, language: String },
    Action(Subscription),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Submit(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    match (name, args.as_slice()) {
        ("history", []) => Ok(Command::ShowHistory),
        ("pick", [n]) => {
            let n: usize = n
                .parse()
                .map_err(|_| format!("Not a history number: {}", n))?;
            if n == 0 {
                return Err("History entries start at 1".to_string());
            }
            Ok(Command::Pick(n - 1))
        }
        ("clear", []) => Ok(Command::Clear),
        ("lang", [code]) => Ok(Command::Language(code.to_string())),
        ("explain", [message, code]) => {
            let id: u64 = message
                .parse()
                .map_err(|_| format!("Not a message number: {}", message))?;
            Ok(Command::Explain {
                message: MessageId(id),
                language: code.to_string(),
            })
        }
        ("action", [id]) => parse_subscription(id).map(Command::Action),
        ("help", []) => Ok(Command::Help),
        ("quit", []) | ("exit", []) => Ok(Command::Quit),
        _ => Err(format!("Unknown command: /{} (try /help)", rest)),
    }
}

fn parse_subscription(raw: &str) -> Result<Subscription, String> {
    let digits = raw.strip_prefix('a').unwrap_or(raw);
    digits
        .parse()
        .map(Subscription)
        .map_err(|_| format!("Not an action id: {}", raw))
}

/// Answer to the "clear history?" prompt. Anything but yes is a no.
pub fn is_confirmation(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}
