//! `docchat ask` (one question) and `docchat chat` (interactive loop).

use anyhow::{anyhow, bail, Result};
use doc_chat_core::api::DocChatApi;
use doc_chat_core::library::DocumentLibrary;
use doc_chat_core::models::ChatMessage;
use doc_chat_core::session::ChatSession;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::render::{self, Style};

const HELP: &str = "\
Type a question and press Enter. Commands:
  /cite N   open source [N] of the last answer
  /full     toggle between relevant and full excerpt
  /close    close the open source
  /docs     list uploaded documents
  /help     show this help
  /quit     exit";

/// One line of REPL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Ask(String),
    Cite(usize),
    Full,
    Close,
    Docs,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Ask(line.to_string());
    };
    let mut parts = rest.split_whitespace();
    match (parts.next().unwrap_or(""), parts.next()) {
        ("cite", Some(n)) => n
            .parse()
            .map(ReplCommand::Cite)
            .unwrap_or_else(|_| ReplCommand::Unknown(line.to_string())),
        ("full", None) => ReplCommand::Full,
        ("close", None) => ReplCommand::Close,
        ("docs", None) => ReplCommand::Docs,
        ("help", None) => ReplCommand::Help,
        ("quit", None) | ("exit", None) => ReplCommand::Quit,
        _ => ReplCommand::Unknown(line.to_string()),
    }
}

/// A session plus the citation number of the open source, if any.
struct Conversation {
    session: ChatSession,
    open: Option<usize>,
    style: Style,
}

impl Conversation {
    fn new(style: Style) -> Self {
        Self {
            session: ChatSession::new(),
            open: None,
            style,
        }
    }

    fn show(&self, message: &ChatMessage) -> String {
        self.style.message(message, &self.session.render(message))
    }

    /// Open source `number` of the last answer and return the detail view
    /// followed by the answer redrawn with the highlight.
    fn cite(&mut self, number: usize) -> Result<String> {
        let answer = self
            .session
            .last_answer()
            .cloned()
            .ok_or_else(|| anyhow!("No answer to cite yet."))?;
        let formatted = self.session.render(&answer);
        let marker = formatted
            .marker_by_number(number)
            .cloned()
            .ok_or_else(|| anyhow!("No source [{}] in the last answer.", number))?;
        let view = self.session.open_citation(&formatted, &marker);
        let mut out = self.style.excerpt(number, view);
        self.open = Some(number);
        out.push('\n');
        out.push_str(&self.show(&answer));
        Ok(out)
    }

    fn toggle(&mut self) -> Option<String> {
        if !self.session.toggle_excerpt() {
            return None;
        }
        let number = self.open?;
        let view = self.session.detail()?;
        Some(self.style.excerpt(number, view))
    }

    fn close(&mut self) {
        self.session.close_detail();
        self.open = None;
    }
}

/// Ask one question and print the answer. With `source`, also open that
/// citation's detail view (`full` shows the whole excerpt).
pub async fn run_ask(
    api: &dyn DocChatApi,
    question: &str,
    source: Option<usize>,
    full: bool,
    style: Style,
) -> Result<()> {
    let mut conv = Conversation::new(style);
    let pending = conv
        .session
        .begin_send(question)
        .ok_or_else(|| anyhow!("Question must not be empty"))?;
    let result = api.send_chat(&pending.message).await;
    let failed = result.is_err();
    let answer = conv.session.complete_send(pending, result).clone();
    if failed {
        bail!("{}", answer.content);
    }

    match source {
        None => print!("{}", conv.show(&answer)),
        Some(number) => {
            let mut out = conv.cite(number)?;
            if full {
                if let Some(expanded) = conv.toggle() {
                    out = format!("{}\n{}", expanded, conv.show(&answer));
                }
            }
            print!("{}", out);
        }
    }
    Ok(())
}

/// Interactive chat on stdin/stdout until `/quit` or end of input.
pub async fn run_chat(api: &dyn DocChatApi, style: Style) -> Result<()> {
    let mut conv = Conversation::new(style);
    let mut library = DocumentLibrary::new();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n", HELP);
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let output = match parse_command(&line) {
            ReplCommand::Empty => continue,
            ReplCommand::Quit => break,
            ReplCommand::Help => format!("{}\n", HELP),
            ReplCommand::Ask(question) => {
                conv.close();
                match conv.session.send(api, &question).await.cloned() {
                    Some(answer) => conv.show(&answer),
                    None => continue,
                }
            }
            ReplCommand::Cite(number) => match conv.cite(number) {
                Ok(out) => out,
                Err(e) => format!("{}\n", e),
            },
            ReplCommand::Full => conv
                .toggle()
                .unwrap_or_else(|| "Nothing to toggle.\n".to_string()),
            ReplCommand::Close => {
                conv.close();
                "Closed.\n".to_string()
            }
            ReplCommand::Docs => {
                library.refresh(api).await;
                render::documents(library.documents())
            }
            ReplCommand::Unknown(cmd) => format!("Unknown command: {} (try /help)\n", cmd),
        };
        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;
    Ok(())
}
