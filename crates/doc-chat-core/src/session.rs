//! Chat session state.
//!
//! A [`ChatSession`] owns the conversation, the loading flag, and the
//! currently opened source. It is driven by discrete events: a send begins
//! and completes, a citation is opened, the excerpt toggled, the detail view
//! closed. Nothing here performs I/O except [`ChatSession::send`], which
//! wraps one API round trip between [`ChatSession::begin_send`] and
//! [`ChatSession::complete_send`].

use tracing::{debug, warn};

use crate::api::{ApiResult, DocChatApi};
use crate::citation::{format_message, CitationMarker, FormattedMessage};
use crate::excerpt::ExcerptView;
use crate::highlight::ActiveHighlight;
use crate::models::{ChatMessage, ChatReply, Role};

/// A question accepted by [`ChatSession::begin_send`] and awaiting its reply.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending send must be completed to clear the loading state"]
pub struct PendingSend {
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    is_loading: bool,
    highlight: Option<ActiveHighlight>,
    detail: Option<ExcerptView>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// True while a question is outstanding; further sends are ignored.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn highlight(&self) -> Option<&ActiveHighlight> {
        self.highlight.as_ref()
    }

    /// The open source detail view, if any.
    pub fn detail(&self) -> Option<&ExcerptView> {
        self.detail.as_ref()
    }

    /// Accept `input` as the next question.
    ///
    /// Returns `None` (and changes nothing) for blank input or while another
    /// question is outstanding.
    pub fn begin_send(&mut self, input: &str) -> Option<PendingSend> {
        if input.trim().is_empty() || self.is_loading {
            return None;
        }
        self.messages.push(ChatMessage::user(input));
        self.is_loading = true;
        Some(PendingSend {
            message: input.to_string(),
        })
    }

    /// Record the outcome of `pending`. Appends exactly one assistant message
    /// and always clears the loading flag.
    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        result: ApiResult<ChatReply>,
    ) -> &ChatMessage {
        let reply = match result {
            Ok(reply) => {
                debug!(sources = reply.sources.len(), "chat reply received");
                ChatMessage::assistant(reply.response, reply.sources)
            }
            Err(e) => {
                warn!(question = %pending.message, error = %e, "chat request failed");
                ChatMessage::assistant(e.to_string(), Vec::new())
            }
        };
        self.messages.push(reply);
        self.is_loading = false;
        &self.messages[self.messages.len() - 1]
    }

    /// Ask `input` and wait for the answer.
    ///
    /// Returns the appended assistant message, or `None` when the input was
    /// ignored.
    pub async fn send(&mut self, api: &dyn DocChatApi, input: &str) -> Option<&ChatMessage> {
        let pending = self.begin_send(input)?;
        let result = api.send_chat(&pending.message).await;
        Some(self.complete_send(pending, result))
    }

    /// The user turn immediately preceding message `id` (empty if none).
    pub fn question_for(&self, id: &str) -> &str {
        match self.messages.iter().position(|m| m.id == id) {
            Some(idx) if idx > 0 => &self.messages[idx - 1].content,
            _ => "",
        }
    }

    /// The most recent assistant message.
    pub fn last_answer(&self) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// Lay out `message` with citations and the active highlight.
    pub fn render(&self, message: &ChatMessage) -> FormattedMessage {
        format_message(message, self.question_for(&message.id), self.highlight.as_ref())
    }

    /// Lay out the whole conversation.
    pub fn render_all(&self) -> Vec<FormattedMessage> {
        self.messages.iter().map(|m| self.render(m)).collect()
    }

    /// Open the detail view for `marker` and highlight the cited passage in
    /// every message citing the same source.
    pub fn open_citation(
        &mut self,
        formatted: &FormattedMessage,
        marker: &CitationMarker,
    ) -> &ExcerptView {
        self.highlight = ActiveHighlight::for_source(&marker.source, &formatted.content);
        debug!(
            source = %marker.source.key(),
            highlight = ?self.highlight.as_ref().map(|h| h.target.as_str()),
            "citation opened"
        );
        self.detail
            .insert(ExcerptView::new(marker.source.clone(), &formatted.question))
    }

    /// Flip the open detail view between relevant and full text.
    pub fn toggle_excerpt(&mut self) -> bool {
        self.detail.as_mut().map(ExcerptView::toggle).unwrap_or(false)
    }

    /// Close the detail view and drop the highlight.
    pub fn close_detail(&mut self) {
        self.detail = None;
        self.highlight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::memory::{MemoryApi, Operation};
    use crate::api::ApiError;
    use crate::citation::Segment;
    use crate::models::SourceReference;

    fn budget_source() -> SourceReference {
        SourceReference {
            document_id: Some(3),
            filename: "budget.xlsx".into(),
            text: "The council met on Monday. The annual budget increased to 4 million dollars. \
                   Roads were repaved. Parks stayed closed."
                .into(),
            chunk_index: Some(2),
            score: Some(0.91),
        }
    }

    #[tokio::test]
    async fn successful_send_appends_question_and_answer() {
        let api = MemoryApi::new();
        api.push_reply(ChatReply {
            response: "It rose to 4 million.".into(),
            sources: vec![budget_source()],
        });
        let mut session = ChatSession::new();
        let answer = session.send(&api, "What did the budget increase to?").await.unwrap();
        assert_eq!(answer.role, Role::Assistant);
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(session.messages().len(), 2);
        assert!(!session.is_loading());
        assert_eq!(api.received_messages(), vec!["What did the budget increase to?"]);
    }

    #[tokio::test]
    async fn failed_send_appends_one_error_message() {
        let api = MemoryApi::new();
        api.set_offline(true);
        let mut session = ChatSession::new();
        session.send(&api, "hello?").await;

        let assistant: Vec<&ChatMessage> = session
            .messages()
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .collect();
        assert_eq!(assistant.len(), 1);
        assert!(assistant[0].content.contains("connection refused"));
        assert!(assistant[0].sources.is_empty());
        assert!(!session.is_loading());
    }

    #[test]
    fn rejected_send_uses_api_message() {
        let mut session = ChatSession::new();
        let pending = session.begin_send("anything").unwrap();
        let msg = session.complete_send(
            pending,
            Err(ApiError::rejected(500, crate::api::SEND_FAILED)),
        );
        assert_eq!(msg.content, "Failed to send message");
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let api = MemoryApi::new();
        let mut session = ChatSession::new();
        assert!(session.send(&api, "   \n").await.is_none());
        assert!(session.messages().is_empty());
        assert_eq!(api.calls(Operation::Chat), 0);
    }

    #[test]
    fn second_send_while_loading_is_ignored() {
        let mut session = ChatSession::new();
        let first = session.begin_send("one").unwrap();
        assert!(session.is_loading());
        assert!(session.begin_send("two").is_none());
        assert_eq!(session.messages().len(), 1);
        session.complete_send(first, Ok(ChatReply { response: "1".into(), sources: vec![] }));
        assert!(session.begin_send("two").is_some());
    }

    #[tokio::test]
    async fn question_for_is_previous_turn() {
        let api = MemoryApi::new();
        let mut session = ChatSession::new();
        session.send(&api, "first question").await;
        let answer_id = session.messages()[1].id.clone();
        let question_id = session.messages()[0].id.clone();
        assert_eq!(session.question_for(&answer_id), "first question");
        assert_eq!(session.question_for(&question_id), "");
        assert_eq!(session.question_for("missing"), "");
    }

    #[tokio::test]
    async fn opening_a_citation_highlights_and_shows_relevant_excerpt() {
        let api = MemoryApi::new();
        api.push_reply(ChatReply {
            response: "The annual budget increased to 4 million dollars. Roads improved.".into(),
            sources: vec![budget_source()],
        });
        let mut session = ChatSession::new();
        session.send(&api, "What did the budget increase to?").await;

        let answer = session.last_answer().unwrap().clone();
        let formatted = session.render(&answer);
        assert_eq!(formatted.question, "What did the budget increase to?");
        let marker = formatted.markers().next().unwrap().clone();

        let view = session.open_citation(&formatted, &marker);
        assert_eq!(
            view.relevant_text(),
            "The annual budget increased to 4 million dollars. Roads were repaved."
        );
        assert!(view.can_toggle());
        assert_eq!(
            session.highlight().map(|h| h.target.as_str()),
            Some("annual budget increased")
        );

        let rerendered = session.render(&answer);
        assert!(rerendered
            .segments
            .iter()
            .any(|s| *s == Segment::Highlight("annual budget increased".into())));

        assert!(session.toggle_excerpt());
        assert!(session.detail().unwrap().is_showing_full());

        session.close_detail();
        assert!(session.detail().is_none());
        assert!(session.highlight().is_none());
        assert!(!session.toggle_excerpt());
    }
}
