// Conversation renderer
//
// Append-only transcript of user and bot messages. A bot message starts as a
// placeholder and is resolved in place exactly once; the handle that allows
// resolving is consumed by `resolve`.

use crate::correction::CorrectionResult;
use crate::projector::{self, ActionButton, ExplanationBody, RenderTree};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Materializes transcript changes in a concrete UI.
pub trait TranscriptView {
    fn message_appended(&mut self, message: &Message);
    fn message_updated(&mut self, message: &Message);
    fn scroll_to_bottom(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id of one attached action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Subscription(pub u64);

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BotContent {
    Response {
        result: CorrectionResult,
        tree: RenderTree,
        subscriptions: Vec<Subscription>,
    },
    /// Plain echo, used for rewrite selections.
    Text { text: String },
    Unrecognized,
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BotState {
    Pending { label: String },
    Resolved { content: BotContent },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum MessageBody {
    User { text: String },
    Bot(BotState),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub body: MessageBody,
}

impl Message {
    pub fn is_pending(&self) -> bool {
        matches!(self.body, MessageBody::Bot(BotState::Pending { .. }))
    }

    /// Rendered correction shown in this message, if any.
    pub fn response(&self) -> Option<(&CorrectionResult, &RenderTree)> {
        match &self.body {
            MessageBody::Bot(BotState::Resolved {
                content: BotContent::Response { result, tree, .. },
            }) => Some((result, tree)),
            _ => None,
        }
    }
}

/// Placeholder slot awaiting its content. Consumed by [`Transcript::resolve`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pending bot message must be resolved"]
pub struct PendingHandle {
    id: MessageId,
}

impl PendingHandle {
    pub fn message_id(&self) -> MessageId {
        self.id
    }
}

/// Explanations region of a rendered response that is being refreshed.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a refreshing region must be resolved"]
pub struct RegionHandle {
    id: MessageId,
}

impl RegionHandle {
    pub fn message_id(&self) -> MessageId {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionBinding {
    pub message: MessageId,
    pub button: ActionButton,
}

/// Action buttons currently wired to a handler. Each rendered button is
/// subscribed once; disposed ids never fire again.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    next_id: u64,
    bindings: BTreeMap<Subscription, ActionBinding>,
}

impl ActionRegistry {
    pub fn subscribe(&mut self, message: MessageId, button: ActionButton) -> Subscription {
        self.next_id += 1;
        let subscription = Subscription(self.next_id);
        self.bindings
            .insert(subscription, ActionBinding { message, button });
        subscription
    }

    pub fn dispose(&mut self, subscription: Subscription) -> bool {
        self.bindings.remove(&subscription).is_some()
    }

    pub fn get(&self, subscription: Subscription) -> Option<&ActionBinding> {
        self.bindings.get(&subscription)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
    actions: ActionRegistry,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pending()).count()
    }

    pub fn append_user_message<V>(&mut self, text: &str, view: &mut V) -> MessageId
    where
        V: TranscriptView + ?Sized,
    {
        let id = self.push(MessageBody::User {
            text: text.to_string(),
        });
        self.announce_last(view);
        id
    }

    pub fn append_pending_bot_message<V>(&mut self, label: &str, view: &mut V) -> PendingHandle
    where
        V: TranscriptView + ?Sized,
    {
        if self.pending_count() > 0 {
            warn!("Appending a placeholder while another is unresolved");
        }
        let id = self.push(MessageBody::Bot(BotState::Pending {
            label: label.to_string(),
        }));
        self.announce_last(view);
        PendingHandle { id }
    }

    /// Replace the placeholder's content in place.
    pub fn resolve<V>(&mut self, handle: PendingHandle, content: BotContent, view: &mut V)
    where
        V: TranscriptView + ?Sized,
    {
        let id = handle.id;
        let content = self.attach_actions(id, content);
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            warn!("Placeholder {} vanished before it was resolved", id);
            return;
        };
        debug!("Resolving message {}", id);
        message.body = MessageBody::Bot(BotState::Resolved { content });
        view.message_updated(message);
    }

    /// Put the explanations region of a rendered response into a loading
    /// state. Returns `None` if the message shows no correction.
    pub fn begin_region_refresh<V>(
        &mut self,
        id: MessageId,
        label: &str,
        view: &mut V,
    ) -> Option<RegionHandle>
    where
        V: TranscriptView + ?Sized,
    {
        let message = self.messages.iter_mut().find(|m| m.id == id)?;
        let MessageBody::Bot(BotState::Resolved {
            content: BotContent::Response { tree, .. },
        }) = &mut message.body
        else {
            return None;
        };
        tree.explanations.body = ExplanationBody::Loading(label.to_string());
        tree.explanations.translation = None;
        view.message_updated(message);
        Some(RegionHandle { id })
    }

    /// Finish a region refresh with a new result (which replaces the one bound
    /// to the message) or with a failure notice.
    pub fn resolve_region<V>(
        &mut self,
        handle: RegionHandle,
        outcome: Result<(CorrectionResult, String), String>,
        view: &mut V,
    ) where
        V: TranscriptView + ?Sized,
    {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == handle.id) else {
            warn!("Message {} vanished during explanation refresh", handle.id);
            return;
        };
        let MessageBody::Bot(BotState::Resolved {
            content: BotContent::Response { result, tree, .. },
        }) = &mut message.body
        else {
            warn!("Message {} no longer shows a correction", handle.id);
            return;
        };
        match outcome {
            Ok((fresh, language)) => {
                tree.explanations = projector::project_explanations(&fresh, &language);
                *result = fresh;
            }
            Err(notice) => {
                tree.explanations.body = ExplanationBody::Failed(notice);
                tree.explanations.translation = None;
            }
        }
        view.message_updated(message);
    }

    fn push(&mut self, body: MessageBody) -> MessageId {
        self.next_id += 1;
        let id = MessageId(self.next_id);
        self.messages.push(Message { id, body });
        id
    }

    fn announce_last<V>(&self, view: &mut V)
    where
        V: TranscriptView + ?Sized,
    {
        if let Some(message) = self.messages.last() {
            view.message_appended(message);
            view.scroll_to_bottom();
        }
    }

    fn attach_actions(&mut self, id: MessageId, content: BotContent) -> BotContent {
        match content {
            BotContent::Response {
                result,
                tree,
                subscriptions,
            } => {
                for stale in subscriptions {
                    self.actions.dispose(stale);
                }
                let subscriptions = tree
                    .actions
                    .iter()
                    .map(|button| self.actions.subscribe(id, button.clone()))
                    .collect();
                BotContent::Response {
                    result,
                    tree,
                    subscriptions,
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::Rewrites;

    #[derive(Default)]
    struct Recorder {
        appended: Vec<MessageId>,
        updated: Vec<MessageId>,
        scrolls: usize,
    }

    impl TranscriptView for Recorder {
        fn message_appended(&mut self, message: &Message) {
            self.appended.push(message.id);
        }

        fn message_updated(&mut self, message: &Message) {
            self.updated.push(message.id);
        }

        fn scroll_to_bottom(&mut self) {
            self.scrolls += 1;
        }
    }

    fn response_with_rewrites() -> BotContent {
        let mut result = CorrectionResult::unchanged("I want to apply.");
        result.rewrites = Some(Rewrites {
            formal: "I would like to apply.".to_string(),
            informal: "Wanna apply.".to_string(),
            polite: "May I apply?".to_string(),
        });
        let tree = projector::project(&result, "en");
        BotContent::Response {
            result,
            tree,
            subscriptions: Vec::new(),
        }
    }

    #[test]
    fn appends_scroll_to_newest() {
        let mut transcript = Transcript::new();
        let mut view = Recorder::default();
        let user = transcript.append_user_message("hello there", &mut view);
        let pending = transcript.append_pending_bot_message("Analyzing verb tenses...", &mut view);

        assert_eq!(view.appended, vec![user, pending.message_id()]);
        assert_eq!(view.scrolls, 2);
        assert_eq!(transcript.pending_count(), 1);
        transcript.resolve(pending, BotContent::Unrecognized, &mut view);
    }

    #[test]
    fn resolve_replaces_placeholder_in_place() {
        let mut transcript = Transcript::new();
        let mut view = Recorder::default();
        transcript.append_user_message("first message", &mut view);
        let pending = transcript.append_pending_bot_message("...", &mut view);
        let id = pending.message_id();
        transcript.append_user_message("typed meanwhile", &mut view);

        transcript.resolve(
            pending,
            BotContent::Error {
                message: "boom".to_string(),
            },
            &mut view,
        );

        assert_eq!(transcript.messages()[1].id, id);
        assert!(!transcript.messages()[1].is_pending());
        assert_eq!(transcript.pending_count(), 0);
        assert_eq!(view.updated, vec![id]);
    }

    #[test]
    fn resolving_a_response_subscribes_each_button_once() {
        let mut transcript = Transcript::new();
        let mut view = Recorder::default();
        let pending = transcript.append_pending_bot_message("...", &mut view);
        let id = pending.message_id();
        transcript.resolve(pending, response_with_rewrites(), &mut view);

        assert_eq!(transcript.actions().len(), 3);
        let message = transcript.get(id).unwrap();
        let MessageBody::Bot(BotState::Resolved {
            content: BotContent::Response { subscriptions, .. },
        }) = &message.body
        else {
            panic!("expected a response");
        };
        let binding = transcript.actions().get(subscriptions[0]).unwrap();
        assert_eq!(binding.message, id);
        assert_eq!(binding.button.text, "I would like to apply.");
    }

    #[test]
    fn region_refresh_swaps_explanations_only() {
        let mut transcript = Transcript::new();
        let mut view = Recorder::default();
        let pending = transcript.append_pending_bot_message("...", &mut view);
        let id = pending.message_id();
        transcript.resolve(pending, response_with_rewrites(), &mut view);
        let actions_before = transcript.get(id).unwrap().response().unwrap().1.actions.clone();

        let region = transcript
            .begin_region_refresh(id, "Translating explanations...", &mut view)
            .unwrap();
        let (_, tree) = transcript.get(id).unwrap().response().unwrap();
        assert!(matches!(tree.explanations.body, ExplanationBody::Loading(_)));
        assert_eq!(tree.explanations.language, "en");

        let mut fresh = CorrectionResult::unchanged("I want to apply.");
        fresh.translation = Some("Quiero postularme.".to_string());
        transcript.resolve_region(region, Ok((fresh.clone(), "es".to_string())), &mut view);

        let (result, tree) = transcript.get(id).unwrap().response().unwrap();
        assert_eq!(result, &fresh);
        assert_eq!(tree.explanations.language, "es");
        assert_eq!(tree.actions, actions_before);
        assert_eq!(transcript.actions().len(), 3);
    }

    #[test]
    fn failed_region_refresh_keeps_language() {
        let mut transcript = Transcript::new();
        let mut view = Recorder::default();
        let pending = transcript.append_pending_bot_message("...", &mut view);
        let id = pending.message_id();
        transcript.resolve(pending, response_with_rewrites(), &mut view);

        let region = transcript.begin_region_refresh(id, "...", &mut view).unwrap();
        transcript.resolve_region(region, Err("Sorry".to_string()), &mut view);

        let (_, tree) = transcript.get(id).unwrap().response().unwrap();
        assert_eq!(tree.explanations.language, "en");
        assert_eq!(tree.explanations.body, ExplanationBody::Failed("Sorry".to_string()));
    }

    #[test]
    fn region_refresh_needs_a_rendered_response() {
        let mut transcript = Transcript::new();
        let mut view = Recorder::default();
        let user = transcript.append_user_message("hello there", &mut view);
        assert!(transcript.begin_region_refresh(user, "...", &mut view).is_none());
    }

    #[test]
    fn disposed_subscription_is_gone() {
        let mut registry = ActionRegistry::default();
        let button = ActionButton {
            kind: projector::ActionKind::Formal,
            text: "x".to_string(),
        };
        let sub = registry.subscribe(MessageId(1), button);
        assert!(registry.dispose(sub));
        assert!(!registry.dispose(sub));
        assert!(registry.get(sub).is_none());
    }
}
