// Chat session: the conversation state machine
//
// Owns the turn controller, history and transcript. `handle` runs on the one
// thread that owns the session and never blocks; remote calls and the
// unrecognized-input delay come back out as effects for the runtime to run,
// and their completions come back in as events.

use crate::constants::{LOADER_ANALYZING, LOADER_TRANSLATING, UNRECOGNIZED_DELAY_MS};
use crate::correction::{ClientError, CorrectionRequest, CorrectionResult};
use crate::errors::AppError;
use crate::filter::{classify, Sensibility};
use crate::history::{HistoryEntry, HistoryStore};
use crate::language::Language;
use crate::projector::{self, TRANSLATION_FAILED_MESSAGE, TURN_FAILED_MESSAGE};
use crate::transcript::{
    BotContent, MessageId, PendingHandle, RegionHandle, Subscription, Transcript, TranscriptView,
};
use crate::turn::{SubmissionSurface, TurnController, TurnTicket};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Everything the session needs from a concrete UI.
pub trait ChatSurface: SubmissionSurface + TranscriptView {
    fn history_changed(&mut self, entries: &[HistoryEntry]);
    /// A per-response language selector must snap back to `language`.
    fn language_control_reverted(&mut self, message: MessageId, language: &str);
}

/// Where a settled correction lands.
#[derive(Debug)]
pub enum FlightTarget {
    /// A new turn's placeholder.
    Turn(PendingHandle),
    /// The explanations region of an existing response.
    Region(RegionHandle),
}

/// An outstanding remote call. Carries the turn ticket so the turn can only
/// end when the call settles.
#[derive(Debug)]
pub struct InFlight {
    ticket: TurnTicket,
    target: FlightTarget,
    language: String,
}

impl InFlight {
    pub fn target(&self) -> &FlightTarget {
        &self.target
    }
}

/// A filtered turn waiting out the fixed delay before showing the notice.
#[derive(Debug)]
pub struct DelayedTurn {
    ticket: TurnTicket,
    handle: PendingHandle,
}

#[derive(Debug)]
pub enum Effect {
    Fetch {
        request: CorrectionRequest,
        flight: InFlight,
    },
    Delay {
        duration: Duration,
        turn: DelayedTurn,
    },
}

#[derive(Debug)]
pub enum Event {
    Submit(String),
    PickHistory(usize),
    ClearHistory { confirmed: bool },
    SelectDefaultLanguage(String),
    ChangeExplanationLanguage { message: MessageId, language: String },
    TriggerAction(Subscription),
    CorrectionSettled {
        flight: InFlight,
        outcome: Result<CorrectionResult, ClientError>,
    },
    DelayElapsed(DelayedTurn),
}

pub struct ChatSession {
    turns: TurnController,
    history: HistoryStore,
    transcript: Transcript,
    default_language: String,
}

impl ChatSession {
    pub fn new(history: HistoryStore, default_language: &str) -> Self {
        let default_language = Language::from_code(default_language)
            .unwrap_or(Language::English)
            .code()
            .to_string();
        Self {
            turns: TurnController::new(),
            history,
            transcript: Transcript::new(),
            default_language,
        }
    }

    pub fn turns(&self) -> &TurnController {
        &self.turns
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Initial paint: history panel and a ready input.
    pub fn start(&mut self, surface: &mut dyn ChatSurface) {
        surface.history_changed(self.history.entries());
        surface.set_submission_enabled(true);
        surface.focus_input();
    }

    pub fn handle(&mut self, event: Event, surface: &mut dyn ChatSurface) -> Option<Effect> {
        match event {
            Event::Submit(text) => self.submit(&text, surface),
            Event::PickHistory(index) => {
                let query = self.history.get(index).map(|e| e.query.clone());
                match query {
                    Some(query) => self.submit(&query, surface),
                    None => {
                        warn!("No history entry at index {}", index);
                        None
                    }
                }
            }
            Event::ClearHistory { confirmed } => {
                self.clear_history(confirmed, surface);
                None
            }
            Event::SelectDefaultLanguage(code) => {
                match Language::from_code(&code) {
                    Some(lang) => {
                        info!("Default explanation language set to {}", lang.code());
                        self.default_language = lang.code().to_string();
                    }
                    None => warn!("Ignoring unknown language code '{}'", code),
                }
                None
            }
            Event::ChangeExplanationLanguage { message, language } => {
                self.change_explanation_language(message, &language, surface)
            }
            Event::TriggerAction(subscription) => {
                self.trigger_action(subscription, surface);
                None
            }
            Event::CorrectionSettled { flight, outcome } => {
                self.settle(flight, outcome, surface);
                None
            }
            Event::DelayElapsed(turn) => {
                self.transcript
                    .resolve(turn.handle, BotContent::Unrecognized, surface);
                self.turns.end_turn(turn.ticket, surface);
                None
            }
        }
    }

    fn submit(&mut self, text: &str, surface: &mut dyn ChatSurface) -> Option<Effect> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let ticket = match self.turns.begin_turn(surface) {
            Ok(ticket) => ticket,
            Err(_) => return None,
        };

        self.transcript.append_user_message(text, surface);
        match self.history.record(text) {
            Ok(entries) => surface.history_changed(entries),
            Err(e) => {
                warn!("Failed to persist history: {}", e);
                surface.history_changed(self.history.entries());
            }
        }
        let handle = self
            .transcript
            .append_pending_bot_message(LOADER_ANALYZING, surface);

        if let Sensibility::Nonsensical(rule) = classify(text) {
            info!("Turn {}: {} ({:?})", ticket.id(), AppError::FilteredInput, rule);
            return Some(Effect::Delay {
                duration: Duration::from_millis(UNRECOGNIZED_DELAY_MS),
                turn: DelayedTurn { ticket, handle },
            });
        }

        info!(
            "Turn {} requesting correction (language={})",
            ticket.id(),
            self.default_language
        );
        Some(Effect::Fetch {
            request: CorrectionRequest::new(text, self.default_language.clone()),
            flight: InFlight {
                ticket,
                target: FlightTarget::Turn(handle),
                language: self.default_language.clone(),
            },
        })
    }

    fn change_explanation_language(
        &mut self,
        message: MessageId,
        language: &str,
        surface: &mut dyn ChatSurface,
    ) -> Option<Effect> {
        let Some((result, tree)) = self.transcript.get(message).and_then(|m| m.response()) else {
            warn!("Message {} has no explanations to translate", message);
            return None;
        };
        let shown = tree.explanations.language.clone();
        let original = result.original.clone();

        if self.turns.is_busy() {
            debug!("Language change on message {} rejected while busy", message);
            surface.language_control_reverted(message, &shown);
            return None;
        }
        let Some(lang) = Language::from_code(language) else {
            warn!("Ignoring unknown language code '{}'", language);
            surface.language_control_reverted(message, &shown);
            return None;
        };
        if lang.code() == shown {
            return None;
        }

        let ticket = self.turns.begin_turn(surface).ok()?;
        let Some(region) =
            self.transcript
                .begin_region_refresh(message, LOADER_TRANSLATING, surface)
        else {
            self.turns.end_turn(ticket, surface);
            return None;
        };

        info!(
            "Turn {} re-explaining message {} in {}",
            ticket.id(),
            message,
            lang.code()
        );
        Some(Effect::Fetch {
            request: CorrectionRequest::new(original, lang.code()),
            flight: InFlight {
                ticket,
                target: FlightTarget::Region(region),
                language: lang.code().to_string(),
            },
        })
    }

    fn trigger_action(&mut self, subscription: Subscription, surface: &mut dyn ChatSurface) {
        let Some(binding) = self.transcript.actions().get(subscription).cloned() else {
            warn!("Action {} is not attached to any message", subscription);
            return;
        };
        let Ok(ticket) = self.turns.begin_turn(surface) else {
            return;
        };

        self.transcript
            .append_user_message(&binding.button.turn_label(), surface);
        let handle = self
            .transcript
            .append_pending_bot_message(LOADER_ANALYZING, surface);
        self.transcript.resolve(
            handle,
            BotContent::Text {
                text: binding.button.text,
            },
            surface,
        );
        self.turns.end_turn(ticket, surface);
    }

    fn settle(
        &mut self,
        flight: InFlight,
        outcome: Result<CorrectionResult, ClientError>,
        surface: &mut dyn ChatSurface,
    ) {
        let InFlight {
            ticket,
            target,
            language,
        } = flight;

        match target {
            FlightTarget::Turn(handle) => {
                let content = match outcome {
                    Ok(result) => {
                        info!("Turn {} corrected ({} issues)", ticket.id(), result.errors.len());
                        let tree = projector::project(&result, &language);
                        BotContent::Response {
                            result,
                            tree,
                            subscriptions: Vec::new(),
                        }
                    }
                    Err(e) => {
                        let err = AppError::from(e);
                        error!("Turn {} failed: {}", ticket.id(), err);
                        BotContent::Error {
                            message: err
                                .user_message()
                                .unwrap_or(TURN_FAILED_MESSAGE)
                                .to_string(),
                        }
                    }
                };
                self.transcript.resolve(handle, content, surface);
            }
            FlightTarget::Region(region) => {
                let outcome = match outcome {
                    Ok(result) => Ok((result, language)),
                    Err(e) => {
                        error!("Turn {} translation failed: {}", ticket.id(), AppError::from(e));
                        Err(TRANSLATION_FAILED_MESSAGE.to_string())
                    }
                };
                self.transcript.resolve_region(region, outcome, surface);
            }
        }

        self.turns.end_turn(ticket, surface);
    }

    fn clear_history(&mut self, confirmed: bool, surface: &mut dyn ChatSurface) {
        match self.history.clear(confirmed) {
            Ok(true) => {
                info!("History cleared");
                surface.history_changed(self.history.entries());
            }
            Ok(false) => debug!("History clear not confirmed"),
            Err(e) => {
                warn!("Failed to remove persisted history: {}", e);
                surface.history_changed(self.history.entries());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::{GrammarIssue, Rewrites};
    use crate::projector::{DiffView, ExplanationBody};
    use crate::storage::MemoryStore;
    use crate::transcript::{BotState, Message, MessageBody};

    #[derive(Default)]
    struct FakeSurface {
        enabled: Vec<bool>,
        focus: usize,
        appended: Vec<Message>,
        updated: Vec<Message>,
        history: Vec<Vec<HistoryEntry>>,
        reverted: Vec<(MessageId, String)>,
    }

    impl FakeSurface {
        fn enables(&self) -> usize {
            self.enabled.iter().filter(|e| **e).count()
        }
    }

    impl SubmissionSurface for FakeSurface {
        fn set_submission_enabled(&mut self, enabled: bool) {
            self.enabled.push(enabled);
        }

        fn focus_input(&mut self) {
            self.focus += 1;
        }
    }

    impl TranscriptView for FakeSurface {
        fn message_appended(&mut self, message: &Message) {
            self.appended.push(message.clone());
        }

        fn message_updated(&mut self, message: &Message) {
            self.updated.push(message.clone());
        }

        fn scroll_to_bottom(&mut self) {}
    }

    impl ChatSurface for FakeSurface {
        fn history_changed(&mut self, entries: &[HistoryEntry]) {
            self.history.push(entries.to_vec());
        }

        fn language_control_reverted(&mut self, message: MessageId, language: &str) {
            self.reverted.push((message, language.to_string()));
        }
    }

    fn session() -> ChatSession {
        ChatSession::new(HistoryStore::load(Box::new(MemoryStore::new())), "en")
    }

    fn apple_result() -> CorrectionResult {
        CorrectionResult {
            original: "I has a apple".to_string(),
            corrected: "I have an apple".to_string(),
            errors: vec![GrammarIssue {
                wrong: "has".to_string(),
                correct: "have".to_string(),
                explanation: "...".to_string(),
                tense_explanation: None,
            }],
            rewrites: Some(Rewrites {
                formal: "I would like to apply.".to_string(),
                informal: String::new(),
                polite: String::new(),
            }),
            prediction: None,
            translation: Some("I have an apple".to_string()),
        }
    }

    fn expect_fetch(effect: Option<Effect>) -> (CorrectionRequest, InFlight) {
        match effect {
            Some(Effect::Fetch { request, flight }) => (request, flight),
            other => panic!("expected a fetch, got {:?}", other),
        }
    }

    fn expect_delay(effect: Option<Effect>) -> (Duration, DelayedTurn) {
        match effect {
            Some(Effect::Delay { duration, turn }) => (duration, turn),
            other => panic!("expected a delay, got {:?}", other),
        }
    }

    fn last_bot_content(session: &ChatSession) -> BotContent {
        let message = session.transcript().messages().last().unwrap();
        match &message.body {
            MessageBody::Bot(BotState::Resolved { content }) => content.clone(),
            other => panic!("expected resolved bot message, got {:?}", other),
        }
    }

    /// Submit the apple sentence and settle it successfully.
    fn rendered_apple(session: &mut ChatSession, surface: &mut FakeSurface) -> MessageId {
        let (_, flight) =
            expect_fetch(session.handle(Event::Submit("I has a apple".into()), surface));
        let message = match flight.target() {
            FlightTarget::Turn(handle) => handle.message_id(),
            FlightTarget::Region(_) => panic!("expected a turn"),
        };
        session.handle(
            Event::CorrectionSettled {
                flight,
                outcome: Ok(apple_result()),
            },
            surface,
        );
        message
    }

    #[test]
    fn start_paints_history_and_enables_input() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        session.start(&mut surface);
        assert_eq!(surface.history, vec![Vec::new()]);
        assert_eq!(surface.enabled, vec![true]);
        assert_eq!(surface.focus, 1);
    }

    #[test]
    fn successful_turn_records_fetches_and_renders() {
        let mut session = session();
        let mut surface = FakeSurface::default();

        let effect = session.handle(Event::Submit("  I has a apple ".into()), &mut surface);
        assert!(session.turns().is_busy());
        assert_eq!(surface.enabled, vec![false]);
        assert_eq!(session.history().entries()[0].query, "I has a apple");

        let (request, flight) = expect_fetch(effect);
        assert_eq!(request, CorrectionRequest::new("I has a apple", "en"));
        assert_eq!(session.transcript().pending_count(), 1);

        session.handle(
            Event::CorrectionSettled {
                flight,
                outcome: Ok(apple_result()),
            },
            &mut surface,
        );

        assert!(!session.turns().is_busy());
        assert_eq!(surface.enables(), 1);
        assert_eq!(session.transcript().pending_count(), 0);
        let BotContent::Response { tree, subscriptions, .. } = last_bot_content(&session) else {
            panic!("expected a response");
        };
        assert!(matches!(tree.diff, DiffView::Changed { .. }));
        let ExplanationBody::Cards(cards) = &tree.explanations.body else {
            panic!("expected cards");
        };
        assert_eq!(cards.len(), 1);
        assert_eq!(subscriptions.len(), 1);
    }

    #[test]
    fn repeated_characters_show_unrecognized_after_delay() {
        let mut session = session();
        let mut surface = FakeSurface::default();

        let (duration, turn) =
            expect_delay(session.handle(Event::Submit("aaaa".into()), &mut surface));
        assert_eq!(duration, Duration::from_millis(800));
        assert!(session.turns().is_busy());
        assert_eq!(session.history().entries()[0].query, "aaaa");

        session.handle(Event::DelayElapsed(turn), &mut surface);
        assert_eq!(last_bot_content(&session), BotContent::Unrecognized);
        assert!(!session.turns().is_busy());
        assert_eq!(surface.enables(), 1);
    }

    #[test]
    fn vowelless_input_is_filtered() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        let (_, turn) = expect_delay(session.handle(Event::Submit("xyzxyz".into()), &mut surface));
        session.handle(Event::DelayElapsed(turn), &mut surface);
        assert_eq!(last_bot_content(&session), BotContent::Unrecognized);
    }

    #[test]
    fn server_error_shows_generic_message_and_keeps_history() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        let (_, flight) = expect_fetch(session.handle(Event::Submit("I has a apple".into()), &mut surface));

        session.handle(
            Event::CorrectionSettled {
                flight,
                outcome: Err(ClientError::Status(500)),
            },
            &mut surface,
        );

        assert_eq!(
            last_bot_content(&session),
            BotContent::Error {
                message: TURN_FAILED_MESSAGE.to_string()
            }
        );
        assert!(!session.turns().is_busy());
        assert_eq!(session.history().entries()[0].query, "I has a apple");
    }

    #[test]
    fn malformed_response_looks_like_transport_error() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        let (_, flight) = expect_fetch(session.handle(Event::Submit("Hello there".into()), &mut surface));
        session.handle(
            Event::CorrectionSettled {
                flight,
                outcome: Err(ClientError::MalformedResponse("no corrected".into())),
            },
            &mut surface,
        );
        assert_eq!(
            last_bot_content(&session),
            BotContent::Error {
                message: TURN_FAILED_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn submit_while_busy_is_a_silent_no_op() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        let (_, flight) = expect_fetch(session.handle(Event::Submit("I has a apple".into()), &mut surface));
        let messages_before = session.transcript().messages().len();

        assert!(session
            .handle(Event::Submit("Another sentence here".into()), &mut surface)
            .is_none());
        assert_eq!(session.transcript().messages().len(), messages_before);
        assert_eq!(session.history().len(), 1);

        session.handle(
            Event::CorrectionSettled {
                flight,
                outcome: Ok(apple_result()),
            },
            &mut surface,
        );
        assert!(matches!(last_bot_content(&session), BotContent::Response { .. }));
        assert_eq!(session.turns().completed_turns(), 1);
    }

    #[test]
    fn blank_submission_does_not_start_a_turn() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        assert!(session.handle(Event::Submit("   ".into()), &mut surface).is_none());
        assert!(surface.enabled.is_empty());
        assert!(session.transcript().messages().is_empty());
    }

    #[test]
    fn turn_ends_once_on_every_exit_path() {
        let mut session = session();
        let mut surface = FakeSurface::default();

        rendered_apple(&mut session, &mut surface);

        let (_, flight) = expect_fetch(session.handle(Event::Submit("Hello there".into()), &mut surface));
        session.handle(
            Event::CorrectionSettled {
                flight,
                outcome: Err(ClientError::Transport("refused".into())),
            },
            &mut surface,
        );

        let (_, turn) = expect_delay(session.handle(Event::Submit("!!".into()), &mut surface));
        session.handle(Event::DelayElapsed(turn), &mut surface);

        assert_eq!(session.turns().completed_turns(), 3);
        assert_eq!(surface.enables(), 3);
        assert_eq!(surface.focus, 3);
    }

    #[test]
    fn rewrite_selection_echoes_without_remote_call() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        rendered_apple(&mut session, &mut surface);
        let BotContent::Response { subscriptions, .. } = last_bot_content(&session) else {
            panic!("expected a response");
        };

        let effect = session.handle(Event::TriggerAction(subscriptions[0]), &mut surface);
        assert!(effect.is_none());

        let messages = session.transcript().messages();
        let user = &messages[messages.len() - 2];
        assert_eq!(
            user.body,
            MessageBody::User {
                text: "Rewrite: Formal".to_string()
            }
        );
        assert_eq!(
            last_bot_content(&session),
            BotContent::Text {
                text: "I would like to apply.".to_string()
            }
        );
        assert!(!session.turns().is_busy());
        assert_eq!(session.transcript().pending_count(), 0);
    }

    #[test]
    fn rewrite_selection_while_busy_is_ignored() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        rendered_apple(&mut session, &mut surface);
        let BotContent::Response { subscriptions, .. } = last_bot_content(&session) else {
            panic!("expected a response");
        };
        let (_, _flight) = expect_fetch(session.handle(Event::Submit("Hello there".into()), &mut surface));
        let before = session.transcript().messages().len();

        session.handle(Event::TriggerAction(subscriptions[0]), &mut surface);
        assert_eq!(session.transcript().messages().len(), before);
    }

    #[test]
    fn language_change_refetches_original_and_swaps_region() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        let message = rendered_apple(&mut session, &mut surface);

        let (request, flight) = expect_fetch(session.handle(
            Event::ChangeExplanationLanguage {
                message,
                language: "es".into(),
            },
            &mut surface,
        ));
        assert_eq!(request, CorrectionRequest::new("I has a apple", "es"));
        assert!(session.turns().is_busy());
        let (_, tree) = session.transcript().get(message).unwrap().response().unwrap();
        assert!(matches!(tree.explanations.body, ExplanationBody::Loading(_)));

        let mut spanish = apple_result();
        spanish.translation = Some("Tengo una manzana".to_string());
        session.handle(
            Event::CorrectionSettled {
                flight,
                outcome: Ok(spanish.clone()),
            },
            &mut surface,
        );

        let (result, tree) = session.transcript().get(message).unwrap().response().unwrap();
        assert_eq!(result, &spanish);
        assert_eq!(tree.explanations.language, "es");
        assert_eq!(
            tree.explanations.translation.as_ref().unwrap().label,
            "Full Meaning in Spanish"
        );
        assert!(!session.turns().is_busy());
        // Action buttons keep their original single subscription.
        assert_eq!(session.transcript().actions().len(), 1);
    }

    #[test]
    fn language_change_while_busy_reverts_selector() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        let message = rendered_apple(&mut session, &mut surface);
        let (_, _flight) = expect_fetch(session.handle(Event::Submit("Hello there".into()), &mut surface));

        let effect = session.handle(
            Event::ChangeExplanationLanguage {
                message,
                language: "fr".into(),
            },
            &mut surface,
        );
        assert!(effect.is_none());
        assert_eq!(surface.reverted, vec![(message, "en".to_string())]);
        let (_, tree) = session.transcript().get(message).unwrap().response().unwrap();
        assert_eq!(tree.explanations.language, "en");
    }

    #[test]
    fn unknown_explanation_language_reverts_selector() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        let message = rendered_apple(&mut session, &mut surface);

        let effect = session.handle(
            Event::ChangeExplanationLanguage {
                message,
                language: "xx".into(),
            },
            &mut surface,
        );
        assert!(effect.is_none());
        assert_eq!(surface.reverted, vec![(message, "en".to_string())]);
        assert!(!session.turns().is_busy());
        let (_, tree) = session.transcript().get(message).unwrap().response().unwrap();
        assert_eq!(tree.explanations.language, "en");
    }

    #[test]
    fn failed_language_change_shows_notice_in_region() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        let message = rendered_apple(&mut session, &mut surface);
        let (_, flight) = expect_fetch(session.handle(
            Event::ChangeExplanationLanguage {
                message,
                language: "de".into(),
            },
            &mut surface,
        ));
        session.handle(
            Event::CorrectionSettled {
                flight,
                outcome: Err(ClientError::Status(502)),
            },
            &mut surface,
        );

        let (_, tree) = session.transcript().get(message).unwrap().response().unwrap();
        assert_eq!(
            tree.explanations.body,
            ExplanationBody::Failed(TRANSLATION_FAILED_MESSAGE.to_string())
        );
        assert_eq!(tree.explanations.language, "en");
        assert!(!session.turns().is_busy());
    }

    #[test]
    fn default_language_is_used_for_new_turns() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        session.handle(Event::SelectDefaultLanguage("bn".into()), &mut surface);
        session.handle(Event::SelectDefaultLanguage("klingon".into()), &mut surface);
        let (request, _flight) =
            expect_fetch(session.handle(Event::Submit("Hello there".into()), &mut surface));
        assert_eq!(request.language, "bn");
    }

    #[test]
    fn picking_history_resubmits_and_moves_to_front() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        rendered_apple(&mut session, &mut surface);
        let (_, flight) = expect_fetch(session.handle(Event::Submit("Hello there".into()), &mut surface));
        session.handle(
            Event::CorrectionSettled {
                flight,
                outcome: Ok(CorrectionResult::unchanged("Hello there")),
            },
            &mut surface,
        );

        let (request, _flight) = expect_fetch(session.handle(Event::PickHistory(1), &mut surface));
        assert_eq!(request.text, "I has a apple");
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().entries()[0].query, "I has a apple");
    }

    #[test]
    fn clearing_history_needs_confirmation() {
        let mut session = session();
        let mut surface = FakeSurface::default();
        rendered_apple(&mut session, &mut surface);
        let renders = surface.history.len();

        session.handle(Event::ClearHistory { confirmed: false }, &mut surface);
        assert_eq!(session.history().len(), 1);
        assert_eq!(surface.history.len(), renders);

        session.handle(Event::ClearHistory { confirmed: true }, &mut surface);
        assert!(session.history().is_empty());
        assert_eq!(surface.history.last(), Some(&Vec::new()));
    }
}
