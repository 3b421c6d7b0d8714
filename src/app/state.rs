use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use super::controllers::debounce::{DebounceScheduler, Pulse};
use super::controllers::navigation::{NavigationGuard, NavigationOutcome};
use super::controllers::preview::{RenderPipeline, status_text};
use super::controllers::typing::TypingStateTracker;
use super::domain::document::{Document, DocumentRole};
use super::domain::messages::Message;
use super::domain::payload::{RenderResult, StatePayload};
use super::domain::settings::EngineSettings;
use super::infrastructure::change_bus::Subscription;
use super::infrastructure::clock::Clock;
use super::infrastructure::location::Location;
use super::infrastructure::scheduler::Scheduler;
use super::infrastructure::sink::PresentationSink;
use super::services::hash_codec::HashCodec;

/// The synchronization and persistence engine.
///
/// Owns both documents and every timer. All work happens on the caller's
/// thread: hosts post [`Message`]s (or call [`SyncEngine::edit`] /
/// [`SyncEngine::navigated`]) and call [`SyncEngine::tick`] whenever
/// [`SyncEngine::next_deadline`] passes.
pub struct SyncEngine<L: Location, S: PresentationSink> {
    data: Document,
    template: Document,
    sender: Sender<Message>,
    receiver: Receiver<Message>,
    _subscriptions: Vec<Subscription>,
    scheduler: Scheduler<Pulse>,
    debounce: DebounceScheduler,
    typing: TypingStateTracker,
    guard: NavigationGuard,
    codec: HashCodec,
    pipeline: RenderPipeline,
    location: L,
    sink: S,
    clock: Box<dyn Clock>,
    last_render: Option<RenderResult>,
}

impl<L: Location, S: PresentationSink> SyncEngine<L, S> {
    /// Seed the documents from the location fragment, or from the configured
    /// defaults when it does not decode, and arm the first render and persist.
    pub fn new(settings: &EngineSettings, location: L, sink: S, clock: Box<dyn Clock>) -> Self {
        let codec = HashCodec::new();
        let seed = match codec.decode(&location.fragment()) {
            Ok(payload) => {
                log::debug!("seeded documents from location fragment");
                payload
            }
            Err(e) => {
                log::debug!("using default documents: {}", e);
                StatePayload::new(
                    settings.default_data.clone(),
                    settings.default_template.clone(),
                )
            }
        };

        let data = Document::new(DocumentRole::Primary, seed.data_text);
        let template = Document::new(DocumentRole::Secondary, seed.template_text);
        let (sender, receiver) = mpsc::channel();

        let _subscriptions = [&data, &template]
            .into_iter()
            .map(|doc| {
                let tx = sender.clone();
                doc.subscribe(move |update| {
                    let _ = tx.send(Message::ContentChanged {
                        role: update.role,
                        revision: update.revision,
                    });
                })
            })
            .collect();

        let mut engine = Self {
            data,
            template,
            sender,
            receiver,
            _subscriptions,
            scheduler: Scheduler::new(),
            debounce: DebounceScheduler::new(
                settings.render_debounce(),
                settings.persist_debounce(),
            ),
            typing: TypingStateTracker::new(settings.typing_idle()),
            guard: NavigationGuard::new(),
            codec,
            pipeline: RenderPipeline::new(settings.pretty_indent),
            location,
            sink,
            clock,
            last_render: None,
        };
        engine.pump();
        engine
    }

    /// A handle for posting messages from widgets or other event sources.
    pub fn sender(&self) -> Sender<Message> {
        self.sender.clone()
    }

    /// Report that the editing widget for `role` now holds `text`.
    pub fn edit(&mut self, role: DocumentRole, text: impl Into<String>) {
        let _ = self.sender.send(Message::LocalEdit {
            role,
            text: text.into(),
        });
        self.pump();
    }

    /// Report an out-of-band change of the location.
    pub fn navigated(&mut self) -> NavigationOutcome {
        self.pump();
        let outcome = self.handle_navigation();
        self.pump();
        outcome
    }

    /// Drain the mailbox.
    ///
    /// Within one batch only the newest local edit per document is applied;
    /// older ones describe text the widget has already moved past.
    pub fn pump(&mut self) {
        loop {
            let batch: Vec<Message> = self.receiver.try_iter().collect();
            if batch.is_empty() {
                break;
            }

            for (i, message) in batch.iter().enumerate() {
                if let Message::LocalEdit { role, .. } = message {
                    let superseded = batch[i + 1..]
                        .iter()
                        .any(|m| matches!(m, Message::LocalEdit { role: r, .. } if r == role));
                    if superseded {
                        continue;
                    }
                }
                self.handle(message.clone());
            }
        }
    }

    /// Fire every pulse that is due. Returns how many fired.
    pub fn tick(&mut self) -> usize {
        self.pump();
        let now = self.clock.now();
        let due = self.scheduler.take_due(now);
        for pulse in &due {
            match pulse {
                Pulse::Render => self.render_pulse(),
                Pulse::Persist => self.persist_pulse(),
                Pulse::TypingIdle => self.typing.settle(),
            }
        }
        self.pump();
        due.len()
    }

    /// Time remaining until the next pulse, if one is armed.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler
            .next_deadline()
            .map(|due| due.saturating_sub(self.clock.now()))
    }

    pub fn document(&self, role: DocumentRole) -> &Document {
        match role {
            DocumentRole::Primary => &self.data,
            DocumentRole::Secondary => &self.template,
        }
    }

    pub fn payload(&self) -> StatePayload {
        StatePayload::new(self.data.content(), self.template.content())
    }

    pub fn is_typing(&self) -> bool {
        self.typing.is_typing()
    }

    pub fn is_pending(&self, pulse: Pulse) -> bool {
        self.scheduler.is_pending(pulse)
    }

    pub fn last_render(&self) -> Option<&RenderResult> {
        self.last_render.as_ref()
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn document_mut(&mut self, role: DocumentRole) -> &mut Document {
        match role {
            DocumentRole::Primary => &mut self.data,
            DocumentRole::Secondary => &mut self.template,
        }
    }

    fn handle(&mut self, message: Message) {
        match message {
            Message::ContentChanged { role, revision } => {
                let now = self.clock.now();
                self.debounce.note_change(&mut self.scheduler, now);
                // Revision 0 is the subscription replay of seeded content.
                if revision > 0 {
                    self.typing.note_change(&mut self.scheduler, now);
                }
                log::debug!("{} changed (revision {})", role.label(), revision);
            }
            Message::LocalEdit { role, text } => {
                let doc = self.document_mut(role);
                if !doc.content_eq(&text) {
                    doc.set_content(text);
                }
            }
            Message::Navigated => {
                self.handle_navigation();
            }
        }
    }

    fn handle_navigation(&mut self) -> NavigationOutcome {
        let fragment = self.location.fragment();
        let outcome = self.guard.apply(
            &self.typing,
            &self.codec,
            &fragment,
            &mut self.data,
            &mut self.template,
        );
        match &outcome {
            NavigationOutcome::Suppressed => log::debug!("navigation ignored while typing"),
            NavigationOutcome::Rejected(e) => log::debug!("navigation fragment ignored: {}", e),
            NavigationOutcome::Applied {
                data_changed,
                template_changed,
            } => log::debug!(
                "navigation applied (data changed: {}, template changed: {})",
                data_changed,
                template_changed
            ),
        }
        outcome
    }

    fn render_pulse(&mut self) {
        let result = self
            .pipeline
            .render(&self.data.content(), &self.template.content());
        match &result {
            RenderResult::Ok(output) => self.sink.show_output(output),
            RenderResult::Err(_) => self.sink.show_diagnostics(&result.display_text()),
        }
        log::debug!("render pulse (ok: {})", result.is_ok());
        self.last_render = Some(result);
        self.refresh_status();
    }

    fn persist_pulse(&mut self) {
        match self.codec.encode(&self.payload()) {
            Ok(fragment) => {
                if fragment != self.location.fragment() {
                    self.location.set_fragment(&fragment);
                    log::info!("persisted state ({} chars)", fragment.len());
                }
            }
            Err(e) => log::warn!("could not persist state: {}", e),
        }
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        let status = status_text(&self.location.href());
        self.sink.show_status(&status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::infrastructure::clock::ManualClock;
    use crate::app::infrastructure::location::MemoryLocation;
    use crate::app::infrastructure::sink::{RecordingSink, Shown};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn engine_with(fragment: &str) -> (SyncEngine<MemoryLocation, RecordingSink>, ManualClock) {
        let clock = ManualClock::new();
        let engine = SyncEngine::new(
            &EngineSettings::default(),
            MemoryLocation::with_fragment("http://localhost/", fragment),
            RecordingSink::new(),
            Box::new(clock.clone()),
        );
        (engine, clock)
    }

    #[test]
    fn test_bootstrap_renders_defaults_without_typing() {
        let (mut engine, clock) = engine_with("");
        assert!(!engine.is_typing());
        assert!(engine.is_pending(Pulse::Render));

        clock.advance(ms(250));
        assert_eq!(engine.tick(), 2);
        assert_eq!(engine.sink().shown, Shown::Output("world".to_string()));
        assert!(!engine.location().fragment().is_empty());
    }

    #[test]
    fn test_seeds_from_fragment() {
        let fragment = HashCodec::new()
            .encode(&StatePayload::new(r#"{"a":"b"}"#, "{{a}}!"))
            .unwrap();
        let (engine, _clock) = engine_with(&fragment);
        assert_eq!(engine.document(DocumentRole::Primary).content(), r#"{"a":"b"}"#);
        assert_eq!(engine.document(DocumentRole::Secondary).content(), "{{a}}!");
        assert_eq!(engine.document(DocumentRole::Primary).revision(), 0);
    }

    #[test]
    fn test_identical_local_edit_does_not_bump_revision() {
        let (mut engine, _clock) = engine_with("");
        engine.edit(DocumentRole::Secondary, "{{hello}}");
        assert_eq!(engine.document(DocumentRole::Secondary).revision(), 0);
        assert!(!engine.is_typing());
    }

    #[test]
    fn test_superseded_local_edits_are_skipped() {
        let (mut engine, _clock) = engine_with("");
        let tx = engine.sender();
        for text in ["{", "{{", "{{h"] {
            tx.send(Message::LocalEdit {
                role: DocumentRole::Secondary,
                text: text.to_string(),
            })
            .unwrap();
        }
        engine.pump();
        let doc = engine.document(DocumentRole::Secondary);
        assert_eq!(doc.content(), "{{h");
        assert_eq!(doc.revision(), 1);
    }

    #[test]
    fn test_status_reports_location_length() {
        let (mut engine, clock) = engine_with("");
        clock.advance(ms(250));
        engine.tick();
        let expected = format!("{} out of 2000", engine.location().href().chars().count());
        assert_eq!(engine.sink().status, expected);
    }
}
