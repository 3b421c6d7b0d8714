use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use stache_pad::app::controllers::binding::EditorBinding;
use stache_pad::app::infrastructure::clock::ManualClock;
use stache_pad::app::infrastructure::editor::{BufferEditor, TextEditorWidget};
use stache_pad::app::infrastructure::location::{Location, MemoryLocation};
use stache_pad::app::infrastructure::sink::{RecordingSink, Shown};
use stache_pad::app::{
    DocumentRole, EngineSettings, HashCodec, NavigationOutcome, Pulse, RenderResult, StatePayload,
    SyncEngine,
};

type Engine = SyncEngine<MemoryLocation, RecordingSink>;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn start() -> (Engine, ManualClock) {
    let clock = ManualClock::new();
    let engine = SyncEngine::new(
        &EngineSettings::default(),
        MemoryLocation::new("http://localhost/"),
        RecordingSink::new(),
        Box::new(clock.clone()),
    );
    (engine, clock)
}

/// Advance virtual time in small steps, firing pulses as they come due.
fn run_for(engine: &mut Engine, clock: &ManualClock, total: Duration) {
    let step = ms(10);
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        clock.advance(step);
        elapsed += step;
        engine.tick();
    }
}

fn settle(engine: &mut Engine, clock: &ManualClock) {
    run_for(engine, clock, ms(1100));
    assert!(!engine.is_typing());
}

#[test]
fn render_reflects_content_at_fire_time() {
    let (mut engine, clock) = start();
    settle(&mut engine, &clock);
    let renders_before = engine.sink().presentations;

    for (i, name) in ["a", "ab", "abc", "abcd"].iter().enumerate() {
        engine.edit(DocumentRole::Primary, format!(r#"{{"hello":"{name}"}}"#));
        if i == 1 {
            engine.edit(DocumentRole::Secondary, "<{{hello}}>");
        }
        run_for(&mut engine, &clock, ms(100));
    }
    assert_eq!(engine.sink().presentations, renders_before);

    run_for(&mut engine, &clock, ms(250));
    assert_eq!(engine.sink().presentations, renders_before + 1);
    assert_eq!(engine.sink().shown, Shown::Output("<abcd>".to_string()));
}

#[test]
fn persist_writes_fragment_that_decodes_to_documents() {
    let (mut engine, clock) = start();
    engine.edit(DocumentRole::Primary, r#"{"name":"Zoë"}"#);
    engine.edit(DocumentRole::Secondary, "Hi {{name}}");
    run_for(&mut engine, &clock, ms(300));

    let payload = HashCodec::new()
        .decode(&engine.location().fragment())
        .unwrap();
    assert_eq!(payload, StatePayload::new(r#"{"name":"Zoë"}"#, "Hi {{name}}"));
    assert_eq!(
        engine.sink().status,
        format!("{} out of 2000", engine.location().href().chars().count())
    );
}

#[test]
fn navigation_while_typing_changes_nothing() {
    let (mut engine, clock) = start();
    settle(&mut engine, &clock);

    engine.edit(DocumentRole::Secondary, "first");
    run_for(&mut engine, &clock, ms(300));
    let data_rev = engine.document(DocumentRole::Primary).revision();
    let template_rev = engine.document(DocumentRole::Secondary).revision();
    assert!(engine.is_typing());

    engine.location_mut().back();
    assert_eq!(engine.navigated(), NavigationOutcome::Suppressed);
    assert_eq!(engine.document(DocumentRole::Primary).revision(), data_rev);
    assert_eq!(engine.document(DocumentRole::Secondary).revision(), template_rev);
    assert_eq!(engine.document(DocumentRole::Secondary).content(), "first");
}

#[test]
fn back_navigation_when_idle_restores_previous_state() {
    let (mut engine, clock) = start();
    settle(&mut engine, &clock);

    engine.edit(DocumentRole::Secondary, "version one");
    settle(&mut engine, &clock);
    engine.edit(DocumentRole::Secondary, "version two");
    settle(&mut engine, &clock);
    let history = engine.location().history_len();
    let data_rev = engine.document(DocumentRole::Primary).revision();

    assert!(engine.location_mut().back());
    let outcome = engine.navigated();
    assert_eq!(
        outcome,
        NavigationOutcome::Applied {
            data_changed: false,
            template_changed: true
        }
    );
    assert_eq!(engine.document(DocumentRole::Secondary).content(), "version one");
    assert_eq!(engine.document(DocumentRole::Primary).revision(), data_rev);

    // The applied change re-renders, and persisting identical content does
    // not push a new history entry.
    settle(&mut engine, &clock);
    assert_eq!(engine.sink().shown, Shown::Output("version one".to_string()));
    assert_eq!(engine.location().history_len(), history);
    assert!(engine.location_mut().forward());
}

#[test]
fn navigation_to_identical_state_is_a_no_op() {
    let (mut engine, clock) = start();
    settle(&mut engine, &clock);
    let fragment = engine.location().fragment();
    let revisions = (
        engine.document(DocumentRole::Primary).revision(),
        engine.document(DocumentRole::Secondary).revision(),
    );

    engine.location_mut().navigate_to(&fragment);
    engine.navigated();

    assert_eq!(
        (
            engine.document(DocumentRole::Primary).revision(),
            engine.document(DocumentRole::Secondary).revision(),
        ),
        revisions
    );
    assert!(!engine.is_pending(Pulse::Render));
    assert!(!engine.is_typing());
}

#[test]
fn undecodable_navigation_is_ignored() {
    let (mut engine, clock) = start();
    settle(&mut engine, &clock);

    engine.location_mut().navigate_to("definitely-not-state");
    assert!(matches!(engine.navigated(), NavigationOutcome::Rejected(_)));
    assert_eq!(engine.document(DocumentRole::Primary).content(), r#"{"hello":"world"}"#);
}

#[test]
fn parse_error_replaces_previous_output() {
    let (mut engine, clock) = start();
    settle(&mut engine, &clock);
    assert_eq!(engine.sink().shown, Shown::Output("world".to_string()));

    engine.edit(DocumentRole::Primary, "{bad");
    run_for(&mut engine, &clock, ms(300));

    match &engine.sink().shown {
        Shown::Diagnostics(text) => assert!(text.starts_with("Parse error:")),
        other => panic!("expected diagnostics, got {other:?}"),
    }
    assert!(matches!(engine.last_render(), Some(RenderResult::Err(d)) if !d.is_empty()));

    // The loop keeps going after a failed cycle.
    engine.edit(DocumentRole::Primary, r#"{"hello":"again"}"#);
    run_for(&mut engine, &clock, ms(300));
    assert_eq!(engine.sink().shown, Shown::Output("again".to_string()));
}

#[test]
fn legacy_fragment_seeds_documents() {
    use std::io::Write;

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(br#"{"json":"{\"x\":1}","mustache":"{{x}}"}"#)
        .unwrap();
    let bytes = encoder.finish().unwrap();
    use base64::Engine as _;
    let fragment = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);

    let clock = ManualClock::new();
    let mut engine = SyncEngine::new(
        &EngineSettings::default(),
        MemoryLocation::with_fragment("http://localhost/", &fragment),
        RecordingSink::new(),
        Box::new(clock.clone()),
    );
    assert_eq!(engine.document(DocumentRole::Secondary).content(), "{{x}}");

    clock.advance(ms(250));
    engine.tick();
    assert_eq!(engine.sink().shown, Shown::Output("1".to_string()));
    // Re-persisted in the canonical short-name form.
    assert_ne!(engine.location().fragment(), fragment);
}

#[test]
fn editor_widgets_drive_the_engine() {
    let (mut engine, clock) = start();
    let settings = EngineSettings::default();
    let template_editor = Rc::new(RefCell::new(BufferEditor::from_settings("", &settings)));
    let _binding = EditorBinding::attach(
        template_editor.clone(),
        engine.document(DocumentRole::Secondary),
        engine.sender(),
    );
    engine.pump();
    assert_eq!(template_editor.borrow().full_text(), "{{hello}}");
    assert_eq!(engine.document(DocumentRole::Secondary).revision(), 0);

    template_editor.borrow_mut().set_selection(0, 0);
    template_editor.borrow_mut().handle_key("Tab");
    template_editor.borrow_mut().type_text("-");
    engine.pump();
    assert_eq!(engine.document(DocumentRole::Secondary).content(), "    -{{hello}}");

    settle(&mut engine, &clock);
    assert_eq!(engine.sink().shown, Shown::Output("    -world".to_string()));

    // Navigation back to the seeded state flows into the widget.
    engine.location_mut().navigate_to(
        &HashCodec::new()
            .encode(&StatePayload::new(r#"{"hello":"world"}"#, "{{hello}}"))
            .unwrap(),
    );
    engine.navigated();
    assert_eq!(template_editor.borrow().full_text(), "{{hello}}");
}

#[test]
fn list_templates_render_through_the_engine() {
    let (mut engine, clock) = start();
    engine.edit(
        DocumentRole::Primary,
        r#"{"items":[{"name":"a"},{"name":"b"}], "empty": []}"#,
    );
    engine.edit(
        DocumentRole::Secondary,
        "{{#items}}{{name}};{{/items}}{{^empty}}no extras{{/empty}}",
    );
    run_for(&mut engine, &clock, ms(300));
    assert_eq!(engine.sink().shown, Shown::Output("a;b;no extras".to_string()));
}
