use std::cell::RefCell;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};

use stache_pad::app::controllers::binding::EditorBinding;
use stache_pad::app::controllers::preview::status_text;
use stache_pad::app::infrastructure::clock::SystemClock;
use stache_pad::app::infrastructure::editor::TextEditorWidget;
use stache_pad::app::infrastructure::error::Result;
use stache_pad::app::infrastructure::location::{Location, MemoryLocation};
use stache_pad::app::infrastructure::sink::PresentationSink;
use stache_pad::app::{
    DocumentRole, EngineSettings, HashCodec, RenderPipeline, RenderResult, StatePayload, SyncEngine,
};

/// How often `live` checks the watched files for edits.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(
    name = "stachepad",
    version,
    about = "Mustache playground that keeps its state in the URL"
)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a template against a data file once
    Render {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        template: PathBuf,
    },
    /// Print the shareable URL for a data/template pair
    Encode {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        template: PathBuf,
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Decode a fragment or URL back into its documents
    Decode {
        fragment: String,
        #[arg(long)]
        data_out: Option<PathBuf>,
        #[arg(long)]
        template_out: Option<PathBuf>,
    },
    /// Watch both files, re-render on edits and keep the URL current.
    /// Each stdin line is a navigation: a fragment, a URL, `back` or `forward`.
    /// With --fragment, the decoded documents overwrite both files.
    Live {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        template: PathBuf,
        #[arg(long)]
        fragment: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => EngineSettings::load_from(path),
        None => EngineSettings::load(),
    };

    match run(cli.command, &settings) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, settings: &EngineSettings) -> Result<ExitCode> {
    match command {
        Command::Render { data, template } => {
            let pipeline = RenderPipeline::new(settings.pretty_indent);
            match pipeline.render(&fs::read_to_string(data)?, &fs::read_to_string(template)?) {
                RenderResult::Ok(output) => {
                    println!("{}", output);
                    Ok(ExitCode::SUCCESS)
                }
                result @ RenderResult::Err(_) => {
                    eprintln!("{}", result.display_text());
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Encode {
            data,
            template,
            base_url,
        } => {
            let payload =
                StatePayload::new(fs::read_to_string(data)?, fs::read_to_string(template)?);
            let fragment = HashCodec::new().encode(&payload)?;
            let mut location =
                MemoryLocation::new(base_url.unwrap_or_else(|| settings.base_url.clone()));
            location.set_fragment(&fragment);
            println!("{}", location.href());
            eprintln!("{}", status_text(&location.href()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Decode {
            fragment,
            data_out,
            template_out,
        } => {
            let payload = HashCodec::new().decode(fragment_of(&fragment))?;
            write_or_print("data", data_out.as_deref(), &payload.data_text)?;
            write_or_print("template", template_out.as_deref(), &payload.template_text)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Live {
            data,
            template,
            fragment,
        } => live(settings, &data, &template, fragment.as_deref()),
    }
}

fn fragment_of(input: &str) -> &str {
    input.split_once('#').map(|(_, f)| f).unwrap_or(input)
}

fn write_or_print(label: &str, path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, text)?,
        None => println!("--- {} ---\n{}", label, text),
    }
    Ok(())
}

fn live(
    settings: &EngineSettings,
    data_path: &Path,
    template_path: &Path,
    fragment: Option<&str>,
) -> Result<ExitCode> {
    let location = match fragment {
        Some(f) => MemoryLocation::with_fragment(settings.base_url.clone(), fragment_of(f)),
        None => MemoryLocation::new(settings.base_url.clone()),
    };
    let mut engine = SyncEngine::new(
        settings,
        location,
        TerminalSink::default(),
        Box::new(SystemClock::new()),
    );

    let data_widget = Rc::new(RefCell::new(FileWidget::open(data_path)));
    let template_widget = Rc::new(RefCell::new(FileWidget::open(template_path)));

    // Existing files win over built-in defaults unless a fragment was given.
    if fragment.is_none() {
        for (role, widget) in [
            (DocumentRole::Primary, &data_widget),
            (DocumentRole::Secondary, &template_widget),
        ] {
            if let Some(text) = widget.borrow().existing_text() {
                engine.edit(role, text);
            }
        }
    }

    let _bindings = [
        EditorBinding::attach(
            data_widget.clone(),
            engine.document(DocumentRole::Primary),
            engine.sender(),
        ),
        EditorBinding::attach(
            template_widget.clone(),
            engine.document(DocumentRole::Secondary),
            engine.sender(),
        ),
    ];

    let navigation = spawn_stdin_reader();
    let mut shown_href = String::new();
    log::info!(
        "watching {} and {}",
        data_path.display(),
        template_path.display()
    );

    loop {
        for widget in [&data_widget, &template_widget] {
            if let Err(e) = widget.borrow_mut().poll() {
                log::debug!("poll failed: {}", e);
            }
        }
        engine.pump();

        loop {
            match navigation.try_recv() {
                Ok(line) => {
                    let location = engine.location_mut();
                    match line.as_str() {
                        "back" => {
                            location.back();
                        }
                        "forward" => {
                            location.forward();
                        }
                        other => location.navigate_to(fragment_of(other)),
                    }
                    let outcome = engine.navigated();
                    log::info!("navigation: {:?}", outcome);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        engine.tick();

        let href = engine.location().href();
        if href != shown_href {
            println!("url: {}", href);
            shown_href = href;
        }

        let wait = engine
            .next_deadline()
            .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL));
        thread::sleep(wait);
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Prints previews to stdout and the size status to stderr.
#[derive(Default)]
struct TerminalSink {
    last_status: String,
}

impl PresentationSink for TerminalSink {
    fn show_output(&mut self, output: &str) {
        println!("===== preview =====\n{}", output);
    }

    fn show_diagnostics(&mut self, diagnostics: &str) {
        println!("===== errors =====\n{}", diagnostics);
    }

    fn show_status(&mut self, status: &str) {
        if status != self.last_status {
            eprintln!("[{}]", status);
            self.last_status = status.to_string();
        }
    }
}

/// A file on disk acting as the editing widget for one document.
struct FileWidget {
    path: PathBuf,
    text: String,
    existed: bool,
    on_change: Option<Box<dyn FnMut(&str)>>,
}

impl FileWidget {
    fn open(path: &Path) -> Self {
        let (text, existed) = match fs::read_to_string(path) {
            Ok(text) => (text, true),
            Err(_) => (String::new(), false),
        };
        Self {
            path: path.to_path_buf(),
            text,
            existed,
            on_change: None,
        }
    }

    fn existing_text(&self) -> Option<String> {
        self.existed.then(|| self.text.clone())
    }

    /// Pick up edits made by an external editor.
    fn poll(&mut self) -> io::Result<()> {
        let disk = fs::read_to_string(&self.path)?;
        if disk != self.text {
            self.text = disk;
            if let Some(callback) = self.on_change.as_mut() {
                callback(&self.text);
            }
        }
        Ok(())
    }
}

impl TextEditorWidget for FileWidget {
    fn full_text(&self) -> String {
        self.text.clone()
    }

    fn replace_range(&mut self, from: usize, to: usize, text: &str) {
        let to = to.min(self.text.len());
        let from = from.min(to);
        self.text.replace_range(from..to, text);
        if let Err(e) = fs::write(&self.path, &self.text) {
            log::warn!("could not write {}: {}", self.path.display(), e);
        }
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.text);
        }
    }

    fn set_on_change(&mut self, callback: Box<dyn FnMut(&str)>) {
        self.on_change = Some(callback);
    }
}
