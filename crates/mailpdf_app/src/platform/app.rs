use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;

use anyhow::Context;
use engine_logging::{engine_debug, engine_info, engine_warn};
use log::LevelFilter;
use mailpdf_core::{
    classify_backend_error, install_panic_hook, update, AppState, Bundle, ConfigChange, Effect,
    EnvironmentInfo, ErrorBoundary, FileCandidate, Locale, Msg, WizardSettings,
};

use super::effects::EffectRunner;
use super::settings::{load_settings, settings_path, AppSettings};
use super::ui::commands::{parse_command, Command};
use super::ui::constants::{DIRECTORY_PROMPT, HELP, PROMPT};
use super::ui::render;

/// Everything the console loop reacts to, from stdin or the engine.
pub enum Inbound {
    Line(String),
    InputClosed,
    Msg(Msg),
}

pub fn run_app() -> anyhow::Result<()> {
    let path = settings_path();
    let (settings, settings_error) = match load_settings(&path) {
        Ok(settings) => (settings, None),
        Err(err) => (AppSettings::default(), Some(err)),
    };
    let level = settings.log.level_filter().unwrap_or(LevelFilter::Info);
    engine_logging::initialize(settings.log.destination(), level, &settings.log.file);
    if let Some(err) = settings_error {
        engine_warn!("{}; using defaults", err);
    }
    engine_info!("mailpdf {} starting, locale {}", env!("CARGO_PKG_VERSION"), settings.locale.tag());
    install_panic_hook();

    let bundle = Arc::new(Bundle::for_locale(settings.locale));
    let (inbound_tx, inbound_rx) = mpsc::channel::<Inbound>();
    let runner = EffectRunner::new(Arc::clone(&bundle), inbound_tx.clone())
        .context("failed to start the conversion engine")?;
    spawn_stdin_reader(inbound_tx);

    let mut app = ConsoleApp::new(bundle, &settings, runner, io::stdout());
    app.render_current()?;
    while let Ok(inbound) = inbound_rx.recv() {
        match inbound {
            Inbound::Line(line) => app.handle_line(&line)?,
            Inbound::Msg(msg) => app.dispatch(msg)?,
            Inbound::InputClosed => break,
        }
        if app.quit_requested {
            break;
        }
    }
    engine_info!("mailpdf exiting");
    Ok(())
}

fn spawn_stdin_reader(tx: mpsc::Sender<Inbound>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Inbound::Line(line)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    engine_warn!("stdin read failed: {}", err);
                    break;
                }
            }
        }
        let _ = tx.send(Inbound::InputClosed);
    });
}

struct ConsoleApp<W: Write> {
    bundle: Arc<Bundle>,
    rules: WizardSettings,
    locale: Locale,
    state: AppState,
    boundary: ErrorBoundary,
    runner: EffectRunner,
    out: W,
    seq: u64,
    awaiting_directory: bool,
    quit_requested: bool,
}

impl<W: Write> ConsoleApp<W> {
    fn new(bundle: Arc<Bundle>, settings: &AppSettings, runner: EffectRunner, out: W) -> Self {
        let state = AppState::with_settings(Arc::clone(&bundle), settings.wizard.clone());
        Self {
            boundary: ErrorBoundary::new(Arc::clone(&bundle)),
            bundle,
            rules: settings.wizard.clone(),
            locale: settings.locale,
            state,
            runner,
            out,
            seq: 0,
            awaiting_directory: false,
            quit_requested: false,
        }
    }

    fn handle_line(&mut self, line: &str) -> io::Result<()> {
        if self.awaiting_directory {
            self.awaiting_directory = false;
            let answer = line.trim();
            let picked = (!answer.is_empty()).then(|| answer.to_string());
            return self.dispatch(Msg::OutputDirectoryPicked(Ok(picked)));
        }

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(err) => return self.say(&err.to_string()),
        };

        if self.boundary.has_failed() {
            return self.handle_failed(command);
        }

        let msg = match command {
            Command::Empty => return self.prompt(),
            Command::Help => return self.help(),
            Command::Quit => {
                self.quit_requested = true;
                return Ok(());
            }
            Command::Retry | Command::Reload | Command::Report => {
                return self.say("nothing to recover from");
            }
            Command::File(path) => match candidate(&path) {
                Ok(candidate) => Msg::FileChosen(candidate),
                Err(err) => {
                    engine_warn!("Cannot read {}: {}", path, err);
                    let error = classify_backend_error(&self.bundle, &unreadable(&path, &err));
                    let lines = render::render_error(&self.bundle, &error);
                    return self.print(lines);
                }
            },
            Command::Drop(paths) => Msg::FilesDropped(
                paths
                    .iter()
                    .filter_map(|path| match candidate(path) {
                        Ok(candidate) => Some(candidate),
                        Err(err) => {
                            engine_warn!("Dropped path {} unreadable: {}", path, err);
                            None
                        }
                    })
                    .collect(),
            ),
            Command::Clear => Msg::FileCleared,
            Command::Count(text) => Msg::ConfigChanged(ConfigChange::MessagesPerDocumentText(text)),
            Command::Name(name) => Msg::ConfigChanged(ConfigChange::BaseName(name)),
            Command::Dir(dir) => Msg::ConfigChanged(ConfigChange::OutputDirectory(dir)),
            Command::Browse => Msg::BrowseOutputDirectory,
            Command::Start => Msg::StartClicked,
            Command::Cancel => Msg::CancelClicked,
            Command::Confirm => Msg::CancelConfirmed,
            Command::Keep => Msg::CancelDismissed,
            Command::Dismiss => Msg::ErrorDismissed,
            Command::Reset => Msg::ResetClicked,
            Command::Recover(n) => match self.state.view().recovery.get(n - 1) {
                Some(action) => Msg::RecoveryInvoked(action.invoke),
                None => return self.say(&format!("no recovery action {n}")),
            },
        };
        self.dispatch(msg)
    }

    /// While the boundary holds a failure, only its own menu is live.
    fn handle_failed(&mut self, command: Command) -> io::Result<()> {
        match command {
            Command::Retry => {
                self.boundary.retry();
                self.render_current()
            }
            Command::Reload => {
                self.boundary.reload();
                if self.state.is_running() {
                    self.runner.run(Effect::CancelProcessing);
                }
                self.state = AppState::with_settings(Arc::clone(&self.bundle), self.rules.clone());
                self.awaiting_directory = false;
                self.render_current()
            }
            Command::Report => self.report(),
            Command::Help => self.help(),
            Command::Quit => {
                self.quit_requested = true;
                Ok(())
            }
            _ => self.render_failure(),
        }
    }

    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        self.seq += 1;
        engine_logging::set_event_seq(self.seq);
        engine_debug!("Dispatch {:?}", msg);

        // `update` consumes a copy; the live state survives a panic inside it.
        let current = self.state.clone();
        let Some((next, effects)) = self.boundary.guard("update", move || update(current, msg))
        else {
            return self.render_failure();
        };
        self.state = next;
        if self.state.consume_dirty() {
            self.render_current()?;
        }
        self.execute(effects)
    }

    fn execute(&mut self, effects: Vec<Effect>) -> io::Result<()> {
        for effect in effects {
            match effect {
                Effect::PickOutputDirectory => {
                    self.awaiting_directory = true;
                    write!(self.out, "{DIRECTORY_PROMPT}")?;
                    self.out.flush()?;
                }
                other => self.runner.run(other),
            }
        }
        Ok(())
    }

    fn render_current(&mut self) -> io::Result<()> {
        let view = self.state.view();
        let bundle = Arc::clone(&self.bundle);
        self.print(render::render(&bundle, &view))
    }

    fn render_failure(&mut self) -> io::Result<()> {
        let lines = match self.boundary.failure() {
            Some(failure) => render::render_failure(&self.bundle, failure),
            None => Vec::new(),
        };
        self.print(lines)
    }

    fn report(&mut self) -> io::Result<()> {
        let env = EnvironmentInfo::current(env!("CARGO_PKG_VERSION"), self.locale.tag());
        match self.boundary.create_report(&env) {
            Ok(report) => self.say(&report),
            Err(err) => self.say(&err.to_string()),
        }
    }

    fn help(&mut self) -> io::Result<()> {
        self.print(HELP.iter().map(|line| line.to_string()).collect())
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        self.print(vec![text.to_string()])
    }

    fn print(&mut self, lines: Vec<String>) -> io::Result<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        self.prompt()
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{PROMPT}")?;
        self.out.flush()
    }
}

fn candidate(path: &str) -> io::Result<FileCandidate> {
    let meta = fs::metadata(path)?;
    Ok(FileCandidate::new(path, meta.len()))
}

/// Phrases a stat failure so the classifier recognises it.
fn unreadable(path: &str, err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => format!("file not found: {path}"),
        io::ErrorKind::PermissionDenied => format!("permission denied reading {path}"),
        _ => format!("{path}: {err}"),
    }
}
