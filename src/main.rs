use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::Arc,
};

use easel::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    events::{generate_session_id, EventSink, FileSink, NullSink},
    logging::init_file_logging,
    runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    timer::PracticeTimer,
    transport,
    ui::{DetailScreen, TimerScreen},
};

/// staged practice timer for drawing exam prep
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A staged countdown timer for timed drawing practice: sketch, color, \
detail and organize phases with per-phase goals, progress tracking and a session log."
)]
pub struct Cli {
    /// drawing subject, e.g. "풍경 그리기"
    #[clap(short, long)]
    subject: Option<String>,

    /// exam type, e.g. "사고의 전환"
    #[clap(short = 't', long = "type")]
    kind: Option<String>,

    /// total exam time in hours
    #[clap(long)]
    hours: Option<f64>,

    /// hours reserved for the sketch phase (remaining time is split over
    /// the phases left on automatic)
    #[clap(long)]
    sketch: Option<f64>,

    /// hours reserved for the color phase
    #[clap(long)]
    color: Option<f64>,

    /// hours reserved for the detail phase
    #[clap(long)]
    detail: Option<f64>,

    /// hours reserved for the organize phase
    #[clap(long)]
    organize: Option<f64>,

    /// resume a paused session from the string the pause screen printed
    #[clap(short, long)]
    resume: Option<String>,
}

impl Cli {
    /// Flags win over the persisted last-used setup.
    fn merge_into(&self, mut cfg: Config) -> Config {
        if let Some(s) = &self.subject {
            cfg.subject = s.clone();
        }
        if let Some(k) = &self.kind {
            cfg.kind = k.clone();
        }
        if let Some(h) = self.hours {
            cfg.total_hours = h;
        }
        if let Some(h) = self.sketch {
            cfg.sketch_hours = Some(h);
        }
        if let Some(h) = self.color {
            cfg.color_hours = Some(h);
        }
        if let Some(h) = self.detail {
            cfg.detail_hours = Some(h);
        }
        if let Some(h) = self.organize {
            cfg.organize_hours = Some(h);
        }
        cfg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Timer,
    Detail,
}

pub struct App {
    pub timer: PracticeTimer,
    pub screen: Screen,
    /// Set on pause; printed on the detail screen so the session can be
    /// resumed from another invocation.
    pub resume_query: Option<String>,
    cfg: Config,
    overrides: Vec<Option<f64>>,
    sink: Arc<dyn EventSink>,
}

impl App {
    pub fn fresh(cfg: Config, sink: Arc<dyn EventSink>) -> Self {
        let overrides = cfg.override_seconds();
        let timer = PracticeTimer::new(
            cfg.subject.clone(),
            cfg.kind.clone(),
            cfg.total_seconds(),
            overrides.clone(),
            Box::new(sink.clone()),
        );
        timer.notify_start(&overrides);
        Self {
            timer,
            screen: Screen::Timer,
            resume_query: None,
            cfg,
            overrides,
            sink,
        }
    }

    /// Builds the app from a `--resume` string. A finished session opens
    /// straight on the detail screen; anything else picks up ticking where
    /// the pause left off.
    pub fn from_resume_query(query: &str, cfg: Config, sink: Arc<dyn EventSink>) -> Self {
        let params = transport::parse_query(query);
        let session = transport::decode(&params);
        let overrides = transport::step_overrides(&params);
        let finished = session.is_finished;
        let timer = PracticeTimer::resume(session, overrides.clone(), Box::new(sink.clone()));
        Self {
            screen: if finished { Screen::Detail } else { Screen::Timer },
            resume_query: None,
            timer,
            cfg,
            overrides,
            sink,
        }
    }

    pub fn pause(&mut self) {
        let mut params = self.timer.pause();
        params.insert(transport::KEY_IS_PAUSED.to_string(), "true".to_string());
        self.resume_query = Some(transport::to_query_string(&params));
        self.screen = Screen::Detail;
    }

    pub fn continue_session(&mut self) {
        if self.timer.session.is_finished {
            return;
        }
        self.timer = PracticeTimer::resume(
            self.timer.session.clone(),
            self.overrides.clone(),
            Box::new(self.sink.clone()),
        );
        self.resume_query = None;
        self.screen = Screen::Timer;
    }

    pub fn new_session(&mut self) {
        let overrides = self.cfg.override_seconds();
        self.timer = PracticeTimer::new(
            self.cfg.subject.clone(),
            self.cfg.kind.clone(),
            self.cfg.total_seconds(),
            overrides.clone(),
            Box::new(self.sink.clone()),
        );
        self.timer.notify_start(&overrides);
        self.overrides = overrides;
        self.resume_query = None;
        self.screen = Screen::Timer;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_file_path() {
        init_file_logging(&log_path)?;
    }

    let store = FileConfigStore::new();
    let cfg = cli.merge_into(store.load());

    let sink: Arc<dyn EventSink> = match AppDirs::session_log_path() {
        Some(path) => Arc::new(FileSink::new(path, generate_session_id())),
        None => Arc::new(NullSink),
    };

    let mut app = match &cli.resume {
        Some(query) => App::from_resume_query(query, cfg, sink),
        None => {
            if let Err(err) = store.save(&cfg) {
                tracing::warn!(%err, "could not persist session setup");
            }
            App::fresh(cfg, sink)
        }
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::second());
    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

pub fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick => {
                if app.screen == Screen::Timer && app.timer.is_running() {
                    app.timer.on_tick();
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if handle_key(app, key) == KeyOutcome::Quit {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> KeyOutcome {
    let is_quit = key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
    if is_quit {
        // A session abandoned mid-run still leaves a trace in the log.
        if app.timer.is_running() {
            app.timer.notify_unexpected_exit();
        }
        return KeyOutcome::Quit;
    }

    match app.screen {
        Screen::Timer => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                app.timer.complete_current_step();
                if !app.timer.is_running() {
                    app.screen = Screen::Detail;
                }
            }
            KeyCode::Char('p') => {
                app.pause();
            }
            _ => {}
        },
        Screen::Detail => match key.code {
            KeyCode::Char('c') => {
                app.continue_session();
            }
            KeyCode::Char('n') => {
                app.new_session();
            }
            _ => {}
        },
    }
    KeyOutcome::Continue
}

fn ui(app: &mut App, f: &mut Frame) {
    match app.screen {
        Screen::Timer => {
            let tip = app.timer.current_tip();
            f.render_widget(
                TimerScreen {
                    timer: &app.timer,
                    tip,
                },
                f.area(),
            );
        }
        Screen::Detail => {
            let remaining = if app.timer.session.is_finished {
                None
            } else {
                Some(app.timer.remaining_time())
            };
            f.render_widget(
                DetailScreen {
                    session: &app.timer.session,
                    remaining,
                    resume_query: app.resume_query.as_deref(),
                },
                f.area(),
            );
        }
    }
}
