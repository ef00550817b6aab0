//! src/main.rs
//! Flexi HQ / TimeSync workforce console

use std::{
    io::{self, Stdout},
    panic::PanicHookInfo,
    sync::Arc,
    time::Instant,
};

use anyhow::{Context, Result};
use crossterm::{
    event::EventStream,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Frame, Terminal, backend::CrosstermBackend};
use tokio::{
    signal,
    sync::{Notify, mpsc},
};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use hq_core::{
    Config, Logger,
    controller::{
        actions::Action,
        dispatcher::Dispatcher,
        event_loop::{EventLoop, MetricsSnap, TaskResult},
    },
    data::source_for,
    model::app_state::{AppState, build_screens},
    tasks::sync_task::SimulatedBackend,
    view::{theme::Palette, ui::UIRenderer},
};

type AppTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    setup_panic_handler();

    let app = App::new()
        .await
        .context("Failed to initialize application")?;
    app.run().await.context("Application runtime error")?;

    info!("Application exited cleanly");
    Ok(())
}

struct App {
    terminal: AppTerminal,
    state: AppState,
    dispatcher: Dispatcher,
    event_loop: EventLoop,
    ui_renderer: UIRenderer,
    shutdown: Arc<Notify>,
    needs_redraw: bool,

    // Flushes the log file on drop; declared last so it outlives the rest.
    _log_guard: WorkerGuard,
}

impl App {
    async fn new() -> Result<Self> {
        let (config, config_error) = match Config::load().await {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        };

        let log_guard = Logger::init_tracing(&config.logging).context("Failed to initialize logging")?;
        info!(
            marker = "APP_START",
            operation_type = "startup",
            "Starting workforce console"
        );
        if let Some(e) = config_error {
            warn!(
                marker = "CONFIG_FALLBACK",
                operation_type = "startup",
                "Failed to load config, using defaults: {e:#}"
            );
        }

        let source = source_for(&config);
        let origin = source.describe();
        let seed = source
            .load()
            .await
            .with_context(|| format!("Failed to load seed data from {origin}"))?;
        info!(
            marker = "SEED_LOADED",
            operation_type = "startup",
            origin = %origin,
            records = seed.len(),
            "seed data loaded"
        );

        let screens = build_screens(&config, seed).context("Failed to build list screens")?;
        let backend = Arc::new(SimulatedBackend::new(config.sync_latency));
        let palette = Palette::for_theme(config.theme);

        let (task_tx, task_rx) = mpsc::unbounded_channel::<TaskResult>();
        let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();

        let state = AppState::new(Arc::new(config), screens, origin, backend, task_tx, action_tx)
            .context("Failed to create application state")?;
        let dispatcher = Dispatcher::new(&state);
        let event_loop = EventLoop::new(task_rx, action_rx);

        let terminal = setup_terminal().context("Failed to initialize terminal")?;

        info!(
            marker = "APP_READY",
            operation_type = "startup",
            screen = state.active_screen().title(),
            handlers = ?dispatcher.router().handler_names(),
            "Application initialized successfully"
        );

        Ok(Self {
            terminal,
            state,
            dispatcher,
            event_loop,
            ui_renderer: UIRenderer::new(palette),
            shutdown: Arc::new(Notify::new()),
            needs_redraw: true,
            _log_guard: log_guard,
        })
    }

    async fn run(mut self) -> Result<()> {
        self.setup_shutdown_handler();
        let mut event_stream = EventStream::new();

        loop {
            self.render()?;

            tokio::select! {
                () = self.shutdown.notified() => {
                    info!(marker = "SHUTDOWN", operation_type = "runtime", "Shutdown signal received");
                    break;
                }

                maybe_event = event_stream.next() => {
                    let Some(event) = maybe_event else {
                        warn!(marker = "INPUT_CLOSED", operation_type = "runtime", "Terminal event stream ended");
                        break;
                    };
                    let event = event.context("Failed to read terminal event")?;
                    let actions = self.dispatcher.on_terminal_event(&self.state, event)?;
                    if !self.dispatch_all(actions) {
                        break;
                    }
                }

                Some(action) = self.event_loop.next_action() => {
                    if !self.dispatch_all([action]) {
                        break;
                    }
                }
            }
        }

        self.log_final_metrics();
        info!(marker = "APP_EXIT", operation_type = "runtime", "Event loop terminated cleanly");
        Ok(())
    }

    /// Returns `false` once an action asks to quit.
    fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) -> bool {
        for action in actions {
            debug!("Dispatching action: {:?}", action);
            self.needs_redraw |= action.needs_redraw();
            if !self.dispatcher.dispatch(&mut self.state, action) {
                return false;
            }
        }
        true
    }

    fn render(&mut self) -> Result<()> {
        if !self.needs_redraw {
            return Ok(());
        }

        let start = Instant::now();
        let Self {
            terminal,
            state,
            ui_renderer,
            ..
        } = self;
        terminal
            .draw(|frame: &mut Frame<'_>| ui_renderer.render(frame, state))
            .context("Failed to draw terminal")?;
        self.needs_redraw = false;

        let duration = start.elapsed();
        if duration.as_millis() > 16 {
            warn!("Slow render: {}ms (target: <16ms)", duration.as_millis());
        }
        Ok(())
    }

    fn log_final_metrics(&self) {
        let metrics: MetricsSnap = self.event_loop.snapshot_metrics();
        let render = self.ui_renderer.stats();

        info!("Final metrics:");
        info!("  Tasks processed: {}", metrics.tasks);
        info!("  Actions processed: {}", metrics.actions);
        info!("  Average interval: {:.2}ms", metrics.avg.as_secs_f64() * 1000.0);
        info!("  Frames drawn: {} ({} slow)", render.frames, render.slow);
    }

    fn setup_shutdown_handler(&self) {
        let shutdown = Arc::clone(&self.shutdown);

        tokio::spawn(async move {
            #[cfg(unix)]
            {
                use tokio::signal::unix::{SignalKind, signal};

                let (mut sigterm, mut sigint) =
                    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                        (Ok(term), Ok(int)) => (term, int),
                        (Err(e), _) | (_, Err(e)) => {
                            warn!("Failed to install signal handlers: {}", e);
                            return;
                        }
                    };

                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM"),
                    _ = sigint.recv() => info!("Received SIGINT"),
                    _ = signal::ctrl_c() => info!("Received Ctrl+C"),
                }
            }

            #[cfg(not(unix))]
            {
                if let Err(e) = signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                info!("Received Ctrl+C");
            }

            shutdown.notify_one();
        });
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(e) = cleanup_terminal(&mut self.terminal) {
            warn!("Failed to cleanup terminal: {}", e);
        }
    }
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("Terminal setup complete");
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    info!("Terminal cleanup complete");
    Ok(())
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);

        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
