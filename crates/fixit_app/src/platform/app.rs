use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::Local;
use engine_logging::engine_info;
use fixit_core::{update, AppState, Msg};
use fixit_engine::GeminiClassifier;

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::ui::commands::{self, Command};
use super::ui::render;

const TICK: Duration = Duration::from_millis(75);

enum Input {
    Line(String),
    Closed,
}

pub fn run_app(config: AppConfig) -> anyhow::Result<()> {
    let now = Local::now().timestamp_millis();
    let market = config.seed.build_marketplace(now);
    let state = AppState::new(market, config.seed.initial_principal());

    let classifier = GeminiClassifier::new(config.classifier.to_settings());
    let mut app = App {
        state,
        effects: EffectRunner::new(Arc::new(classifier)),
        out: io::stdout(),
    };

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Closed);
    });

    engine_info!("FixItNow session started");
    app.print_view()?;
    app.prompt()?;

    loop {
        match input_rx.recv_timeout(TICK) {
            Ok(Input::Line(line)) => {
                if !app.handle_line(&line)? {
                    break;
                }
                app.prompt()?;
            }
            Ok(Input::Closed) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => app.dispatch(Msg::Tick)?,
        }
        for msg in app.effects.drain_messages() {
            app.dispatch(msg)?;
        }
    }

    engine_info!("FixItNow session ended");
    Ok(())
}

struct App {
    state: AppState,
    effects: EffectRunner,
    out: io::Stdout,
}

impl App {
    /// Returns `false` when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        let command = match commands::parse(line, Local::now()) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(message) => {
                writeln!(self.out, "? {message}")?;
                return Ok(true);
            }
        };

        match command {
            Command::Quit => return Ok(false),
            Command::Help => {
                for line in commands::HELP {
                    writeln!(self.out, "  {line}")?;
                }
            }
            Command::Show => self.print_view()?,
            Command::Say(text) => match self.state.chat_job() {
                Some(job_id) => self.dispatch(Msg::MessagePosted {
                    job_id,
                    text,
                    now: Local::now().timestamp_millis(),
                })?,
                None => writeln!(self.out, "? open a chat first with 'chat <job>'")?,
            },
            Command::Msg(msg) => self.dispatch(msg)?,
        }
        Ok(true)
    }

    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.effects.enqueue(effects);
        let dirty = state.consume_dirty();
        self.state = state;
        if dirty {
            self.print_view()?;
        }
        Ok(())
    }

    fn print_view(&mut self) -> io::Result<()> {
        for line in render::render(&self.state.view()) {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()
    }
}
