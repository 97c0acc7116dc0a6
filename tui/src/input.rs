//! Input handling for Digitpad TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::debug;

use digitpad_engine::{App, GestureInput, PagePosition, PointerEvent};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close first so a reader blocked on a full channel wakes up.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop; never block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    // Backpressure rather than drop: a lost mouse-up would
                    // leave a stroke open.
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending terminal events into the app. Returns `true` once the
/// user asked to quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };
        apply_event(app, &ev, Instant::now());
        processed += 1;
        if app.should_quit() {
            break;
        }
    }
    Ok(app.should_quit())
}

/// Apply one terminal event.
pub fn apply_event(app: &mut App, ev: &Event, now: Instant) {
    match ev {
        Event::Key(key) => handle_key(app, *key),
        Event::Mouse(mouse) => {
            if let Some(pointer) = pointer_event(*mouse) {
                app.pointer(pointer, now);
            }
        }
        Event::FocusLost => app.focus_lost(now),
        Event::Resize(width, height) => debug!(width, height, "Terminal resized"),
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.request_quit(),
        KeyCode::Char('q') | KeyCode::Esc => app.request_quit(),
        KeyCode::Char('c' | 'C') | KeyCode::Delete | KeyCode::Backspace => app.clear_canvas(),
        _ => {}
    }
}

/// Page position of a cell: its center, in cell units.
#[must_use]
pub fn cell_center(column: u16, row: u16) -> PagePosition {
    PagePosition::new(f32::from(column) + 0.5, f32::from(row) + 0.5)
}

/// Translate a left-button mouse event. Other buttons are ignored.
#[must_use]
pub fn pointer_event(mouse: MouseEvent) -> Option<PointerEvent> {
    let input = GestureInput::Mouse(cell_center(mouse.column, mouse.row));
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(PointerEvent::Down(input)),
        MouseEventKind::Drag(MouseButton::Left) => Some(PointerEvent::Drag(input)),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up(input)),
        _ => None,
    }
}
