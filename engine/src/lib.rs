//! Core engine for Digitpad - drawing, throttled export and prediction state.
//!
//! This crate contains the App state machine without TUI dependencies. Data
//! flows one way: surface → snapshot → panel → classifier → panel.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use digitpad_classifier::{ClassifierClient, PredictError};
pub use digitpad_config::Settings;

pub use digitpad_types::{
    DIGIT_CLASSES, Digit, PagePosition, PredictionResult, SURFACE_HEIGHT, SURFACE_WIDTH, Snapshot,
    SurfaceOffset, SurfacePoint, UiOptions, format_percentage,
};

pub mod loader;
pub mod panel;
pub mod surface;
pub mod throttle;
pub mod toast;

pub use loader::{LoaderAnimation, LoaderFrame};
pub use panel::{PREDICTION_ERROR_TEXT, PredictionPanel, PredictionTicket, Settled, bar_ratio};
pub use surface::{Bitmap, DrawingSurface, GestureInput, GestureOutcome, SnapshotError};
pub use throttle::{Throttle, ThrottleDecision};
pub use toast::{TOAST_LIFETIME, Toast, ToastLevel, ToastQueue};


// ============================================================================
// Input events
// ============================================================================

/// Primary-button pointer activity, already translated to page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down(GestureInput),
    Drag(GestureInput),
    Up(GestureInput),
}

/// Rectangular hit target in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl HitBox {
    #[must_use]
    pub fn contains(&self, position: PagePosition) -> bool {
        position.x >= self.left
            && position.y >= self.top
            && position.x < self.left + self.width
            && position.y < self.top + self.height
    }
}

/// A finished classifier call, tagged with the generation it answers.
#[derive(Debug)]
pub struct PredictionEvent {
    pub generation: u64,
    pub outcome: Result<PredictionResult, PredictError>,
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    surface: DrawingSurface,
    throttle: Throttle,
    panel: PredictionPanel,
    toasts: ToastQueue,
    loader: LoaderAnimation,
    client: ClassifierClient,
    results_tx: mpsc::UnboundedSender<PredictionEvent>,
    results_rx: mpsc::UnboundedReceiver<PredictionEvent>,
    clear_button: Option<HitBox>,
    ui_options: UiOptions,
    last_tick: Option<Instant>,
    last_snapshot: Option<Snapshot>,
    snapshots_exported: u64,
    should_quit: bool,
}

impl App {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = ClassifierClient::new(&settings.endpoint, settings.request_timeout)?;
        let (results_tx, results_rx) = mpsc::unbounded_channel();

        tracing::info!(
            endpoint = %client.predict_url(),
            throttle_ms = settings.throttle.as_millis() as u64,
            "Digitpad engine ready"
        );

        Ok(Self {
            surface: DrawingSurface::new(settings.stroke_width),
            throttle: Throttle::new(settings.throttle),
            panel: PredictionPanel::new(),
            toasts: ToastQueue::default(),
            loader: LoaderAnimation::new(settings.ui.reduced_motion),
            client,
            results_tx,
            results_rx,
            clear_button: None,
            ui_options: settings.ui,
            last_tick: None,
            last_snapshot: None,
            snapshots_exported: 0,
            should_quit: false,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    #[must_use]
    pub fn panel(&self) -> &PredictionPanel {
        &self.panel
    }

    #[must_use]
    pub fn prediction(&self) -> &PredictionResult {
        self.panel.display()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.panel.is_loading()
    }

    #[must_use]
    pub fn toasts(&self) -> &[Toast] {
        self.toasts.visible()
    }

    #[must_use]
    pub fn loader_frame(&self) -> LoaderFrame {
        self.loader.frame()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.client.predict_url().as_str()
    }

    /// Most recent exported snapshot, if any.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }

    #[must_use]
    pub fn snapshots_exported(&self) -> u64 {
        self.snapshots_exported
    }

    /// When the next trailing export is due, for frame scheduling.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.throttle.deadline()
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Publish where the surface is drawn and how page units map to pixels.
    pub fn set_surface_layout(&mut self, offset: SurfaceOffset) {
        self.surface.set_offset(offset);
    }

    pub fn set_clear_button(&mut self, hit_box: Option<HitBox>) {
        self.clear_button = hit_box;
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Route a pointer event. Returns whether the event was consumed.
    ///
    /// Releases end the active stroke wherever they land, so a drag that
    /// leaves the surface still finishes cleanly.
    pub fn pointer(&mut self, event: PointerEvent, now: Instant) -> bool {
        match event {
            PointerEvent::Down(input) => {
                // A press while still drawing means the release was lost.
                if self.end_stroke(now) {
                    tracing::debug!("Stroke ended by a new press");
                }
                if self.surface.hit(&input) {
                    return self.surface.on_gesture_start(&input).suppresses_default();
                }
                let on_clear = input.position().is_some_and(|position| {
                    self.clear_button.is_some_and(|button| button.contains(position))
                });
                if on_clear {
                    self.clear_canvas();
                }
                on_clear
            }
            PointerEvent::Drag(input) => self.surface.on_gesture_move(&input).suppresses_default(),
            PointerEvent::Up(_) => self.end_stroke(now),
        }
    }

    /// Pointer contact lost without a release.
    pub fn focus_lost(&mut self, now: Instant) {
        if self.end_stroke(now) {
            tracing::debug!("Stroke ended by focus loss");
        }
    }

    /// Show a transient notice, e.g. a startup warning.
    pub fn notify(&mut self, level: ToastLevel, text: impl Into<String>, now: Instant) {
        self.toasts.push(level, text, now);
    }

    pub fn clear_canvas(&mut self) {
        self.surface.clear();
        self.throttle.cancel();
        self.publish(None);
    }

    fn end_stroke(&mut self, now: Instant) -> bool {
        match self.surface.on_gesture_end() {
            GestureOutcome::StrokeFinished => {
                if self.throttle.call(now) == ThrottleDecision::Fire {
                    self.export_snapshot();
                }
                true
            }
            GestureOutcome::Ignored | GestureOutcome::Drawing => false,
        }
    }

    // ------------------------------------------------------------------
    // Frame clock
    // ------------------------------------------------------------------

    /// Advance timers: trailing export, loader animation, toast expiry.
    pub fn tick(&mut self, now: Instant) {
        let delta = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);

        if self.throttle.poll(now) {
            self.export_snapshot();
        }

        if self.panel.is_loading() {
            self.loader.advance(delta);
        } else {
            self.loader.reset();
        }

        self.toasts.prune(now);
    }

    /// Apply finished classifier calls. Returns how many were drained,
    /// stale ones included.
    pub fn process_prediction_events(&mut self, now: Instant) -> usize {
        let mut drained = 0;
        while let Ok(event) = self.results_rx.try_recv() {
            drained += 1;
            match self.panel.settle(event.generation, event.outcome) {
                Settled::Applied => {
                    tracing::info!(
                        generation = event.generation,
                        prediction = %self.panel.display().prediction_label(),
                        "Prediction applied"
                    );
                }
                Settled::Failed(error) => {
                    tracing::warn!(
                        generation = event.generation,
                        malformed = error.is_malformed(),
                        "Prediction failed: {error}"
                    );
                    self.toasts.push(ToastLevel::Error, PREDICTION_ERROR_TEXT, now);
                }
                Settled::Stale => {}
            }
        }
        drained
    }

    // ------------------------------------------------------------------
    // Export + dispatch
    // ------------------------------------------------------------------

    fn export_snapshot(&mut self) {
        match self.surface.snapshot() {
            Ok(snapshot) => {
                self.snapshots_exported += 1;
                self.last_snapshot = Some(snapshot.clone());
                self.publish(Some(snapshot));
            }
            Err(error) => {
                tracing::error!("Snapshot export failed: {error}");
                self.toasts.push(ToastLevel::Error, PREDICTION_ERROR_TEXT, Instant::now());
            }
        }
    }

    fn publish(&mut self, snapshot: Option<Snapshot>) {
        if let Some(ticket) = self.panel.submit(snapshot) {
            self.dispatch(ticket);
        }
    }

    fn dispatch(&self, ticket: PredictionTicket) {
        let client = self.client.clone();
        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let PredictionTicket {
                generation,
                snapshot,
            } = ticket;
            let outcome = client.predict(&snapshot, generation).await;
            // Receiver gone means the app is shutting down.
            let _ = tx.send(PredictionEvent {
                generation,
                outcome,
            });
        });
    }
}
