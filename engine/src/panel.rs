//! Prediction panel state.
//!
//! The panel holds what is on screen (the last applied result) and which
//! request is current. Every submitted snapshot gets a fresh generation;
//! only the result for the latest generation may change the display, so a
//! slow response for an older drawing can never overwrite a newer one.

use digitpad_classifier::PredictError;
use digitpad_types::{PredictionResult, Snapshot};

/// Text of the toast raised when the current request fails.
pub const PREDICTION_ERROR_TEXT: &str = "An error occurred while trying to predict the image";

/// A request the owner must dispatch.
#[derive(Debug, Clone)]
pub struct PredictionTicket {
    pub generation: u64,
    pub snapshot: Snapshot,
}

/// What [`PredictionPanel::settle`] did with a result.
#[derive(Debug)]
pub enum Settled {
    /// Current result applied to the display.
    Applied,
    /// Current request failed; the display was reset and the error should
    /// be surfaced.
    Failed(PredictError),
    /// Result belongs to a superseded request and was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct PredictionPanel {
    display: PredictionResult,
    latest: u64,
    in_flight: Option<u64>,
}

impl PredictionPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn display(&self) -> &PredictionResult {
        &self.display
    }

    /// True iff the latest issued request has not settled.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn latest_generation(&self) -> u64 {
        self.latest
    }

    /// React to a new snapshot.
    ///
    /// `None` means the drawing was cleared: the display goes neutral at
    /// once and any in-flight request is orphaned.
    pub fn submit(&mut self, snapshot: Option<Snapshot>) -> Option<PredictionTicket> {
        self.latest += 1;
        match snapshot {
            Some(snapshot) => {
                self.in_flight = Some(self.latest);
                Some(PredictionTicket {
                    generation: self.latest,
                    snapshot,
                })
            }
            None => {
                self.in_flight = None;
                self.display = PredictionResult::neutral();
                None
            }
        }
    }

    pub fn settle(
        &mut self,
        generation: u64,
        outcome: Result<PredictionResult, PredictError>,
    ) -> Settled {
        if self.in_flight != Some(generation) {
            tracing::debug!(
                generation,
                latest = self.latest,
                ok = outcome.is_ok(),
                "Discarding stale prediction"
            );
            return Settled::Stale;
        }
        self.in_flight = None;
        match outcome {
            Ok(result) => {
                self.display = result;
                Settled::Applied
            }
            Err(error) => {
                self.display = PredictionResult::neutral();
                Settled::Failed(error)
            }
        }
    }
}

/// Fill fraction of a probability bar.
#[must_use]
pub fn bar_ratio(probability: f64) -> f64 {
    if probability.is_nan() {
        return 0.0;
    }
    probability.clamp(0.0, 1.0)
}
