//! Warten auf eine geladene Oberfläche mit Abfrage-Intervall und Abbruch-Signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::core::TerrainSurface;
use crate::shared::PlacementOptions;

/// Teilbares Abbruch-Signal (z.B. aus einem UI- oder Signal-Handler-Thread).
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Neues, nicht ausgelöstes Signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Löst den Abbruch aus.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// `true` sobald `cancel` aufgerufen wurde
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Parameter der Warteschleife.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Abstand zwischen zwei Abfragen
    pub poll_interval: Duration,
    /// Maximale Wartezeit (`None` = unbegrenzt)
    pub timeout: Option<Duration>,
}

impl WaitOptions {
    /// Übernimmt Intervall und Timeout aus den Platzierungs-Optionen.
    pub fn from_options(options: &PlacementOptions) -> Self {
        Self {
            poll_interval: Duration::from_millis(options.ready_poll_interval_ms),
            timeout: options.ready_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Oberfläche ist bereit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    /// Anzahl Abfragen bis zur Bereitschaft (mind. 1)
    pub polls: usize,
    /// Gesamte Wartezeit
    pub waited: Duration,
}

/// Warten ohne Bereitschaft beendet.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// Abbruch-Signal ausgelöst
    #[error("waiting for surface cancelled")]
    Cancelled,
    /// Timeout überschritten
    #[error("surface not ready after {waited:?}")]
    TimedOut {
        /// Gesamte Wartezeit
        waited: Duration,
    },
}

/// Fragt `surface.is_loaded()` im Intervall ab, bis die Oberfläche bereit ist,
/// das Signal ausgelöst wird oder der Timeout abläuft.
///
/// Das Abbruch-Signal hat Vorrang vor der Bereitschaft.
pub fn await_ready(
    surface: &dyn TerrainSurface,
    token: &CancelToken,
    options: &WaitOptions,
) -> Result<Ready, WaitError> {
    let started = Instant::now();
    let mut polls = 0;

    loop {
        if token.is_cancelled() {
            log::info!("Warten auf Oberfläche abgebrochen nach {} Abfragen", polls);
            return Err(WaitError::Cancelled);
        }

        polls += 1;
        if surface.is_loaded() {
            let waited = started.elapsed();
            log::debug!("Oberfläche bereit nach {} Abfragen ({:?})", polls, waited);
            return Ok(Ready { polls, waited });
        }

        let waited = started.elapsed();
        if let Some(timeout) = options.timeout {
            if waited >= timeout {
                log::warn!("Oberfläche nicht bereit nach {:?}", waited);
                return Err(WaitError::TimedOut { waited });
            }
        }

        log::trace!("Oberfläche noch nicht geladen, Abfrage {}", polls);
        std::thread::sleep(options.poll_interval);
    }
}
