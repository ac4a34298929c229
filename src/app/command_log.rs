//! Protokoll der Build-Schritte, wird mit der Szene als JSON ausgegeben.

use std::collections::VecDeque;

use serde::Serialize;

use crate::core::{Category, GeoPosition};

/// Ein ausgeführter Schritt des Szenen-Aufbaus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum BuildCommand {
    /// Oberfläche war bereit
    AwaitSurface {
        /// Anzahl Abfragen
        polls: usize,
    },
    /// Kartenzentrum auf den Datensatz gesetzt
    CenterMap {
        /// Neues Zentrum
        center: GeoPosition,
    },
    /// Kategorie platziert
    PlaceCategory {
        /// Kategorie
        category: Category,
        /// Datensatz-ID
        dataset: String,
        /// Anzahl platzierter Knoten
        placed: usize,
        /// Anzahl übersprungener Features
        skipped: usize,
    },
}

/// Build-Schritte in Ausführungsreihenfolge, serialisiert als JSON-Array.
///
/// Bei vollem Log fällt jeweils der älteste Schritt heraus.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct CommandLog {
    steps: VecDeque<BuildCommand>,
    #[serde(skip)]
    limit: usize,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::with_limit(Self::DEFAULT_LIMIT)
    }
}

impl CommandLog {
    /// Standard-Obergrenze
    pub const DEFAULT_LIMIT: usize = 256;

    /// Leeres Log mit Standard-Obergrenze.
    pub fn new() -> Self {
        Self::default()
    }

    /// Leeres Log, das höchstens `limit` Schritte behält (mindestens einen).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            steps: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Hängt einen Schritt an.
    pub fn record(&mut self, command: BuildCommand) {
        if self.steps.len() == self.limit {
            self.steps.pop_front();
        }
        log::debug!("Build-Schritt: {:?}", command);
        self.steps.push_back(command);
    }

    /// Anzahl gespeicherter Schritte
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// `true` ohne Schritte
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Alle Schritte, ältester zuerst
    pub fn entries(&self) -> &VecDeque<BuildCommand> {
        &self.steps
    }

    /// Summe übersprungener Features über alle platzierten Kategorien
    pub fn skipped(&self) -> usize {
        self.steps
            .iter()
            .map(|step| match step {
                BuildCommand::PlaceCategory { skipped, .. } => *skipped,
                _ => 0,
            })
            .sum()
    }
}
