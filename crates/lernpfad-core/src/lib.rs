//! Gemeinsame Typen und Kollaborations-Traits für lernpfad.
//!
//! Die Empfehlungs-Engine liest Topologie, Lernpunkt-Zustand und
//! Lernaktivitäten ausschließlich über die hier definierten Traits. Alle
//! Rückgaben sind unveränderliche Werte; es gibt keine versteckten
//! Nachladevorgänge.

pub mod error;
pub mod event;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use error::{Result, StoreError};

/// Kennung eines Lernpunkts (Exponat, physisch oder virtuell).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub u32);

impl TargetId {
    /// Synthetischer Startknoten, von dem aus die Einstiegs-Kanten eines
    /// Themas ausgehen.
    pub const ROOT: TargetId = TargetId(0);
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kennung eines Themas (Lernpfad).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeId(pub u32);

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kennung einer Lernaktivität (Sitzung eines Lernenden).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub u64);

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gerichtete Kante zwischen zwei Lernpunkten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: TargetId,
    pub to: TargetId,
    /// Wegzeit in Minuten.
    pub move_time: u32,
}

/// Momentaufnahme eines Lernpunkts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetState {
    pub id: TargetId,
    /// Maximale Anzahl gleichzeitiger Lernender (`PLj`).
    pub capacity: u32,
    /// Aktuelle Anzahl Lernender (`Mj`).
    pub occupancy: u32,
    /// Sättigungsobergrenze (`S`) im Stau-Term der Pfadkosten.
    pub saturation: u32,
    /// Geschätzte Lernzeit in Minuten.
    pub learn_time: u32,
}

impl TargetState {
    /// `Fj`: der Lernpunkt ist voll, sobald `Mj >= PLj`.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.occupancy >= self.capacity
    }

    /// `Rj`: Auslastungsverhältnis `Mj / PLj`, `0.0` bei leerem Lernpunkt.
    ///
    /// Liefert `None`, wenn Personen anwesend sind, die Kapazität aber `0`
    /// beträgt.
    #[must_use]
    pub fn occupancy_ratio(&self) -> Option<f64> {
        if self.occupancy == 0 {
            Some(0.0)
        } else if self.capacity == 0 {
            None
        } else {
            Some(f64::from(self.occupancy) / f64::from(self.capacity))
        }
    }

    /// Freie Plätze, nach unten bei `0` begrenzt.
    #[must_use]
    pub fn vacancy(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }
}

/// Thema mit Startpunkt und Sollzeit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    pub name: String,
    pub start_target: TargetId,
    /// Empfohlene Gesamtlernzeit in Minuten.
    pub learn_time: u32,
}

/// Was die Engine über eine Lernaktivität wissen muss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityState {
    pub id: ActivityId,
    pub theme: ThemeId,
    /// Volle Lernpunkte dürfen als virtuelles Material empfohlen werden.
    pub enable_virtual: bool,
}

/// Ein Eintrag der Empfehlungsliste. Wird pro Aufruf neu erzeugt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationCandidate {
    pub next_target: TargetId,
    /// `true` für einen physisch erreichbaren Lernpunkt, `false` für die
    /// virtuelle Ausweichempfehlung.
    pub is_entity: bool,
    pub path_cost: f64,
    pub virtual_cost: f64,
}

/// Topologie und Themenzugehörigkeit.
pub trait Topology {
    /// Ausgehende Kanten von `target`. Eine leere Liste ist kein Fehler.
    fn edges_from(&self, target: TargetId) -> Result<Vec<Edge>>;
    /// Zugehörigkeitsgewicht von `target` zu `theme`, `None` ohne Eintrag.
    fn membership_weight(&self, target: TargetId, theme: ThemeId) -> Result<Option<u32>>;
    fn theme(&self, theme: ThemeId) -> Result<Option<Theme>>;
}

/// Lesezugriff auf den aktuellen Lernpunkt-Zustand.
pub trait TargetStates {
    fn target_state(&self, target: TargetId) -> Result<Option<TargetState>>;
}

/// Lesezugriff auf Lernaktivitäten.
pub trait ActivityStates {
    fn activity_state(&self, activity: ActivityId) -> Result<Option<ActivityState>>;
    /// Wurde `target` in dieser Aktivität bereits betreten?
    fn is_target_visited(&self, activity: ActivityId, target: TargetId) -> Result<bool>;
}

/// Gemeinsam genutzte Belegungszähler (`Mj`).
///
/// Implementierungen ändern den Zähler eines Lernpunkts atomar. Abzüge
/// werden bei `0` abgeschnitten; nach oben wird nicht begrenzt.
pub trait OccupancyLedger {
    /// Addiert `delta` und gibt die neue Belegung zurück.
    fn adjust_occupancy(&self, target: TargetId, delta: i32) -> Result<u32>;
}

/// Schnittstelle für Aufrufer, die Empfehlungen anfordern.
pub trait Recommender {
    type Error: std::error::Error;

    /// Sortierte Empfehlungsliste, höchste Priorität zuerst.
    fn recommend(
        &self,
        current: TargetId,
        activity: ActivityId,
    ) -> std::result::Result<Vec<RecommendationCandidate>, Self::Error>;
}
