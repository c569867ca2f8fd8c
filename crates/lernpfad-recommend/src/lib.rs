#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Stauabhängige Empfehlung des nächsten Lernpunkts.
//!
//! Der [`PathRecommender`] bewertet die Nachbarn des aktuellen Lernpunkts
//! mit gewichteten Pfadkosten. Lernpunkte, die in der Aktivität bereits
//! besucht wurden, fallen heraus. Volle Lernpunkte erscheinen nur als
//! virtuelle Ausweichempfehlung, wenn die Aktivität virtuelles Material
//! zulässt.
//!
//! Jeder Aufruf liest frisch aus den Kollaborateuren; es wird nichts
//! zwischengespeichert, auch nicht der Normalisierungsparameter `gamma`.

pub mod config;
pub mod error;

use lernpfad_core::{
    ActivityId, ActivityStates, Edge, RecommendationCandidate, Recommender, TargetId,
    TargetState, TargetStates, ThemeId, Topology,
};

pub use config::{EngineConfig, MissingMembership};
pub use error::{ErrorClass, RecommendError, Result};

/// Empfehlungs-Engine über drei nur lesend genutzte Kollaborateure.
#[derive(Debug)]
pub struct PathRecommender<'a, T: ?Sized, S: ?Sized, A: ?Sized> {
    topology: &'a T,
    targets: &'a S,
    activities: &'a A,
    config: EngineConfig,
}

impl<'a, T, S, A> PathRecommender<'a, T, S, A>
where
    T: Topology + ?Sized,
    S: TargetStates + ?Sized,
    A: ActivityStates + ?Sized,
{
    /// Engine mit [`EngineConfig::default`].
    pub fn new(topology: &'a T, targets: &'a S, activities: &'a A) -> Self {
        Self {
            topology,
            targets,
            activities,
            config: EngineConfig::default(),
        }
    }

    /// Engine mit eigener Konfiguration; ungültiges `alpha` wird abgelehnt.
    pub fn with_config(
        topology: &'a T,
        targets: &'a S,
        activities: &'a A,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            topology,
            targets,
            activities,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Berechnet `gamma` für `theme` aus den Kanten des Startknotens.
    ///
    /// `gamma = EntitySum / VirtualSum` mit
    /// `EntitySum = Σ w·(S − Rj + 1)/(moveTime + learnTime)` und
    /// `VirtualSum = Σ w/learnTime`. Lernpunkte ohne Zugehörigkeit zum Thema
    /// tragen mit Gewicht `0` bei.
    pub fn normalization_parameter(&self, theme: ThemeId) -> Result<f64> {
        let edges = self.topology.edges_from(self.config.root)?;

        let mut entity_sum = 0.0;
        let mut virtual_sum = 0.0;
        for edge in &edges {
            let weight = match self.topology.membership_weight(edge.to, theme)? {
                Some(w) => f64::from(w),
                None => {
                    tracing::debug!(%theme, target_id = %edge.to, "Root target outside theme, weight 0");
                    0.0
                }
            };
            let state = self.target_state(edge.to)?;
            let learn = learn_time(&state)?;

            virtual_sum += weight / learn;
            entity_sum += entity_term(&state, weight, edge.move_time)?;
        }

        if virtual_sum <= 0.0 {
            return Err(RecommendError::ZeroVirtualWeight(theme));
        }

        let gamma = entity_sum / virtual_sum;
        tracing::debug!(%theme, gamma, root_edges = edges.len(), "Normalization parameter computed");
        Ok(gamma)
    }

    /// Entfernt Kanten zu Lernpunkten, die `activity` schon besucht hat.
    /// Die Reihenfolge bleibt erhalten.
    pub fn exclude_visited(&self, activity: ActivityId, edges: Vec<Edge>) -> Result<Vec<Edge>> {
        let mut reachable = Vec::with_capacity(edges.len());
        for edge in edges {
            if !self.activities.is_target_visited(activity, edge.to)? {
                reachable.push(edge);
            }
        }
        Ok(reachable)
    }

    /// Bewertet eine einzelne Kante.
    ///
    /// Liefert `None`, wenn der Lernpunkt voll ist und die Aktivität kein
    /// virtuelles Material zulässt.
    pub fn score(
        &self,
        edge: &Edge,
        theme: ThemeId,
        gamma: f64,
        enable_virtual: bool,
    ) -> Result<Option<RecommendationCandidate>> {
        let state = self.target_state(edge.to)?;
        let weight = self.candidate_weight(edge.to, theme)?;
        let learn = learn_time(&state)?;
        let scale = self.config.alpha * gamma;
        let virtual_cost = scale * (weight / learn);

        if state.is_full() {
            if !enable_virtual {
                tracing::trace!(target_id = %edge.to, "Full target dropped, virtual fallback disabled");
                return Ok(None);
            }
            return Ok(Some(RecommendationCandidate {
                next_target: edge.to,
                is_entity: false,
                path_cost: 0.0,
                virtual_cost,
            }));
        }

        let path_cost = scale * entity_term(&state, weight, edge.move_time)?;
        Ok(Some(RecommendationCandidate {
            next_target: edge.to,
            is_entity: true,
            path_cost,
            virtual_cost,
        }))
    }

    /// Sortierte Empfehlungsliste für den Lernenden in `activity`, der gerade
    /// bei `current` steht. Eine leere Liste ist kein Fehler.
    ///
    /// Der Normalisierungsparameter wird vor den Kanten von `current`
    /// berechnet. Ein Thema ohne virtuelles Gewicht an der Wurzel scheitert
    /// daher mit [`RecommendError::ZeroVirtualWeight`], auch wenn `current`
    /// keine ausgehenden Kanten hat.
    pub fn recommend(
        &self,
        current: TargetId,
        activity: ActivityId,
    ) -> Result<Vec<RecommendationCandidate>> {
        let session = self
            .activities
            .activity_state(activity)?
            .ok_or(RecommendError::ActivityNotFound(activity))?;
        let theme = session.theme;
        if self.topology.theme(theme)?.is_none() {
            return Err(RecommendError::ThemeNotFound(theme));
        }

        let gamma = self.normalization_parameter(theme)?;
        let edges = self.topology.edges_from(current)?;
        let reachable = self.exclude_visited(activity, edges)?;

        let mut candidates = Vec::with_capacity(reachable.len());
        for edge in &reachable {
            if let Some(candidate) = self.score(edge, theme, gamma, session.enable_virtual)? {
                candidates.push(candidate);
            }
        }
        rank(&mut candidates);

        tracing::debug!(
            %activity,
            %current,
            %theme,
            gamma,
            candidates = candidates.len(),
            "Recommendation computed"
        );
        Ok(candidates)
    }

    fn target_state(&self, target: TargetId) -> Result<TargetState> {
        self.targets
            .target_state(target)?
            .ok_or(RecommendError::TargetNotFound(target))
    }

    fn candidate_weight(&self, target: TargetId, theme: ThemeId) -> Result<f64> {
        match self.topology.membership_weight(target, theme)? {
            Some(w) => Ok(f64::from(w)),
            None => match self.config.missing_membership {
                MissingMembership::Zero => {
                    tracing::warn!(%theme, target_id = %target, "Missing theme membership, defaulting to 0");
                    Ok(0.0)
                }
                MissingMembership::Reject => {
                    Err(RecommendError::MembershipNotFound { target, theme })
                }
            },
        }
    }
}

impl<T, S, A> Recommender for PathRecommender<'_, T, S, A>
where
    T: Topology + ?Sized,
    S: TargetStates + ?Sized,
    A: ActivityStates + ?Sized,
{
    type Error = RecommendError;

    fn recommend(
        &self,
        current: TargetId,
        activity: ActivityId,
    ) -> Result<Vec<RecommendationCandidate>> {
        PathRecommender::recommend(self, current, activity)
    }
}

/// Sortiert absteigend nach `path_cost`. Die Sortierung ist stabil:
/// gleiche Kosten behalten ihre Einfügereihenfolge.
pub fn rank(candidates: &mut [RecommendationCandidate]) {
    candidates.sort_by(|a, b| b.path_cost.total_cmp(&a.path_cost));
}

fn learn_time(state: &TargetState) -> Result<f64> {
    if state.learn_time == 0 {
        return Err(RecommendError::ZeroLearnTime(state.id));
    }
    Ok(f64::from(state.learn_time))
}

/// `w·(S − Rj + 1)/(moveTime + learnTime)`
fn entity_term(state: &TargetState, weight: f64, move_time: u32) -> Result<f64> {
    let ratio = state
        .occupancy_ratio()
        .ok_or(RecommendError::ZeroCapacity(state.id))?;
    let travel = f64::from(move_time) + learn_time(state)?;
    Ok(weight * (f64::from(state.saturation) - ratio + 1.0) / travel)
}
