//! Parameter der Empfehlungs-Engine.

use lernpfad_core::TargetId;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{RecommendError, Result};

/// Harmonisierungsparameter, mit dem jeder Kostenterm skaliert wird.
pub const DEFAULT_ALPHA: f64 = 0.5;

/// Umgang mit Lernpunkten ohne Zugehörigkeitseintrag im aktiven Thema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingMembership {
    /// Gewicht `0`; der Kandidat bleibt mit Kosten `0` in der Liste.
    #[default]
    Zero,
    /// Abbruch mit [`RecommendError::MembershipNotFound`].
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub alpha: f64,
    /// Knoten, dessen ausgehende Kanten den Normalisierungsparameter bestimmen.
    pub root: TargetId,
    #[serde(default)]
    pub missing_membership: MissingMembership,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            root: TargetId::ROOT,
            missing_membership: MissingMembership::Zero,
        }
    }
}

impl EngineConfig {
    /// Prüft, ob `alpha` in `(0, 1]` liegt, dem Bereich, auf den auch
    /// [`EngineConfig::load`] begrenzt.
    pub fn validate(&self) -> Result<()> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha > 1.0 {
            return Err(RecommendError::InvalidConfig(format!(
                "alpha must lie in (0, 1], got {}",
                self.alpha
            )));
        }
        Ok(())
    }

    /// Persistiert die Parameter als JSON.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        json!({
            "alpha": self.alpha,
            "root": self.root,
            "missing_membership": self.missing_membership,
        })
    }

    /// Übernimmt Werte aus einem Snapshot. Unbrauchbare Felder bleiben
    /// unverändert, `alpha` wird auf `(0, 1]` begrenzt.
    pub fn load(&mut self, v: Value) {
        if let Some(a) = v.get("alpha").and_then(Value::as_f64) {
            self.alpha = if a.is_finite() && a > 0.0 {
                a.min(1.0)
            } else {
                DEFAULT_ALPHA
            };
        }
        if let Some(root) = v
            .get("root")
            .and_then(Value::as_u64)
            .and_then(|r| u32::try_from(r).ok())
        {
            self.root = TargetId(root);
        }
        if let Some(policy) = v
            .get("missing_membership")
            .and_then(|m| serde_json::from_value::<MissingMembership>(m.clone()).ok())
        {
            self.missing_membership = policy;
        }
    }
}
