use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk level attached to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Safe to apply without review.
    Low,
    /// Apply with normal change management.
    Medium,
    /// Requires review before applying.
    High,
    /// Requires explicit sign-off and a rollback plan.
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

/// A structured suggestion produced by an agent from arbitrary context.
///
/// Confidence and risk level are agent-kind-specific heuristics; the
/// contract only requires confidence in `[0, 1]`, which the constructor
/// enforces by clamping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Type tag of the agent that produced this recommendation.
    pub agent_type: String,
    /// Short actionable title.
    pub title: String,
    /// What to change.
    pub description: String,
    /// Why the agent believes the change is worth making.
    pub rationale: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// Risk of applying the recommendation.
    pub risk_level: RiskLevel,
    /// Estimated monthly savings in dollars, when quantifiable.
    pub estimated_savings: Option<f64>,
    /// Alternative approaches considered.
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Conditions that must hold before applying.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// How to undo the change, when one exists.
    pub rollback_plan: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    /// Creates a recommendation, clamping confidence into `[0, 1]`.
    pub fn new(
        agent_type: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        rationale: impl Into<String>,
        confidence: f64,
        risk_level: RiskLevel,
    ) -> Self {
        Self {
            agent_type: agent_type.into(),
            title: title.into(),
            description: description.into(),
            rationale: rationale.into(),
            confidence: confidence.clamp(0.0, 1.0),
            risk_level,
            estimated_savings: None,
            alternatives: Vec::new(),
            prerequisites: Vec::new(),
            rollback_plan: None,
            created_at: Utc::now(),
        }
    }

    /// Attaches an estimated monthly savings figure.
    pub fn with_savings(mut self, savings: f64) -> Self {
        self.estimated_savings = Some(savings);
        self
    }

    /// Attaches alternative approaches.
    pub fn with_alternatives(mut self, alternatives: Vec<String>) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// Attaches prerequisites.
    pub fn with_prerequisites(mut self, prerequisites: Vec<String>) -> Self {
        self.prerequisites = prerequisites;
        self
    }

    /// Attaches a rollback plan.
    pub fn with_rollback(mut self, plan: impl Into<String>) -> Self {
        self.rollback_plan = Some(plan.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        let high = Recommendation::new("cost", "t", "d", "r", 1.7, RiskLevel::Low);
        assert_eq!(high.confidence, 1.0);
        let low = Recommendation::new("cost", "t", "d", "r", -0.3, RiskLevel::Low);
        assert_eq!(low.confidence, 0.0);
    }

    #[test]
    fn test_builder_chain() {
        let rec = Recommendation::new(
            "cost-optimization",
            "Rightsize m5.4xlarge fleet",
            "Move to m5.2xlarge",
            "Average CPU is below 20%",
            0.85,
            RiskLevel::Medium,
        )
        .with_savings(1200.0)
        .with_alternatives(vec!["Switch to spot instances".to_string()])
        .with_rollback("Scale the ASG back to the previous instance type");

        assert_eq!(rec.estimated_savings, Some(1200.0));
        assert_eq!(rec.alternatives.len(), 1);
        assert!(rec.rollback_plan.is_some());
    }

    #[test]
    fn test_risk_level_display() {
        assert_eq!(RiskLevel::Low.to_string(), "low");
        assert_eq!(RiskLevel::Critical.to_string(), "critical");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let rec = Recommendation::new("security", "Patch CVE", "Apply patch", "Known exploit", 0.9, RiskLevel::High);
        let json = serde_json::to_string(&rec).unwrap();
        let parsed: Recommendation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.agent_type, "security");
        assert_eq!(parsed.risk_level, RiskLevel::High);
    }
}
