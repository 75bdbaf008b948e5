use async_trait::async_trait;

use crate::agent::AgentError;
use crate::model::ImprovementPlan;

/// Optional LLM step layered on top of the deterministic scoring: given the
/// issues/suggestions already identified, propose concrete removals and
/// additions. A provider failure degrades gracefully — the deck simply
/// keeps its rule-based suggestions with no improvement plan attached.
#[async_trait]
pub trait ImprovementAdvisor: Send + Sync {
    async fn propose(&self, system_prompt: &str, user_prompt: &str) -> Result<ImprovementPlan, AgentError>;
}

/// A fixed-response stand-in for a real provider.
pub struct StubImprovementAdvisor {
    pub should_fail: bool,
}

impl StubImprovementAdvisor {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for StubImprovementAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImprovementAdvisor for StubImprovementAdvisor {
    async fn propose(&self, _system_prompt: &str, _user_prompt: &str) -> Result<ImprovementPlan, AgentError> {
        if self.should_fail {
            return Err(AgentError::not_retryable("stub advisor configured to fail"));
        }
        Ok(ImprovementPlan::default())
    }
}

/// Runs the advisor and degrades to `None` on any failure, logging rather
/// than propagating, since an improvement plan is an enhancement over the
/// rule-based suggestions, not a required part of verification.
pub async fn propose_improvements(
    advisor: &dyn ImprovementAdvisor,
    system_prompt: &str,
    user_prompt: &str,
) -> Option<ImprovementPlan> {
    match advisor.propose(system_prompt, user_prompt).await {
        Ok(plan) => Some(plan),
        Err(e) => {
            tracing::warn!(error = %e, "improvement advisor call failed, continuing without a plan");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failing_advisor_degrades_to_none() {
        let advisor = StubImprovementAdvisor::failing();
        let result = propose_improvements(&advisor, "sys", "user").await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn working_advisor_returns_a_plan() {
        let advisor = StubImprovementAdvisor::new();
        let result = propose_improvements(&advisor, "sys", "user").await;
        assert!(result.is_some());
    }
}
