mod advisor;
mod scoring;

pub use advisor::{propose_improvements, ImprovementAdvisor, StubImprovementAdvisor};
pub use scoring::QualityVerifier;
