mod plan_executor;

pub use plan_executor::PlanExecutor;
