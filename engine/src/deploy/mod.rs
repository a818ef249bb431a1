//! Deployments: release tags, step plans and their execution

pub mod orchestrator;
pub mod pipeline;
pub mod plan;
pub mod tags;

pub use orchestrator::{deploy, DeployRunner};
pub use pipeline::{FailurePolicy, Pipeline, PipelineReport, Step, StepRunner};
pub use plan::{build_plan, DeployAction};
pub use tags::{next_release_tag, ReleaseTag};
