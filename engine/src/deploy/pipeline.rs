//! Generic sequential step runner

use async_trait::async_trait;
use tracing::{info, warn};

use crate::exec::LogStream;
use crate::models::deployment::Phase;
use crate::models::message::Message;

const HEADER_RULE: &str = "-----------------------------------------------";

/// What to do when a step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep running the remaining steps
    #[default]
    Continue,
    /// Skip every step after the first failure
    Halt,
}

impl FailurePolicy {
    pub fn from_halt(halt_on_failure: bool) -> Self {
        if halt_on_failure {
            FailurePolicy::Halt
        } else {
            FailurePolicy::Continue
        }
    }
}

/// One entry of a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step<A> {
    pub title: String,
    pub phase: Phase,
    pub action: A,
}

impl<A> Step<A> {
    pub fn new(title: impl Into<String>, phase: Phase, action: A) -> Self {
        Self {
            title: title.into(),
            phase,
            action,
        }
    }
}

/// Executes the action of a step
#[async_trait]
pub trait StepRunner<A: Sync>: Send + Sync {
    async fn run(&self, action: &A, stream: &LogStream) -> Message;
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub title: String,
    pub phase: Phase,
    pub result: Message,
}

/// Everything a pipeline run produced
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub outcomes: Vec<StepOutcome>,
    /// Headers and step messages, in order
    pub log: String,
    /// Titles of steps skipped after a failure
    pub skipped: Vec<String>,
}

impl PipelineReport {
    pub fn failed(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|o| !o.result.is_success())
    }

    pub fn succeeded(&self) -> bool {
        self.failed().next().is_none()
    }
}

impl From<PipelineReport> for Message {
    fn from(report: PipelineReport) -> Self {
        if report.succeeded() {
            return Message::success(report.log);
        }

        let failed = report
            .failed()
            .map(|o| o.title.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let mut text = report.log;
        text.push_str(&format!("\nFailed steps: {}", failed));
        if !report.skipped.is_empty() {
            text.push_str(&format!("\nSkipped steps: {}", report.skipped.join(", ")));
        }
        Message::failure(text)
    }
}

/// Section header written before each step
pub fn step_header(title: &str) -> String {
    format!("\n{}\n{}\n{}\n", HEADER_RULE, title, HEADER_RULE)
}

pub struct Pipeline<A> {
    steps: Vec<Step<A>>,
    policy: FailurePolicy,
}

impl<A: Sync> Pipeline<A> {
    pub fn new(steps: Vec<Step<A>>, policy: FailurePolicy) -> Self {
        Self { steps, policy }
    }

    pub fn steps(&self) -> &[Step<A>] {
        &self.steps
    }

    /// Run every step in order, one at a time
    pub async fn execute(&self, runner: &dyn StepRunner<A>, stream: &LogStream) -> PipelineReport {
        let mut report = PipelineReport::default();
        let mut halted = false;

        for step in &self.steps {
            if halted {
                report.skipped.push(step.title.clone());
                continue;
            }

            info!("[{}] {}", step.phase, step.title);
            let header = step_header(&step.title);
            stream.emit(&header);
            report.log.push_str(&header);

            let result = runner.run(&step.action, stream).await;
            report.log.push_str(result.message());

            if !result.is_success() {
                warn!("Step '{}' failed", step.title);
                halted = self.policy == FailurePolicy::Halt;
            }

            report.outcomes.push(StepOutcome {
                title: step.title.clone(),
                phase: step.phase,
                result,
            });
        }

        report
    }
}
