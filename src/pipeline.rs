//! Role Pipeline
//!
//! Every role walks the same forward-only sequence of stages:
//! `Init -> ContextAcquired -> InputsLoaded -> PrimitiveInvoked ->
//! OutputsPersisted -> Done`. A failing step ends the run; there is no retry.

use std::fmt;

use log::debug;

use crate::error::{Error, Result, RoleError};
use crate::kem::KemContext;

/// The three parties' roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    KeyGenerator,
    Encapsulator,
    Decapsulator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::KeyGenerator => "key generator",
            Role::Encapsulator => "encapsulator",
            Role::Decapsulator => "decapsulator",
        })
    }
}

/// Pipeline stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    ContextAcquired,
    InputsLoaded,
    PrimitiveInvoked,
    OutputsPersisted,
    Done,
}

impl fmt::Display for Stage {
    /// Names the work that leads into the stage, e.g. "loading inputs"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Init => "init",
            Stage::ContextAcquired => "acquiring context",
            Stage::InputsLoaded => "loading inputs",
            Stage::PrimitiveInvoked => "invoking primitive",
            Stage::OutputsPersisted => "persisting outputs",
            Stage::Done => "finishing",
        })
    }
}

/// Acquire a KEM context on behalf of `role`
pub fn acquire_context(role: Role, algorithm_id: &str) -> std::result::Result<KemContext, RoleError> {
    KemContext::new(algorithm_id).map_err(|e| RoleError::new(role, Stage::ContextAcquired, e))
}

/// Tracks one role's progress through its stages
#[derive(Debug)]
pub struct Pipeline {
    role: Role,
    stage: Stage,
}

impl Pipeline {
    /// Start a run for a role that already holds its context
    pub fn start(role: Role) -> Self {
        debug!("{}: {:?}", role, Stage::Init);
        let mut pipeline = Self { role, stage: Stage::Init };
        pipeline.advance(Stage::ContextAcquired);
        pipeline
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run the work leading to `next`; on success the pipeline is at `next`.
    ///
    /// Stages may be skipped (key generation has no inputs) but never revisited.
    pub fn step<T>(&mut self, next: Stage, work: impl FnOnce() -> Result<T>) -> std::result::Result<T, RoleError> {
        debug_assert!(next > self.stage, "{:?} does not follow {:?}", next, self.stage);
        match work() {
            Ok(value) => {
                self.advance(next);
                Ok(value)
            }
            Err(e) => Err(self.fail(next, e)),
        }
    }

    /// Finish the run
    pub fn finish(mut self) {
        self.advance(Stage::Done);
    }

    fn advance(&mut self, next: Stage) {
        debug!("{}: {:?} -> {:?}", self.role, self.stage, next);
        self.stage = next;
    }

    fn fail(&self, attempted: Stage, error: Error) -> RoleError {
        debug!("{}: {:?} -> Failed ({})", self.role, self.stage, error);
        RoleError::new(self.role, attempted, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_advances() {
        let mut pipeline = Pipeline::start(Role::Encapsulator);
        assert_eq!(pipeline.stage(), Stage::ContextAcquired);

        let value = pipeline.step(Stage::InputsLoaded, || Ok(5)).unwrap();
        assert_eq!(value, 5);
        assert_eq!(pipeline.stage(), Stage::InputsLoaded);

        pipeline.step(Stage::OutputsPersisted, || Ok(())).unwrap();
        assert_eq!(pipeline.stage(), Stage::OutputsPersisted);
        pipeline.finish();
    }

    #[test]
    fn test_failed_step_names_attempted_stage() {
        let mut pipeline = Pipeline::start(Role::Decapsulator);
        let err = pipeline
            .step(Stage::PrimitiveInvoked, || -> Result<()> { Err(Error::DecapsulationFailed) })
            .unwrap_err();
        assert_eq!(err.role, Role::Decapsulator);
        assert_eq!(err.stage, Stage::PrimitiveInvoked);
        assert!(matches!(err.kind(), Error::DecapsulationFailed));
        // a failed step does not move the pipeline
        assert_eq!(pipeline.stage(), Stage::ContextAcquired);
    }

    #[test]
    fn test_acquire_context_reports_unsupported() {
        let err = acquire_context(Role::KeyGenerator, "NotAKem").unwrap_err();
        assert_eq!(err.stage, Stage::ContextAcquired);
        assert!(matches!(err.kind(), Error::UnsupportedAlgorithm(_)));
    }
}
