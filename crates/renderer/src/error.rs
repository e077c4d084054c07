use crate::compile::ProgramError;
use crate::types::ShaderStage;

/// Reasons an attach can fail. Every variant is scoped to one canvas; the
/// caller logs it and carries on with the rest of the page.
#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    #[error("canvas '{canvas}' not found in document")]
    TargetMissing { canvas: String },
    #[error("canvas '{canvas}' has no usable graphics context: {reason}")]
    ContextUnavailable { canvas: String, reason: String },
    #[error("{stage} shader failed to compile for canvas '{canvas}': {log}")]
    ShaderCompile {
        canvas: String,
        stage: ShaderStage,
        log: String,
    },
    #[error("shader program failed to link for canvas '{canvas}': {log}")]
    ProgramLink { canvas: String, log: String },
    #[error("frame scheduler refused canvas '{canvas}': {reason}")]
    SchedulerUnavailable { canvas: String, reason: String },
}

/// Discriminant of [`AttachError`] for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachErrorKind {
    TargetMissing,
    ContextUnavailable,
    ShaderCompile,
    ProgramLink,
    SchedulerUnavailable,
}

impl AttachError {
    pub fn kind(&self) -> AttachErrorKind {
        match self {
            AttachError::TargetMissing { .. } => AttachErrorKind::TargetMissing,
            AttachError::ContextUnavailable { .. } => AttachErrorKind::ContextUnavailable,
            AttachError::ShaderCompile { .. } => AttachErrorKind::ShaderCompile,
            AttachError::ProgramLink { .. } => AttachErrorKind::ProgramLink,
            AttachError::SchedulerUnavailable { .. } => AttachErrorKind::SchedulerUnavailable,
        }
    }

    /// Label of the canvas the failure belongs to.
    pub fn canvas(&self) -> &str {
        match self {
            AttachError::TargetMissing { canvas }
            | AttachError::ContextUnavailable { canvas, .. }
            | AttachError::ShaderCompile { canvas, .. }
            | AttachError::ProgramLink { canvas, .. }
            | AttachError::SchedulerUnavailable { canvas, .. } => canvas,
        }
    }

    pub(crate) fn from_program(canvas: &str, err: ProgramError) -> Self {
        let canvas = canvas.to_string();
        match err {
            ProgramError::Compile { stage, log } => AttachError::ShaderCompile { canvas, stage, log },
            ProgramError::Link { log } => AttachError::ProgramLink { canvas, log },
            ProgramError::Allocation { what } => AttachError::ContextUnavailable {
                canvas,
                reason: format!("failed to allocate {what}"),
            },
        }
    }
}

/// Failure reported by a host collaborator (scheduler, event wiring).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
