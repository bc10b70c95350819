use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("nanim2 parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid nax2 file: {0}")]
    InvalidNax2(String),

    #[error("unsupported animation file: {0}")]
    UnsupportedFormat(String),

    #[error("group index {index} out of range ({count} groups)")]
    GroupOutOfRange { index: usize, count: usize },

    #[error("curves {first}..{end} out of range for group with {count} curves")]
    CurveRangeOutOfBounds { first: usize, end: usize, count: usize },

    #[error("curve {curve} of group {group} reads keys past the end of the key pool")]
    KeyRangeOutOfBounds { group: usize, curve: usize },

    #[error("clip '{clip}' expects {expected} curves but group {group} has {actual}")]
    ClipCurveMismatch { clip: String, group: usize, expected: usize, actual: usize },

    #[error("state clips disagree on curve count: {expected} vs {actual}")]
    StateCurveMismatch { expected: usize, actual: usize },

    #[error("skeleton has {joints} joints but the state provides {curves} curves")]
    JointCurveMismatch { joints: usize, curves: usize },

    #[error("joint {joint} references parent {parent} which is not declared before it")]
    InvalidParentJoint { joint: usize, parent: usize },

    #[error("too many joints: {count} (max {max})")]
    TooManyJoints { count: usize, max: usize },

    #[error("no animation attached to character")]
    NoAnimation,

    #[error("clip '{0}' does not exist")]
    UnknownClip(String),

    #[error("clip index {index} out of range ({count} clips)")]
    ClipOutOfRange { index: usize, count: usize },
}

pub type Result<T> = std::result::Result<T, AnimError>;
