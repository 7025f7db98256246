use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid graph description: {0}")]
    Syntax(#[from] json5::Error),
    #[error("node without an id (label {label:?})")]
    MissingId { label: String },
    #[error("duplicate node id {0:?}")]
    DuplicateId(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("node {0:?} not found")]
    NodeNotFound(String),
    #[error("node {0:?} is not a container")]
    NotAContainer(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FocusError {
    #[error("focus target {0:?} not found")]
    TargetNotFound(String),
    #[error("no node labelled {0:?}")]
    LabelNotFound(String),
    #[error("diagram has no nodes to focus")]
    EmptyGraph,
}
