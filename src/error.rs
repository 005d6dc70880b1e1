pub type BuildResult<T> = Result<T, BuildError>;

/// Precondition failures raised while building or exporting a project.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("invalid input '{input}' on '{opcode}': literal value has no type tag")]
    InvalidInput { opcode: String, input: String },

    #[error("target '{target}' has no costumes")]
    MissingCostume { target: String },

    #[error("project has no stage")]
    MissingStage,

    #[error("'{operation}' is not allowed on the stage")]
    InvalidMutation { operation: String },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("packaging failed: {0}")]
    Package(anyhow::Error),
}

impl BuildError {
    pub fn invalid_input(opcode: impl Into<String>, input: impl Into<String>) -> Self {
        Self::InvalidInput {
            opcode: opcode.into(),
            input: input.into(),
        }
    }

    pub fn invalid_mutation(operation: impl Into<String>) -> Self {
        Self::InvalidMutation {
            operation: operation.into(),
        }
    }
}
