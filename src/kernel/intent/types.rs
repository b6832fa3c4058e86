use serde::{Deserialize, Serialize};

/// Reading of an answer at the confirmation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confirmation {
    /// Contains "yes". Wins over "no" when both appear.
    Affirmative,
    Negative,
    /// Neither word. The confirm prompt is repeated.
    Unrecognized,
}
