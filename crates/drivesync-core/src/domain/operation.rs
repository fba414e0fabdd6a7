//! Reconciliation operation labels

use std::fmt;

use serde::{Deserialize, Serialize};

/// Action required to converge one path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Both sides already agree, or the policy suppressed the change
    #[default]
    None,
    /// Create the entry on the destination
    Add,
    /// Remove the entry from the destination
    Delete,
    /// Overwrite the destination entry
    Modify,
}

impl Operation {
    /// Application order rank: None < Delete < Add < Modify
    ///
    /// Deletions free namespace before additions claim it; modifications go
    /// last since they need the target in its pre-modification form.
    pub fn precedence(&self) -> u8 {
        match self {
            Operation::None => 0,
            Operation::Delete => 1,
            Operation::Add => 2,
            Operation::Modify => 3,
        }
    }

    /// Single-glyph marker for diff output (empty for None)
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::None => "",
            Operation::Add => "+",
            Operation::Delete => "-",
            Operation::Modify => "M",
        }
    }

    /// Human-readable label for diff output (empty for None)
    pub fn label(&self) -> &'static str {
        match self {
            Operation::None => "",
            Operation::Add => "Addition",
            Operation::Delete => "Deletion",
            Operation::Modify => "Modification",
        }
    }

    /// Returns true for operations that change the destination
    pub fn is_active(&self) -> bool {
        !matches!(self, Operation::None)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::None => write!(f, "none"),
            Operation::Add => write!(f, "add"),
            Operation::Delete => write!(f, "delete"),
            Operation::Modify => write!(f, "modify"),
        }
    }
}
