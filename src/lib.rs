//! Cascades-style memo search core for a cost-based query optimizer
//!
//! This crate provides the rule-driven exploration engine at the heart of a
//! Cascades-style planner: a deduplicating memo of expression groups, a
//! pattern matcher producing binding sets, the rule-call merge protocol that
//! folds proposed rewrites back into the memo, and a bounded fixpoint driver.

pub mod config;
pub mod context;
pub mod error;
pub mod explore;
pub mod matcher;
pub mod memo;
pub mod rule;

pub use config::{ExplorationConfig, ExplorationStats};
pub use context::PlanContext;
pub use error::{OptimizerError, Result};
pub use explore::Explorer;
pub use matcher::{BindingSeq, Bindings, BoundRef, MatchNode, Pattern};
pub use memo::{ExprId, ExprTree, Group, GroupId, Memo, RelExpr, SharedMemo};
pub use rule::{MemoRef, Rule, RuleCall};
