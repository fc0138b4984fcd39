//! 表达式节点定义
//! 定义 RelExpr 结构体以及 memo 所使用的不透明句柄
//!
//! RelExpr 是 memo 中的不可变表达式节点：
//! - 一个算子标签加上有序的算子参数
//! - 子引用指向组（GroupId），而不是直接指向其他表达式，
//!   这样子计划可以独立于父节点被重写
//! - 驻留（intern）之后结构不再变化，结构相等的表达式共享同一个 ExprId

use std::fmt;

use serde::Serialize;

/// 组句柄，所有访问都经过 Memo 仲裁
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupId(pub(crate) usize);

/// 表达式句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExprId(pub(crate) usize);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

impl fmt::Display for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelExpr {
    op: String,
    args: Vec<String>,
    children: Vec<GroupId>,
}

impl RelExpr {
    pub fn new(
        op: impl Into<String>,
        args: Vec<String>,
        children: Vec<GroupId>,
    ) -> Self {
        Self {
            op: op.into(),
            args,
            children,
        }
    }

    /// 没有子引用的叶子表达式
    pub fn leaf(op: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(op, args, Vec::new())
    }

    pub fn op(&self) -> &str {
        &self.op
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn children(&self) -> &[GroupId] {
        &self.children
    }

    pub fn arity(&self) -> usize {
        self.children.len()
    }
}

impl fmt::Display for RelExpr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}", self.op)?;
        for arg in &self.args {
            write!(f, " '{}'", arg)?;
        }
        for child in &self.children {
            write!(f, " {}", child)?;
        }
        write!(f, ")")
    }
}
