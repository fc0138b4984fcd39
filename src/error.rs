//! 优化器错误定义
//! 定义 memo 搜索核心的统一错误类型

use crate::memo::{ExprId, GroupId};

#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    /// 规则向 yield 提交了裸表达式引用，而不是组引用
    #[error("rule {rule} yielded a non-group reference; rule calls require group-wrapped output")]
    NonGroupReference { rule: String },

    /// 规则调用已完成后再次使用
    #[error("rule call for {rule} already completed")]
    CallCompleted { rule: String },

    /// 规则调用被重复启动
    #[error("rule call for {rule} already started; run() is single-shot")]
    CallReentered { rule: String },

    /// 规则读取了模式未捕获的绑定变量
    #[error("rule {rule} expected binding '{name}'")]
    MissingBinding { rule: String, name: String },

    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("expression not found: {0}")]
    ExprNotFound(ExprId),

    /// 表达式的子引用指向不存在的组
    #[error("expression {op} references dangling child group {child}")]
    DanglingChild { op: String, child: GroupId },

    /// memo 不变式被破坏，优化会话无法继续
    #[error("memo invariant violated: {0}")]
    CorruptMemo(String),
}

pub type Result<T> = std::result::Result<T, OptimizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OptimizerError::NonGroupReference {
            rule: "TestRule".to_string(),
        };
        assert!(err.to_string().contains("non-group reference"));
        assert!(err.to_string().contains("TestRule"));
    }

    #[test]
    fn test_corrupt_memo_display() {
        let err = OptimizerError::CorruptMemo("duplicate insertion".to_string());
        assert!(err.to_string().contains("memo invariant violated"));
    }
}
