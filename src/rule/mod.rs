//! 规则接口
//! 定义 Rule trait，转换逻辑的多态单元
//!
//! 每条规则声明一个模式；当驱动器为某个绑定集构造规则调用时，
//! onMatch 被触发，规则通过 ref / yield 提交零个或多个等价重写。
//! 规则从不直接构造组，也从不直接改动 memo。

pub mod rule_call;

use std::fmt;

use crate::error::Result;
use crate::matcher::Pattern;

pub use rule_call::{MemoRef, RuleCall};

pub trait Rule: fmt::Debug {
    fn name(&self) -> &'static str;

    /// 规则想要匹配的形状声明
    fn pattern(&self) -> Pattern;

    /// 规则调用是规则唯一的输出通道；
    /// 单次同步执行，不可重入，进一步的探索交还给驱动器
    fn on_match(&self, call: &mut RuleCall<'_>) -> Result<()>;
}
