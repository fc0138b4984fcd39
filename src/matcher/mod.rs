//! 模式匹配器
//! 对组内成员做模式匹配，产出供规则消费的绑定集

pub mod bindings;
pub mod pattern;

pub use bindings::{Bindings, BoundRef};
pub use pattern::{BindingSeq, MatchNode, Pattern};
