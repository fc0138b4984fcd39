//! 规划上下文定义
//! 对搜索核心而言是不透明的只读句柄，原样传递给规则
//!
//! 核心从不检查其内容；规则可以通过参数表读取外围规划器
//! 注入的环境信息（会话参数、目录快照标识等）。

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct PlanContext {
    params: HashMap<String, String>,
}

impl PlanContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
