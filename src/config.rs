//! 探索配置和统计
//! 定义搜索引擎的配置参数和统计信息收集

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// 单次探索的最大轮数
    pub max_rounds: usize,
    /// memo 中允许的最大表达式数量，超过则停止探索
    pub max_expressions: usize,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            max_rounds: 16,
            max_expressions: 4096,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExplorationStats {
    pub rules_fired: usize,
    pub bindings_matched: usize,
    pub expressions_added: usize,
    pub rounds: usize,
}

impl ExplorationStats {
    pub fn record_rule_fired(&mut self, bindings: usize, new_expressions: usize) {
        self.rules_fired += 1;
        self.bindings_matched += bindings;
        self.expressions_added += new_expressions;
    }
}
