//! 探索驱动器
//! 决定在哪些 (组, 规则) 对上以什么顺序触发规则
//!
//! 每一轮对 memo 组做快照，为每条规则的每个绑定集构造一次
//! 规则调用；产出的新表达式会清除所在组的已探索标记，
//! 从而进入下一轮。到达不动点或配置上限后停止。
//! 驱动器只通过规则调用的 yield 通道改动 memo。

use crate::config::{ExplorationConfig, ExplorationStats};
use crate::context::PlanContext;
use crate::error::Result;
use crate::matcher::Bindings;
use crate::memo::Memo;
use crate::rule::{Rule, RuleCall};

#[derive(Debug, Default)]
pub struct Explorer {
    rules: Vec<Box<dyn Rule>>,
    config: ExplorationConfig,
}

impl Explorer {
    pub fn new() -> Self {
        Self::with_config(ExplorationConfig::default())
    }

    pub fn with_config(config: ExplorationConfig) -> Self {
        Self {
            rules: Vec::new(),
            config,
        }
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// 探索到不动点或配置上限
    pub fn explore(&self, ctx: &PlanContext, memo: &mut Memo) -> Result<ExplorationStats> {
        let mut stats = ExplorationStats::default();

        for round in 0..self.config.max_rounds {
            stats.rounds = round + 1;
            let mut changed = false;

            let groups = memo.group_ids();
            for group in groups {
                for rule in &self.rules {
                    if memo.group(group)?.is_explored(rule.name()) {
                        continue;
                    }
                    // 先标记再触发：本次插入会清除标记，下一轮自动重试
                    memo.group_mut(group)?.set_explored(rule.name());

                    // 变更阶段开始前拉取全部绑定
                    let sets: Vec<Bindings> =
                        rule.pattern().match_group(memo, group)?.collect();
                    if sets.is_empty() {
                        continue;
                    }
                    let bindings_matched = sets.len();
                    let mut produced = 0;
                    for bindings in sets {
                        let mut call =
                            RuleCall::new(ctx, rule.as_ref(), memo, group, bindings);
                        call.run()?;
                        produced += call.new_expressions().len();
                    }
                    stats.record_rule_fired(bindings_matched, produced);
                    if produced > 0 {
                        changed = true;
                    }

                    if memo.num_exprs() >= self.config.max_expressions {
                        log::warn!(
                            "memo 表达式数量达到上限 {}，提前停止探索",
                            self.config.max_expressions
                        );
                        return Ok(stats);
                    }
                }
            }

            if !changed {
                break;
            }
        }

        log::debug!(
            "探索结束：{} 轮，{} 次规则触发，{} 个新表达式",
            stats.rounds,
            stats.rules_fired,
            stats.expressions_added
        );
        Ok(stats)
    }
}
