//! 规则调用定义
//! 定义 RuleCall 结构体，单次规则触发的作用域上下文与合并协议
//!
//! RuleCall 的生命周期恰好覆盖一次规则触发，不跨规则、不跨组复用：
//! - 独占持有新表达式暂存区；根组和 memo 只是借用
//! - yield 是把规则产物折叠进 memo 的唯一入口：
//!   自身根组视为"无变化"；组引用逐成员做全局去重后插入根组；
//!   裸表达式引用是规则作者的契约违规，立即报错且不留半插入状态
//! - 状态机 Created -> Running -> Completed，完成后暂存区只读

use crate::context::PlanContext;
use crate::error::{OptimizerError, Result};
use crate::matcher::Bindings;
use crate::memo::{ExprId, GroupId, Memo, RelExpr};

use super::Rule;

/// 规则可以向 yield 提交的引用种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoRef {
    Group(GroupId),
    Expr(ExprId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallState {
    Created,
    Running,
    Completed,
}

#[derive(Debug)]
pub struct RuleCall<'a> {
    rule: &'a dyn Rule,
    memo: &'a mut Memo,
    root: GroupId,
    bindings: Bindings,
    context: &'a PlanContext,
    new_exprs: Vec<ExprId>,
    state: CallState,
}

impl<'a> RuleCall<'a> {
    pub fn new(
        context: &'a PlanContext,
        rule: &'a dyn Rule,
        memo: &'a mut Memo,
        root: GroupId,
        bindings: Bindings,
    ) -> Self {
        Self {
            rule,
            memo,
            root,
            bindings,
            context,
            new_exprs: Vec::new(),
            state: CallState::Created,
        }
    }

    /// 触发规则的匹配重写逻辑；单次同步执行
    pub fn run(&mut self) -> Result<()> {
        match self.state {
            CallState::Created => {}
            CallState::Running => {
                return Err(OptimizerError::CallReentered {
                    rule: self.rule.name().to_string(),
                })
            }
            CallState::Completed => {
                return Err(OptimizerError::CallCompleted {
                    rule: self.rule.name().to_string(),
                })
            }
        }
        self.state = CallState::Running;
        log::debug!("规则 {} 在组 {} 上触发", self.rule.name(), self.root);
        let rule = self.rule;
        let result = rule.on_match(self);
        self.state = CallState::Completed;
        if result.is_ok() {
            log::debug!(
                "规则 {} 完成，产出 {} 个新表达式",
                self.rule.name(),
                self.new_exprs.len()
            );
        }
        result
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    pub fn context(&self) -> &PlanContext {
        self.context
    }

    pub fn root(&self) -> GroupId {
        self.root
    }

    /// 供规则读取匹配到的表达式结构
    pub fn memo(&self) -> &Memo {
        self.memo
    }

    pub fn expr_binding(&self, name: &str) -> Result<ExprId> {
        self.bindings
            .get_expr(name)
            .ok_or_else(|| OptimizerError::MissingBinding {
                rule: self.rule.name().to_string(),
                name: name.to_string(),
            })
    }

    pub fn group_binding(&self, name: &str) -> Result<GroupId> {
        self.bindings
            .get_group(name)
            .ok_or_else(|| OptimizerError::MissingBinding {
                rule: self.rule.name().to_string(),
                name: name.to_string(),
            })
    }

    /// 把新建表达式包装成单成员组，规则侧唯一合法的组构造方式
    pub fn ref_expr(&mut self, expr: RelExpr) -> Result<MemoRef> {
        if self.state == CallState::Completed {
            return Err(OptimizerError::CallCompleted {
                rule: self.rule.name().to_string(),
            });
        }
        let id = self.memo.intern(expr)?;
        let group = self.memo.detached_singleton(id)?;
        Ok(MemoRef::Group(group))
    }

    /// 合并协议：每提交一个候选重写调用一次
    pub fn yield_ref(&mut self, candidate: MemoRef) -> Result<()> {
        if self.state == CallState::Completed {
            return Err(OptimizerError::CallCompleted {
                rule: self.rule.name().to_string(),
            });
        }
        match candidate {
            // 提交自身根组等于宣布"无变化"，不是错误
            MemoRef::Group(group) if group == self.root => Ok(()),
            MemoRef::Group(group) => {
                let members = self.memo.group(group)?.members().to_vec();
                for member in members {
                    if !self.memo.contains_in_memo(member) {
                        self.memo.insert(self.root, member)?;
                        self.new_exprs.push(member);
                    }
                }
                Ok(())
            }
            MemoRef::Expr(_) => Err(OptimizerError::NonGroupReference {
                rule: self.rule.name().to_string(),
            }),
        }
    }

    /// 本次调用新发现的表达式，驱动器据此调度后续探索
    pub fn new_expressions(&self) -> &[ExprId] {
        &self.new_exprs
    }

    pub fn into_new_expressions(self) -> Vec<ExprId> {
        self.new_exprs
    }
}
