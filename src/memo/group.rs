//! 优化组定义
//! 定义 Group 结构体，管理一组语义等价的表达式
//!
//! Group 是 memo 的基本构件：
//! - 成员列表单调增长：表达式一旦插入就不会被移除，
//!   避免已触发的规则依赖被撤销
//! - 追踪已探索的规则，避免重复应用
//! - 预留 winner 槽位，存放最终选出的物理表达式

use std::collections::HashSet;

use super::expr::{ExprId, GroupId};

#[derive(Debug, Clone)]
pub struct Group {
    id: GroupId,
    /// 成员表达式，保持插入顺序
    members: Vec<ExprId>,
    explored_rules: HashSet<String>,
    root_group: bool,
    /// 是否属于 memo 本体；由 ref() 创建的分离组在被合并前为 false
    in_memo: bool,
    winner: Option<ExprId>,
}

impl Group {
    pub(crate) fn new(id: GroupId, in_memo: bool) -> Self {
        Self {
            id,
            members: Vec::new(),
            explored_rules: HashSet::new(),
            root_group: false,
            in_memo,
            winner: None,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn members(&self) -> &[ExprId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn add_member(&mut self, expr: ExprId) {
        if !self.members.contains(&expr) {
            self.members.push(expr);
        }
    }

    pub fn is_explored(&self, rule_name: &str) -> bool {
        self.explored_rules.contains(rule_name)
    }

    pub fn set_explored(&mut self, rule_name: &str) {
        self.explored_rules.insert(rule_name.to_string());
    }

    /// 新成员加入后需要重新探索
    pub fn set_unexplored(&mut self) {
        self.explored_rules.clear();
    }

    pub fn is_root_group(&self) -> bool {
        self.root_group
    }

    pub(crate) fn set_root_group(&mut self, root_group: bool) {
        self.root_group = root_group;
    }

    pub fn is_in_memo(&self) -> bool {
        self.in_memo
    }

    pub(crate) fn set_in_memo(&mut self) {
        self.in_memo = true;
    }

    pub fn winner(&self) -> Option<ExprId> {
        self.winner
    }

    pub fn set_winner(&mut self, winner: ExprId) {
        self.winner = Some(winner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_is_deduplicated_and_ordered() {
        let mut group = Group::new(GroupId(0), true);
        group.add_member(ExprId(1));
        group.add_member(ExprId(2));
        group.add_member(ExprId(1));
        assert_eq!(group.members(), &[ExprId(1), ExprId(2)]);
    }

    #[test]
    fn test_explored_rules() {
        let mut group = Group::new(GroupId(0), true);
        assert!(!group.is_explored("SomeRule"));
        group.set_explored("SomeRule");
        assert!(group.is_explored("SomeRule"));
        group.set_unexplored();
        assert!(!group.is_explored("SomeRule"));
    }

    #[test]
    fn test_winner_slot() {
        let mut group = Group::new(GroupId(0), true);
        assert!(group.winner().is_none());
        group.set_winner(ExprId(7));
        assert_eq!(group.winner(), Some(ExprId(7)));
    }
}
