//! 模式定义与匹配
//! 定义 Pattern 结构体，规则用它声明自己想要看到的子形状
//!
//! 匹配按组进行：模式根节点逐一尝试组内成员表达式，
//! 子模式按位置递归下探到子组，产出零个或多个绑定集。
//! 匹配只读，不会改动 memo；产出的序列有限、可重启。

use crate::error::Result;
use crate::memo::{ExprId, GroupId, Memo};

use super::bindings::{Bindings, BoundRef};

#[derive(Debug, Clone)]
pub enum MatchNode {
    /// 匹配指定算子
    Single(&'static str),
    /// 匹配候选算子之一
    Multi(Vec<&'static str>),
    /// 匹配任意成员表达式
    Any,
    /// 整组匹配：绑定子组本身，不枚举其成员
    AnyGroup,
}

impl MatchNode {
    pub fn matches(&self, op: &str) -> bool {
        match self {
            MatchNode::Single(name) => *name == op,
            MatchNode::Multi(names) => names.contains(&op),
            MatchNode::Any => true,
            MatchNode::AnyGroup => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pattern {
    node: MatchNode,
    bind: Option<String>,
    children: Vec<Pattern>,
}

impl Pattern {
    pub fn single(name: &'static str) -> Self {
        Self {
            node: MatchNode::Single(name),
            bind: None,
            children: Vec::new(),
        }
    }

    pub fn multi(names: Vec<&'static str>) -> Self {
        Self {
            node: MatchNode::Multi(names),
            bind: None,
            children: Vec::new(),
        }
    }

    pub fn any() -> Self {
        Self {
            node: MatchNode::Any,
            bind: None,
            children: Vec::new(),
        }
    }

    /// 把子组作为整体捕获的叶子模式
    pub fn any_group() -> Self {
        Self {
            node: MatchNode::AnyGroup,
            bind: None,
            children: Vec::new(),
        }
    }

    pub fn bind(mut self, name: impl Into<String>) -> Self {
        self.bind = Some(name.into());
        self
    }

    pub fn with_child(mut self, child: Pattern) -> Self {
        self.children.push(child);
        self
    }

    /// 对一个组产出全部绑定集
    ///
    /// 序列在返回前已经完整物化，之后的规则调用（变更阶段）
    /// 不会再回头触碰匹配状态；重新调用即可重启。
    pub fn match_group(&self, memo: &Memo, group: GroupId) -> Result<BindingSeq> {
        let sets = self.bindings_for_group(memo, group)?;
        Ok(BindingSeq {
            inner: sets.into_iter(),
        })
    }

    fn bindings_for_group(&self, memo: &Memo, group: GroupId) -> Result<Vec<Bindings>> {
        if matches!(self.node, MatchNode::AnyGroup) {
            let mut bindings = Bindings::new();
            memo.group(group)?;
            if let Some(name) = &self.bind {
                bindings.bind(name.clone(), BoundRef::Group(group));
            }
            return Ok(vec![bindings]);
        }
        let members = memo.group(group)?.members().to_vec();
        let mut out = Vec::new();
        for member in members {
            out.extend(self.bindings_for_expr(memo, member)?);
        }
        Ok(out)
    }

    fn bindings_for_expr(&self, memo: &Memo, expr: ExprId) -> Result<Vec<Bindings>> {
        let node = memo.expr(expr)?;
        if !self.node.matches(node.op()) {
            return Ok(Vec::new());
        }
        if !self.children.is_empty() && node.arity() != self.children.len() {
            return Ok(Vec::new());
        }

        let mut combos = vec![Bindings::new()];
        let child_groups = node.children().to_vec();
        for (pattern, &child_group) in self.children.iter().zip(child_groups.iter()) {
            let child_sets = pattern.bindings_for_group(memo, child_group)?;
            if child_sets.is_empty() {
                return Ok(Vec::new());
            }
            let mut next = Vec::with_capacity(combos.len() * child_sets.len());
            for combo in &combos {
                for child_set in &child_sets {
                    let mut merged = combo.clone();
                    merged.merge(child_set);
                    next.push(merged);
                }
            }
            combos = next;
        }

        if let Some(name) = &self.bind {
            for combo in &mut combos {
                combo.bind(name.clone(), BoundRef::Expr(expr));
            }
        }
        Ok(combos)
    }
}

/// 有限、可重启的绑定集序列
#[derive(Debug)]
pub struct BindingSeq {
    inner: std::vec::IntoIter<Bindings>,
}

impl Iterator for BindingSeq {
    type Item = Bindings;

    fn next(&mut self) -> Option<Bindings> {
        self.inner.next()
    }
}

impl ExactSizeIterator for BindingSeq {
    fn len(&self) -> usize {
        self.inner.len()
    }
}
