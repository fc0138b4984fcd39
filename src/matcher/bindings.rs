//! 绑定集定义
//! 定义 Bindings 结构体，保存一次成功匹配产出的变量绑定
//!
//! 每次成功匹配都会产出一个全新的绑定集，规则只读；
//! 绑定集之间完全独立，规则调用结束后即可丢弃。

use std::collections::HashMap;

use crate::memo::{ExprId, GroupId};

/// 绑定到的引用：单个表达式或整个组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundRef {
    Expr(ExprId),
    Group(GroupId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    map: HashMap<String, BoundRef>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind(&mut self, name: impl Into<String>, value: BoundRef) {
        self.map.insert(name.into(), value);
    }

    pub(crate) fn merge(&mut self, other: &Bindings) {
        for (name, value) in &other.map {
            self.map.insert(name.clone(), *value);
        }
    }

    pub fn get(&self, name: &str) -> Option<BoundRef> {
        self.map.get(name).copied()
    }

    pub fn get_expr(&self, name: &str) -> Option<ExprId> {
        match self.map.get(name) {
            Some(BoundRef::Expr(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn get_group(&self, name: &str) -> Option<GroupId> {
        match self.map.get(name) {
            Some(BoundRef::Group(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }
}
