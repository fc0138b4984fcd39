//! memo 数据结构
//! 定义 Memo 结构体，管理全部优化组及全局去重索引
//!
//! Memo 是搜索引擎唯一的可变共享状态：
//! - 以 arena 方式持有所有 Group 和 RelExpr，句柄为不透明整数，
//!   因此共享子计划和递归形状不会产生所有权环
//! - 结构驻留：结构相等的表达式共享同一个 ExprId
//! - 全局"已知表达式"索引：containsInMemo 语义是 memo 级别的，
//!   不是组级别的，不同组上的规则独立推导出同一重写时必须去重
//! - 检查加插入是唯一的写路径，&mut self 保证其原子性；
//!   跨线程交错规则调用时用 SharedMemo 串行化整个合并段

pub mod expr;
pub mod group;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use crate::error::{OptimizerError, Result};

pub use expr::{ExprId, GroupId, RelExpr};
pub use group::Group;

/// 跨线程共享的 memo；锁的粒度覆盖整个"检查-插入"临界区
pub type SharedMemo = Arc<Mutex<Memo>>;

/// 初始翻译步骤交付的算子树，每个节点落入一个独立的组
#[derive(Debug, Clone)]
pub struct ExprTree {
    pub op: String,
    pub args: Vec<String>,
    pub children: Vec<ExprTree>,
}

impl ExprTree {
    pub fn new(op: impl Into<String>, args: Vec<String>, children: Vec<ExprTree>) -> Self {
        Self {
            op: op.into(),
            args,
            children,
        }
    }

    pub fn leaf(op: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(op, args, Vec::new())
    }
}

#[derive(Debug, Default)]
pub struct Memo {
    groups: Vec<Group>,
    exprs: Vec<RelExpr>,
    /// 结构驻留表：RelExpr -> ExprId
    interned: HashMap<RelExpr, ExprId>,
    /// 全局索引：已知表达式 -> 首次插入它的组
    known: HashMap<ExprId, GroupId>,
    root: Option<GroupId>,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新建一个属于 memo 本体的空组
    pub fn add_group(&mut self) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(Group::new(id, true));
        id
    }

    /// 新建一个分离的单成员组，ref() 的底层实现；
    /// 成员在被合并进 memo 之前不进入全局索引
    pub(crate) fn detached_singleton(&mut self, expr: ExprId) -> Result<GroupId> {
        self.expr(expr)?;
        let id = GroupId(self.groups.len());
        let mut group = Group::new(id, false);
        group.add_member(expr);
        self.groups.push(group);
        Ok(id)
    }

    pub fn set_root(&mut self, group: GroupId) -> Result<()> {
        if let Some(old) = self.root {
            self.group_mut(old)?.set_root_group(false);
        }
        self.group_mut(group)?.set_root_group(true);
        self.root = Some(group);
        Ok(())
    }

    pub fn root(&self) -> Option<GroupId> {
        self.root
    }

    pub fn group(&self, id: GroupId) -> Result<&Group> {
        self.groups.get(id.0).ok_or(OptimizerError::GroupNotFound(id))
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> Result<&mut Group> {
        self.groups
            .get_mut(id.0)
            .ok_or(OptimizerError::GroupNotFound(id))
    }

    pub fn expr(&self, id: ExprId) -> Result<&RelExpr> {
        self.exprs.get(id.0).ok_or(OptimizerError::ExprNotFound(id))
    }

    /// 结构驻留一个表达式；子引用必须全部解析到已存在的组
    pub fn intern(&mut self, expr: RelExpr) -> Result<ExprId> {
        for &child in expr.children() {
            if child.0 >= self.groups.len() {
                return Err(OptimizerError::DanglingChild {
                    op: expr.op().to_string(),
                    child,
                });
            }
        }
        if let Some(&id) = self.interned.get(&expr) {
            return Ok(id);
        }
        let id = ExprId(self.exprs.len());
        self.exprs.push(expr.clone());
        self.interned.insert(expr, id);
        Ok(id)
    }

    /// memo 级别的"是否已知"检查；驻留保证结构重复共享句柄，
    /// 因此索引查找等价于结构查找
    pub fn contains_in_memo(&self, expr: ExprId) -> bool {
        self.known.contains_key(&expr)
    }

    /// 首次收纳该表达式的组
    pub fn home_group(&self, expr: ExprId) -> Option<GroupId> {
        self.known.get(&expr).copied()
    }

    /// 把表达式加入目标组并登记到全局索引
    ///
    /// 前置条件：调用方已经通过 contains_in_memo 确认不是重复；
    /// 违反前置条件说明合并协议被绕过，memo 已不可信。
    pub fn insert(&mut self, group: GroupId, expr: ExprId) -> Result<()> {
        self.expr(expr)?;
        if !self.group(group)?.is_in_memo() {
            return Err(OptimizerError::CorruptMemo(format!(
                "insert target {} is a detached group",
                group
            )));
        }
        if self.known.contains_key(&expr) {
            return Err(OptimizerError::CorruptMemo(format!(
                "duplicate insertion of {} bypassed the containment check",
                expr
            )));
        }
        log::trace!("表达式 {} 插入组 {}", expr, group);
        let target = self.group_mut(group)?;
        target.add_member(expr);
        target.set_unexplored();
        self.known.insert(expr, group);
        self.adopt_children(expr);
        Ok(())
    }

    /// 新插入的表达式可能引用 ref() 产生的分离子组；
    /// 它们从根可达之后就是 memo 的一部分，必须补登全局索引，
    /// 否则索引和组成员会出现分歧
    fn adopt_children(&mut self, expr: ExprId) {
        let children = self.exprs[expr.0].children().to_vec();
        for child in children {
            if self.groups[child.0].is_in_memo() {
                continue;
            }
            self.groups[child.0].set_in_memo();
            let members = self.groups[child.0].members().to_vec();
            for member in members {
                if !self.known.contains_key(&member) {
                    self.known.insert(member, child);
                    self.adopt_children(member);
                }
            }
        }
    }

    /// 从初始算子树构建 memo，每个节点一个组，返回顶层组
    pub fn seed(&mut self, tree: &ExprTree) -> Result<GroupId> {
        let mut children = Vec::with_capacity(tree.children.len());
        for child in &tree.children {
            children.push(self.seed(child)?);
        }
        let expr = self.intern(RelExpr::new(tree.op.clone(), tree.args.clone(), children))?;
        // 共享子计划去重：同一结构复用首次收纳它的组
        if let Some(group) = self.home_group(expr) {
            return Ok(group);
        }
        let group = self.add_group();
        self.insert(group, expr)?;
        Ok(group)
    }

    /// memo 本体的组快照，供驱动器迭代；不含未合并的分离组
    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups
            .iter()
            .filter(|g| g.is_in_memo())
            .map(|g| g.id())
            .collect()
    }

    /// 物理存在于某个组中的表达式数量
    pub fn num_exprs(&self) -> usize {
        self.known.len()
    }

    pub fn num_groups(&self) -> usize {
        self.groups.iter().filter(|g| g.is_in_memo()).count()
    }

    /// 诊断用的 memo 快照
    pub fn dump(&self) -> serde_json::Value {
        let groups: Vec<serde_json::Value> = self
            .groups
            .iter()
            .filter(|g| g.is_in_memo())
            .map(|g| {
                let members: Vec<String> = g
                    .members()
                    .iter()
                    .map(|&e| self.exprs[e.0].to_string())
                    .collect();
                json!({
                    "id": g.id(),
                    "root": g.is_root_group(),
                    "members": members,
                })
            })
            .collect();
        json!({
            "root": self.root,
            "groups": groups,
            "expressions": self.num_exprs(),
        })
    }

    pub fn into_shared(self) -> SharedMemo {
        Arc::new(Mutex::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_over_scan(memo: &mut Memo) -> (GroupId, GroupId) {
        let scan_group = memo.seed(&ExprTree::leaf("Scan", vec!["t".to_string()])).expect("seed scan");
        let expr = memo
            .intern(RelExpr::new(
                "Filter",
                vec!["x > 1".to_string()],
                vec![scan_group],
            ))
            .expect("intern filter");
        let group = memo.add_group();
        memo.insert(group, expr).expect("insert filter");
        (group, scan_group)
    }

    #[test]
    fn test_intern_is_structural() {
        let mut memo = Memo::new();
        let a = memo.intern(RelExpr::leaf("Scan", vec!["t".to_string()])).expect("intern");
        let b = memo.intern(RelExpr::leaf("Scan", vec!["t".to_string()])).expect("intern");
        let c = memo.intern(RelExpr::leaf("Scan", vec!["u".to_string()])).expect("intern");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_dangling_child_is_rejected() {
        let mut memo = Memo::new();
        let result = memo.intern(RelExpr::new("Filter", vec![], vec![GroupId(9)]));
        assert!(matches!(
            result,
            Err(OptimizerError::DanglingChild { child: GroupId(9), .. })
        ));
    }

    #[test]
    fn test_duplicate_insert_is_corrupt_memo() {
        let mut memo = Memo::new();
        let expr = memo.intern(RelExpr::leaf("Scan", vec![])).expect("intern");
        let g1 = memo.add_group();
        let g2 = memo.add_group();
        memo.insert(g1, expr).expect("first insert");
        let result = memo.insert(g2, expr);
        assert!(matches!(result, Err(OptimizerError::CorruptMemo(_))));
    }

    #[test]
    fn test_containment_is_memo_global() {
        let mut memo = Memo::new();
        let expr = memo.intern(RelExpr::leaf("Scan", vec![])).expect("intern");
        let g1 = memo.add_group();
        memo.insert(g1, expr).expect("insert");
        // 在任何组里查询都必须命中
        assert!(memo.contains_in_memo(expr));
    }

    #[test]
    fn test_detached_singleton_not_in_index() {
        let mut memo = Memo::new();
        let expr = memo.intern(RelExpr::leaf("Scan", vec![])).expect("intern");
        let detached = memo.detached_singleton(expr).expect("detached");
        assert!(!memo.contains_in_memo(expr));
        assert!(!memo.group(detached).expect("group").is_in_memo());
        assert_eq!(memo.group(detached).expect("group").members(), &[expr]);
    }

    #[test]
    fn test_insert_adopts_detached_children() {
        let mut memo = Memo::new();
        let leaf = memo.intern(RelExpr::leaf("Scan", vec![])).expect("intern leaf");
        let detached = memo.detached_singleton(leaf).expect("detached");
        let parent = memo
            .intern(RelExpr::new("Filter", vec![], vec![detached]))
            .expect("intern parent");
        let group = memo.add_group();
        memo.insert(group, parent).expect("insert");
        // 分离子组随插入一起并入 memo，索引与成员保持一致
        assert!(memo.group(detached).expect("group").is_in_memo());
        assert!(memo.contains_in_memo(leaf));
        assert!(memo.contains_in_memo(parent));
    }

    #[test]
    fn test_insert_into_detached_group_fails() {
        let mut memo = Memo::new();
        let a = memo.intern(RelExpr::leaf("Scan", vec![])).expect("intern");
        let b = memo.intern(RelExpr::leaf("Values", vec![])).expect("intern");
        let detached = memo.detached_singleton(a).expect("detached");
        assert!(matches!(
            memo.insert(detached, b),
            Err(OptimizerError::CorruptMemo(_))
        ));
    }

    #[test]
    fn test_seed_builds_one_group_per_node() {
        let mut memo = Memo::new();
        let tree = ExprTree::new(
            "Filter",
            vec!["x > 1".to_string()],
            vec![ExprTree::leaf("Scan", vec!["t".to_string()])],
        );
        let root = memo.seed(&tree).expect("seed");
        memo.set_root(root).expect("set root");
        assert_eq!(memo.num_groups(), 2);
        assert_eq!(memo.num_exprs(), 2);
        assert_eq!(memo.root(), Some(root));
        assert!(memo.group(root).expect("group").is_root_group());
    }

    #[test]
    fn test_seed_shares_identical_subtrees() {
        let mut memo = Memo::new();
        let scan = ExprTree::leaf("Scan", vec!["t".to_string()]);
        let tree = ExprTree::new("Join", vec![], vec![scan.clone(), scan]);
        let root = memo.seed(&tree).expect("seed");
        let join = memo.group(root).expect("group").members()[0];
        let children = memo.expr(join).expect("expr").children().to_vec();
        // 两个相同的子树共享同一个组，memo 呈 DAG 形
        assert_eq!(children[0], children[1]);
        assert_eq!(memo.num_groups(), 2);
    }

    #[test]
    fn test_insert_marks_group_unexplored() {
        let mut memo = Memo::new();
        let (group, scan_group) = filter_over_scan(&mut memo);
        memo.group_mut(group).expect("group").set_explored("SomeRule");
        let other = memo
            .intern(RelExpr::new("Project", vec![], vec![scan_group]))
            .expect("intern");
        memo.insert(group, other).expect("insert");
        assert!(!memo.group(group).expect("group").is_explored("SomeRule"));
    }

    #[test]
    fn test_dump_contains_groups() {
        let mut memo = Memo::new();
        let (group, _) = filter_over_scan(&mut memo);
        memo.set_root(group).expect("set root");
        let dump = memo.dump();
        assert_eq!(dump["expressions"], 2);
        assert!(dump["groups"].as_array().expect("array").len() >= 2);
    }
}
