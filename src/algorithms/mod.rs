// R-tree算法模块
//
// 每个子模块实现一类算法：
// - choose: 插入时的子树选择
// - insert: 插入与树的增长
// - split: 节点分裂
// - delete: 删除、下溢节点移除与根节点折叠
// - search: 范围查询
// - debug: 结构检查与可视化导出

pub mod choose;
pub mod debug;
pub mod delete;
pub mod insert;
pub mod search;
pub mod split;
