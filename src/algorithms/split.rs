use crate::allocator::NodeAllocator;
use crate::error::AllocError;
use crate::node::{HasMbr, Node, sort_by_axis_max, sort_by_axis_min};
use crate::rectangle::Rectangle;
use tracing::trace;

/// 分裂后每侧至少保留的条目数
const SPLIT_FLOOR: usize = 2;

/// 节点分裂 - 最长轴贴边分裂(largest-axis edge-snap)
///
/// 沿 `bounds` 跨度最大的轴，把每个条目分给离它更近的那条边：
/// 离最小边更近（或距离相等）的留在原节点，其余移入新的兄弟节点。
/// 这是一次单遍划分，只保证两侧各有至少两个条目，不保证满足最小占用率。
///
/// 兄弟节点的存储从分配器申请；申请失败时原节点保持不变。
pub(crate) fn split_node<T, const D: usize, A: NodeAllocator>(
    allocator: &mut A,
    capacity: usize,
    bounds: &Rectangle<D>,
    node: &mut Node<T, D>,
) -> Result<Node<T, D>, AllocError> {
    let axis = bounds.largest_axis();
    let sibling = match node {
        Node::Leaf(left) => {
            let mut right = allocator.allocate(capacity)?;
            partition(left, &mut right, bounds, axis);
            Node::Leaf(right)
        }
        Node::Branch(left) => {
            let mut right = allocator.allocate(capacity)?;
            partition(left, &mut right, bounds, axis);
            Node::Branch(right)
        }
    };
    trace!(axis, left = node.len(), right = sibling.len(), "split node");
    Ok(sibling)
}

fn partition<const D: usize, E: HasMbr<D>>(
    left: &mut Vec<E>,
    right: &mut Vec<E>,
    bounds: &Rectangle<D>,
    axis: usize,
) {
    let mut i = 0;
    while i < left.len() {
        let rect = left[i].mbr();
        let min_dist = rect.min[axis] - bounds.min[axis];
        let max_dist = bounds.max[axis] - rect.max[axis];
        if min_dist <= max_dist {
            i += 1;
        } else {
            right.push(left.swap_remove(i));
        }
    }

    // 欠载修复：从另一侧把最贴近本侧边界的条目移回来
    if left.len() < SPLIT_FLOOR {
        sort_by_axis_min(right, axis);
        right.reverse();
        while left.len() < SPLIT_FLOOR {
            match right.pop() {
                Some(entry) => left.push(entry),
                None => break,
            }
        }
    } else if right.len() < SPLIT_FLOOR {
        sort_by_axis_max(left, axis);
        while right.len() < SPLIT_FLOOR {
            match left.pop() {
                Some(entry) => right.push(entry),
                None => break,
            }
        }
    }

    sort_by_axis_min(left, 0);
    sort_by_axis_min(right, 0);
}
