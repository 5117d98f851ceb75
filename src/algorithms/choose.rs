use crate::config::ChooserPolicy;
use crate::node::BranchEntry;
use crate::rectangle::Rectangle;

/// 选择子树
///
/// 1. 快速包含选择（按策略）：已有子节点矩形包含新矩形时直接选中它
/// 2. 否则选择扩大面积最小的子节点，相同时选面积较小的
pub(crate) fn choose_subtree<T, const D: usize>(
    entries: &[BranchEntry<T, D>],
    rect: &Rectangle<D>,
    policy: ChooserPolicy,
) -> usize {
    let contained = match policy {
        ChooserPolicy::Disabled => None,
        ChooserPolicy::FastFirst => entries.iter().position(|entry| entry.rect.contains(rect)),
        ChooserPolicy::FastSmallest => smallest_containing(entries, rect),
    };
    contained.unwrap_or_else(|| choose_least_enlargement(entries, rect))
}

fn smallest_containing<T, const D: usize>(
    entries: &[BranchEntry<T, D>],
    rect: &Rectangle<D>,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, entry) in entries.iter().enumerate() {
        if !entry.rect.contains(rect) {
            continue;
        }
        let area = entry.rect.area();
        match best {
            Some((_, best_area)) if !(area < best_area) => {}
            _ => best = Some((i, area)),
        }
    }
    best.map(|(i, _)| i)
}

/// 最小扩大面积选择
pub(crate) fn choose_least_enlargement<T, const D: usize>(
    entries: &[BranchEntry<T, D>],
    rect: &Rectangle<D>,
) -> usize {
    let mut best_index = 0;
    let mut min_enlargement = f64::INFINITY;
    let mut min_area = f64::INFINITY;

    for (i, entry) in entries.iter().enumerate() {
        let area = entry.rect.area();
        let enlargement = entry.rect.enlargement(rect);

        if i == 0
            || enlargement < min_enlargement
            || (!(enlargement > min_enlargement) && area < min_area)
        {
            best_index = i;
            min_enlargement = enlargement;
            min_area = area;
        }
    }

    best_index
}
