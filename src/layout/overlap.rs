use super::types::VirtualItem;

struct OpenGroup {
    items: Vec<VirtualItem>,
    min_left: f64,
    max_right: f64,
}

impl OpenGroup {
    fn intersects(&self, left: f64, right: f64) -> bool {
        left < self.max_right && right > self.min_left
    }

    fn absorb(&mut self, other: OpenGroup) {
        self.min_left = self.min_left.min(other.min_left);
        self.max_right = self.max_right.max(other.max_right);
        self.items.extend(other.items);
    }
}

/// Partitions items into groups whose horizontal spans are connected through
/// pairwise overlap (A-B and B-C puts A, B and C together).
///
/// Groups are returned in order of their leftmost item and each group is
/// sorted by `x`. Items that overlap nothing are left out entirely.
pub fn group_overlapping(items: &[VirtualItem]) -> Vec<Vec<VirtualItem>> {
    if items.len() < 2 {
        return Vec::new();
    }

    let mut sorted: Vec<&VirtualItem> = items.iter().collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut groups: Vec<OpenGroup> = Vec::new();
    for item in sorted {
        let left = item.x;
        let right = item.right();
        let hits: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, group)| group.intersects(left, right))
            .map(|(idx, _)| idx)
            .collect();

        let Some((&target, rest)) = hits.split_first() else {
            groups.push(OpenGroup {
                items: vec![item.clone()],
                min_left: left,
                max_right: right,
            });
            continue;
        };

        {
            let group = &mut groups[target];
            group.items.push(item.clone());
            group.min_left = group.min_left.min(left);
            group.max_right = group.max_right.max(right);
        }
        // Later indices first so earlier ones stay valid while removing.
        for &idx in rest.iter().rev() {
            let merged = groups.remove(idx);
            groups[target].absorb(merged);
        }
    }

    groups
        .into_iter()
        .filter(|group| group.items.len() >= 2)
        .map(|mut group| {
            group.items.sort_by(|a, b| a.x.total_cmp(&b.x));
            group.items
        })
        .collect()
}
