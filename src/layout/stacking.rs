use super::overlap::group_overlapping;
use super::types::VirtualItem;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackingOptions {
    pub container_height: f64,
    pub margin_top: f64,
    pub row_gap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Down,
    Up,
}

/// Assigns `y` to every member of one overlap group (already sorted by `x`).
///
/// Cards stack downward from `margin_top` until the next one would pass the
/// container bottom; the walk then flips and stacks upward from the bottom,
/// and flips again when it reaches the top.
pub fn stack_group(group: &mut [VirtualItem], options: &StackingOptions) {
    let StackingOptions {
        container_height,
        margin_top,
        row_gap,
    } = *options;

    let mut current_y = margin_top;
    let mut direction = Direction::Down;
    for item in group.iter_mut() {
        match direction {
            Direction::Down => {
                let next_y = current_y + item.height + row_gap;
                if next_y <= container_height {
                    item.y = current_y;
                    current_y = next_y;
                } else {
                    direction = Direction::Up;
                    item.y = container_height - margin_top - item.height;
                    current_y = item.y;
                }
            }
            Direction::Up => {
                let next_y = current_y - item.height - row_gap;
                if next_y >= margin_top {
                    item.y = next_y;
                    current_y = next_y;
                } else {
                    direction = Direction::Down;
                    item.y = margin_top;
                    current_y = margin_top;
                }
            }
        }
    }
}

/// Runs one layout pass over every measured card and writes the resulting
/// `y` back into `items`.
///
/// Cards that overlap nothing sit on the first row. Returns `false` without
/// touching anything when the container is too short to stack into.
pub fn stack_items(items: &mut [VirtualItem], options: &StackingOptions) -> bool {
    if options.container_height <= options.margin_top {
        tracing::debug!(
            container_height = options.container_height,
            margin_top = options.margin_top,
            "container too short, skipping stacking pass"
        );
        return false;
    }

    let mut groups = group_overlapping(items);
    for item in items.iter_mut() {
        item.y = options.margin_top;
    }
    for group in &mut groups {
        stack_group(group, options);
        for placed in group.iter() {
            if let Some(target) = items.iter_mut().find(|item| item.key == placed.key) {
                target.y = placed.y;
            }
        }
    }
    tracing::debug!(
        items = items.len(),
        groups = groups.len(),
        "stacking pass complete"
    );
    true
}
