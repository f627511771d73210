pub mod axis;
pub mod coords;
pub mod granularity;
pub mod overlap;
pub mod range;
pub mod stacking;
pub(crate) mod types;

pub use axis::{axis_total_width, build_axis, visible_tick_range};
pub use coords::{position_for_time, tick_offset, time_for_position, width_for_range};
pub use granularity::{Granularity, Scale, default_granularities};
pub use overlap::group_overlapping;
pub use range::{
    InteractiveOptions, RangeOptions, calculate_interactive_range, calculate_time_range,
    generate_ticks, tick_capacity, tick_count,
};
pub use stacking::{StackingOptions, stack_group, stack_items};
pub use types::*;
