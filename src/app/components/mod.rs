//! Shared UI components for the Dioxus fullstack web UI.

pub mod charts;
pub mod layout;
pub mod nav;
pub mod theme;
pub mod widgets;

pub use charts::{level_slices, BarChart, Doughnut, GroupedBarChart, LineChart, Series, Slice};
pub use layout::Layout;
pub use nav::Nav;
pub use widgets::{EmptyState, Heatmap, LevelBadge, PageHeader, StatTile};
