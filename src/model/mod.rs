pub mod gesture;
pub mod item;
pub mod layout;
pub mod visibility;
pub mod window;

pub use gesture::{BarRect, DateCommit, DragMode, GestureOutcome, InteractionController};
pub use item::{ItemRef, ItemType, TimelineItem};
pub use layout::{BarGeometry, Zoom};
pub use visibility::{normalize, ExpansionState, ItemIndex, Normalized};
pub use window::{MonthBand, TimelineWindow};
