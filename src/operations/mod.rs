mod enumerate;
mod segmentize;

pub use enumerate::{collect_leaves, EnumerateRegions, Enumeration, LeafInstance};
pub use segmentize::{SegmentationReport, Segmentize, Tracking};
