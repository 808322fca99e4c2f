mod build_file;
mod classes;
mod dataset;
mod geometry;
mod model;

pub use build_file::{SavedBuild, load_build, save_build};
pub use classes::{CharacterClass, ClassId};
pub use dataset::{RawTreeDataset, SpriteDef, load_dataset, parse_dataset};
pub use geometry::compute_layout;
pub use model::{Bounds, Connection, DRAW_ORDER, Node, NodeId, NodeKind, TreeGraph};
