mod components;
pub mod neighbors;
pub mod node;
pub mod roadmap;

pub use neighbors::{KdTreeNearestNeighbors, LinearNearestNeighbors, NearestNeighbors};
pub use node::{Edge, EdgeId, Node, NodeId};
pub use roadmap::{CcId, Roadmap};
