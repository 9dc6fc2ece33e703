pub mod distance;
pub mod shooter;
pub mod state;

pub use distance::{Distance, EuclideanDistance, WeighedDistance};
pub use shooter::{ConfigurationShooter, UniformShooter};
pub use state::Configuration;
