pub mod alert;
pub mod climate;
pub mod field;
pub mod irrigation;
pub mod phenology;
pub mod recommendation;
pub mod snapshot;
pub mod soil_moisture;
pub mod water_balance;

pub use alert::*;
pub use climate::*;
pub use field::*;
pub use irrigation::*;
pub use phenology::*;
pub use recommendation::*;
pub use snapshot::*;
pub use soil_moisture::*;
pub use water_balance::*;
