pub mod events;
pub mod simulated;
pub mod traits;

pub use events::{PlayerEvent, PlayerEventStream};
pub use traits::QueuePlayer;
