#![forbid(unsafe_code)]

mod session;
mod store;

pub use session::{LoadPhase, LocationPhase, Session};
pub use store::{
    DEFAULT_LOCATION_MESSAGE, JITTER_METERS, LoadOutcome, LoadTicket, LocationOutcome, MapState,
    NearbyTicket,
};
