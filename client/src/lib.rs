pub mod client;
pub mod discover;
pub mod error;
pub mod nat;
pub mod probe;
pub mod response;
pub mod socket;
pub mod transport;

pub use client::{Client, ClientConfig};
pub use discover::{behavior_test, discover, Discovery};
pub use error::{DiscoverError, ProbeError};
pub use nat::{BehaviorType, NatBehavior, NatType};
pub use stun_nat::host::{Family, Host};
