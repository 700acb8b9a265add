pub mod catalog;
pub mod client;
pub mod device_info;
pub mod inverter;
pub mod packet;
pub mod telemetry;
pub mod transport;

pub use client::Client;
pub use inverter::{Inverter, Serial};
