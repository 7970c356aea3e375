pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;

pub use crate::error::{ChannelError, Result};
pub use crate::services::channel::FcmChannel;
