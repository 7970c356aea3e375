pub mod channel;
pub mod notifiable;
pub mod provider;
pub mod statistics;
