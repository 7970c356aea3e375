use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Notification did not produce a valid FCM message")]
    InvalidMessage,
}

pub type Result<T> = std::result::Result<T, ChannelError>;
