pub mod slack;

pub use slack::{
    Channel, ChannelsPage, Message, MessagesPage, OutgoingMessage, PostedMessage,
    ResponseMetadata, User, UserInfo, UsersPage,
};
