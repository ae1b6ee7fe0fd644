pub mod chat;

pub use chat::{ new_client, ChatClient, ChatError, CompletionTransport, FailureKind };
