pub(crate) mod completion_token;

pub use completion_token::CompletionToken;
