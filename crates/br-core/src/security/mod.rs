//! Share secret and signed share tokens.

mod secret;
mod share_token;

pub use secret::{ShareSecret, GENERATED_SECRET_LEN};
pub use share_token::{ShareToken, ShareTokenCodec, ShareTokenError, SHARE_TOKEN_TTL};
