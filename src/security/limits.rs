//! Request body limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size
//! - Recognize a limit overflow that surfaces while a body is being streamed upstream
//!
//! # Design Decisions
//! - Declared Content-Length over the limit is rejected before routing (413)
//! - Streamed bodies are wrapped in `Limited`; an overflow aborts the upstream
//!   call and is reported as 413, not 502

use std::error::Error as StdError;

use http_body_util::LengthLimitError;
use tower_http::limit::RequestBodyLimitLayer;

/// Layer rejecting bodies larger than `max_body_size`.
pub fn body_limit_layer(max_body_size: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(max_body_size)
}

/// Walk an error's source chain looking for a body length overflow.
pub fn is_length_limit_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if e.downcast_ref::<LengthLimitError>().is_some() {
            return true;
        }
        current = e.source();
    }
    false
}
