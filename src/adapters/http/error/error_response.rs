// Wire shape of error bodies: `{error, message}`.

use serde::{Deserialize, Serialize};

/// JSON error body. `error` is a stable machine code; `message` is human
/// text and may change between releases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
