// HTTP-layer errors: the core-to-wire projection and the JSON body shape.

pub mod error_response;
pub mod http_error;

pub use error_response::ErrorResponse;
pub use http_error::HttpError;
