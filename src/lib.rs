#![warn(clippy::pedantic)]
// Noisy doc/signature lints — would require annotating every pub function
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
// Style preference — keeping format!("{}", x) over format!("{x}") for readability with complex exprs
#![allow(clippy::uninlined_format_args)]
// Module structure — messenger::send::MessageSender and friends
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod errors;
pub mod messenger;
pub mod nlu;
pub mod relay;
pub(crate) mod utils;

/// Re-exports for fuzz targets. Not part of the public API.
#[doc(hidden)]
pub mod fuzz_api {
    pub use crate::messenger::verify::validate_payload_signature;

    /// Decode a webhook body the way the POST handler does.
    pub fn decode_webhook_payload(
        body: &[u8],
    ) -> Result<crate::messenger::WebhookPayload, serde_json::Error> {
        serde_json::from_slice(body)
    }
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
