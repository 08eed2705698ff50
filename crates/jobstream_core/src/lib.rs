//! Jobstream core: wire protocol and pure client state machine.
mod decoder;
mod frame;
mod joburl;
mod msg;
mod state;
mod update;

pub use decoder::FrameDecoder;
pub use frame::Frame;
pub use joburl::{extract_job_url, is_valid_job_url};
pub use msg::{Effect, Msg};
pub use state::{StreamState, StreamView};
pub use update::update;
