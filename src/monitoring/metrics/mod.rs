//! Request instrumentation
//!
//! - `probe` - Process and host resource readings
//! - `recorder` - Request start/end bookkeeping and the bounded metric log

mod probe;
mod recorder;

#[cfg(feature = "metrics")]
pub use probe::SysinfoProbe;
pub use probe::{ResourceProbe, StaticProbe, default_probe};
pub use recorder::MetricsRecorder;
