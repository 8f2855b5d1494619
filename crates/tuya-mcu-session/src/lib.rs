//! Tuya MCU Session
//!
//! Drives the module side of a Tuya MCU link on top of
//! [`tuya_mcu_protocol`]. The session is single-threaded and poll driven: the
//! host calls [`Session::poll`] from its main loop, and each poll
//!
//! 1. sends a heartbeat when one is due,
//! 2. re-sends the product info and working mode queries that are still
//!    unanswered,
//! 3. reads and dispatches at most one frame.
//!
//! Datapoint reports are handed to a [`ReportDecoder`] chosen when the session
//! is built, which is how device-specific extensions plug in.
//!
//! # Example
//!
//! ```rust
//! use tuya_mcu_session::{AcceptAllReports, ManualClock, Session, SessionConfig};
//! use tuya_mcu_protocol::LoopbackTransport;
//!
//! let (module, _mcu) = LoopbackTransport::pair();
//! let mut session = Session::with_config(AcceptAllReports, SessionConfig::immediate())
//!     .with_clock(ManualClock::new());
//! session.attach(module);
//! session.poll();
//! assert!(!session.is_initialized());
//! ```

mod clock;
mod config;
mod decoder;
mod error;
mod events;
mod link_metrics;
mod session;
mod state;

pub use clock::*;
pub use config::*;
pub use decoder::*;
pub use error::*;
pub use events::*;
pub use link_metrics::*;
pub use session::*;
pub use state::*;
