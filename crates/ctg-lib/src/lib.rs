pub mod buffer;
pub mod chart;
pub mod clock;
pub mod config;
pub mod detectors;
pub mod error;
pub mod events;
pub mod io;
pub mod metrics;
pub mod session;
pub mod signal;
pub mod ticker;
pub mod window;

pub use buffer::SampleBuffer;
pub use chart::{ChartFrame, ChartSync};
pub use clock::{PlaybackClock, SPEED_STEPS};
pub use config::SessionConfig;
pub use error::StreamError;
pub use events::{Event, EventLog, Severity};
pub use metrics::stats::{window_stats, StatsConfig, WindowStats};
pub use session::{BoundaryKind, InboundMessage, Session, ViewUpdate};
pub use signal::Sample;
pub use ticker::Ticker;
pub use window::{Mode, Window, WindowController};
