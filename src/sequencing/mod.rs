//! Musical model and clock: notes, the step grid, and the transport.

pub mod grid;
pub mod notes;
pub mod sequence;
pub mod transport;

pub use grid::{Grid, HiHatPattern};
pub use notes::{transpose, Note};
pub use sequence::{row_base_note, StepEvents, StepSequence};
pub use transport::{Tick, Transport, TransportEvent, TransportState, TransportStatus};
