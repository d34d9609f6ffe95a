//! Interactive article mapping
//!
//! The drawing session state machine, snippet extraction and hotspot
//! projection that turn rectangles drawn over a rendered newspaper page
//! into persisted, clickable article regions.

pub mod overlay;
pub mod session;
pub mod snippet;
pub mod types;

pub use overlay::{hit_test, project, Hotspot};
pub use session::{DrawPhase, EditorSession, SavePayload, SessionError};
pub use snippet::{extract, Snippet, MIN_PLAUSIBLE_BYTES};
pub use types::{Category, MappedArea};
