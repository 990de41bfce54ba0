// Interactive edit session: typed field edits, a debounce timer, and the
// controller that keeps a rendered preview in sync with the latest draft.

pub mod controller;
pub mod edits;
pub mod preview;
pub mod timer;

pub use controller::{SyncClosed, SyncController, SyncHandle, SyncState, SyncStatus, QUIET_PERIOD};
pub use edits::{EditError, FieldEdit};
pub use preview::{FileSurface, Preview, PreviewSurface};
pub use timer::DebounceTimer;
