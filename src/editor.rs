// Interactive editing - preview geometry, watermark dragging and per-image settings
mod drag;
mod session;
mod store;
mod viewport;

pub use drag::{DragController, DragSession, DragState};
pub use session::EditorSession;
pub use store::{ImageKey, SettingsStore};
pub use viewport::Viewport;
