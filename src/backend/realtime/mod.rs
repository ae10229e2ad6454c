//! Real-time Update Module
//!
//! Keeps every connected client of a session up to date.
//!
//! # Architecture
//!
//! - **`registry`** - `SessionRooms`, the session → connections map
//! - **`broadcast`** - `Broadcaster`, the once-per-second push loop
//! - **`socket`** - Websocket endpoint and per-connection read loop
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs       - Module exports and documentation
//! ├── registry.rs  - Connection registry
//! ├── broadcast.rs - Periodic broadcaster
//! └── socket.rs    - Websocket handler
//! ```
//!
//! # Delivery
//!
//! Two paths reach a client:
//!
//! - Every tick pushes the session's full aggregate as a JSON array
//! - A client that saves its submission sends `{"user_id": n}`, which is
//!   relayed at once to the other connections of the session
//!
//! The tick reads the store, so a submission saved over plain HTTP reaches
//! clients within one interval even when no relay was sent.

/// Connection registry
pub mod registry;

/// Periodic broadcaster
pub mod broadcast;

/// Websocket endpoint
pub mod socket;

// Re-export commonly used types and functions
pub use broadcast::Broadcaster;
pub use registry::{Connection, ConnectionId, SessionRooms, TickSummary, TransportError};
pub use socket::{session_socket, WsConnection};
