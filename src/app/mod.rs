//! Application boundary: the port traits the task loops are generic over,
//! and the notification events they emit.
//!
//! Nothing under `app` touches hardware. Adapters in [`crate::adapters`]
//! implement [`ports`]; the loops in [`crate::acquisition`],
//! [`crate::alert::monitor`], [`crate::forwarder`] and [`crate::display`]
//! consume them.

pub mod events;
pub mod ports;
