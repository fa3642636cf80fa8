// The application modules live in `stayhub.rs` and `stayhub/`; everything is
// re-exported at the crate root so binaries and tests import
// `stayhub_server_shared::messages`, `::bookings`, and so on.
mod stayhub;

pub use stayhub::*;
