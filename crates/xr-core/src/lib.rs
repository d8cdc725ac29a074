//! xr-core: the launcher runtime.
//!
//! Startup runs strictly in sequence, each stage feeding the next:
//!
//! 1. [`fetcher`] makes sure the engine binary exists (downloads at most once)
//! 2. [`credentials`] produces the client id and, for Reality, the keypair
//! 3. [`discovery`] finds the public IP (falls back to `UNKNOWN`)
//! 4. [`output`] writes the engine config and the share link atomically
//! 5. [`registrar`] optionally reports the node to an inventory API
//! 6. [`supervisor`] runs the engine and restarts it forever
//!
//! Fatal errors are only possible in stages 1, 2 and 4.

pub mod credentials;
pub mod discovery;
pub mod error;
pub mod fetcher;
pub mod output;
pub mod paths;
pub mod registrar;
pub mod supervisor;
pub mod util;

pub use error::{LauncherError, Result};
pub use paths::EnginePaths;
