//! CLI commands implementation

pub mod analyze;
pub mod ask;
pub mod autopsy;
pub mod init;
pub mod status;
pub mod upload;

pub use analyze::*;
pub use ask::*;
pub use autopsy::*;
pub use init::*;
pub use status::*;
pub use upload::*;
