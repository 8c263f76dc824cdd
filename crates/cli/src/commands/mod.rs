pub mod docs;
pub mod outline;
pub mod ranges;
pub mod refs;
pub mod session;
pub mod vars;

pub use docs::docs_command;
pub use outline::outline_command;
pub use ranges::ranges_command;
pub use refs::refs_command;
pub use vars::vars_command;
