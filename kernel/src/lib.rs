// Ordo Kernel
//
// Versioned key server with optimistic push/pull for worker groups.

pub mod config;
pub mod gate;
pub mod group;
pub mod history;
pub mod script;
pub mod server;
