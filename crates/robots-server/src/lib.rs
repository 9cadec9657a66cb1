//! The external driver surface: a line-protocol server plus a
//! standalone CLI mode, both built on `robots-core` and `robots-asm`.

pub mod server;

pub use server::Server;
