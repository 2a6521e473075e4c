/// Animation track summary command.
pub mod animations;
/// Top-level block listing command.
pub mod blocks;
/// Component table command.
pub mod components;
/// Document summary command.
pub mod info;
/// Shared loading and rendering helpers.
pub mod util;
