pub mod app;
pub mod config;
pub mod document;
pub mod normalize;
pub mod render;
pub mod replace;
pub mod session;
pub mod theme;
pub mod translate;
