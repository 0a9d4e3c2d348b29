//! Configuration persistence module

mod xdg;

pub use xdg::XdgConfigStore;
