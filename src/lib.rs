pub mod actions;
pub mod collection;
pub mod common;
pub mod desktop_entry;
pub mod icons;
pub mod launcher;
pub mod logging;
pub mod manager;
pub mod plugin;
pub mod plugins;
pub mod render;
pub mod settings;
pub mod thumbnail;
pub mod usage;
pub mod worker;

#[cfg(feature = "gui")]
pub mod gui;
