pub mod apps;
pub mod emoji;
pub mod files;
pub mod gif;
pub mod wallpaper;
