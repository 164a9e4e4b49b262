mod common;

use common::{wait_until, RecordingRenderer};
use edge_launcher::actions::Action;
use edge_launcher::manager::{CollectionManager, Manager};
use edge_launcher::plugins::wallpaper::{scan_wallpapers, WallpaperPlugin, WALLPAPERS_PER_PAGE};
use edge_launcher::render::Icon;
use edge_launcher::thumbnail::ThumbnailLoader;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn write_png(path: &Path, w: u32, h: u32) {
    image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
        .save(path)
        .unwrap();
}

#[test]
fn scan_lists_images_sorted_by_name() {
    let dir = tempdir().unwrap();
    write_png(&dir.path().join("b.png"), 4, 4);
    write_png(&dir.path().join("a.png"), 4, 4);
    fs::write(dir.path().join("notes.txt"), "x").unwrap();
    fs::create_dir(dir.path().join("nested.png")).unwrap();

    let names: Vec<_> = scan_wallpapers(dir.path())
        .into_iter()
        .map(|w| w.name)
        .collect();
    assert_eq!(names, ["a.png", "b.png"]);
    assert!(scan_wallpapers(&dir.path().join("missing")).is_empty());
}

#[test]
fn theme_variant_picks_the_directory() {
    let base = tempdir().unwrap();
    fs::create_dir_all(base.path().join("Dark")).unwrap();
    fs::create_dir_all(base.path().join("Light")).unwrap();
    write_png(&base.path().join("Dark/night.png"), 4, 4);
    write_png(&base.path().join("Light/day.png"), 4, 4);

    let mut ui = RecordingRenderer::default();
    let plugin = WallpaperPlugin::new(base.path(), true);
    assert_eq!(plugin.dir(), base.path().join("Dark"));
    let mut dark = CollectionManager::new(plugin);
    dark.enter(&mut ui);
    assert_eq!(ui.labels(), ["night.png"]);

    let mut light = CollectionManager::new(WallpaperPlugin::new(base.path(), false));
    light.enter(&mut ui);
    assert_eq!(ui.labels(), ["day.png"]);
    assert_eq!(
        light.activate_selected(),
        Some(Action::SetWallpaper(base.path().join("Light/day.png")))
    );
}

#[test]
fn pages_hold_twelve_wallpapers() {
    let base = tempdir().unwrap();
    let dir = base.path().join("Dark");
    fs::create_dir_all(&dir).unwrap();
    for i in 0..15 {
        write_png(&dir.join(format!("wall{i:02}.png")), 2, 2);
    }

    let mut ui = RecordingRenderer::default();
    let mut manager = CollectionManager::new(WallpaperPlugin::new(base.path(), true));
    manager.enter(&mut ui);
    assert_eq!(ui.last_page().elements.len(), WALLPAPERS_PER_PAGE);
    assert_eq!(ui.last_page().page_count, 2);

    manager.filter("wall1", &mut ui);
    assert_eq!(manager.len(), 5);
    manager.filter("zzz", &mut ui);
    assert_eq!(ui.status, "No wallpapers found for: zzz");
}

#[test]
fn thumbnails_replace_placeholders() {
    let base = tempdir().unwrap();
    let dir = base.path().join("Light");
    fs::create_dir_all(&dir).unwrap();
    write_png(&dir.join("wide.png"), 120, 40);

    let mut ui = RecordingRenderer::default();
    let mut manager = CollectionManager::new(WallpaperPlugin::new(base.path(), false))
        .with_thumbnails(ThumbnailLoader::spawn("test", 1, 8));
    manager.enter(&mut ui);
    let key = dir.join("wide.png").to_string_lossy().into_owned();
    assert_eq!(ui.last_page().elements[0].icon, Icon::Placeholder);

    assert!(wait_until(Duration::from_secs(5), || {
        manager.poll(&mut ui);
        !ui.thumbnails.is_empty()
    }));
    assert_eq!(ui.thumbnails, [key]);

    manager.filter("", &mut ui);
    match &ui.last_page().elements[0].icon {
        Icon::Thumbnail(thumb) => assert_eq!((thumb.width, thumb.height), (60, 60)),
        other => panic!("expected a cached thumbnail, got {other:?}"),
    }
}
