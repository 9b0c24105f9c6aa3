//! Sprite catalogue
//!
//! Images are read from `<root>/<name>.png` on first use and cached. Anything that
//! fails to load is replaced by a generated placeholder so the game always has art.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::sim::{Size, SpriteMetrics};

/// Default asset directory
pub const ASSET_DIR: &str = "assets";

/// Failure loading or writing a sprite
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Failed to decode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to prepare {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sprites the game draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    PlayerCar,
    EnemyCar,
    Road,
    TruckCab,
    TruckTrailer,
}

impl AssetKind {
    pub const ALL: [AssetKind; 5] = [
        AssetKind::PlayerCar,
        AssetKind::EnemyCar,
        AssetKind::Road,
        AssetKind::TruckCab,
        AssetKind::TruckTrailer,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            AssetKind::PlayerCar => "player_car.png",
            AssetKind::EnemyCar => "enemy_car.png",
            AssetKind::Road => "road.png",
            AssetKind::TruckCab => "truck_cab.png",
            AssetKind::TruckTrailer => "truck_trailer.png",
        }
    }
}

/// Lazily loaded, memoized sprite set
#[derive(Debug)]
pub struct Assets {
    root: PathBuf,
    cache: HashMap<AssetKind, RgbaImage>,
}

impl Assets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, kind: AssetKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    /// Read and decode a sprite from disk, bypassing the cache
    pub fn try_load(&self, kind: AssetKind) -> Result<RgbaImage, AssetError> {
        let path = self.path(kind);
        let img = image::open(&path).map_err(|source| AssetError::Image { path, source })?;
        Ok(img.to_rgba8())
    }

    /// Sprite for `kind`, loading it (or its placeholder) on first request
    pub fn image(&mut self, kind: AssetKind) -> &RgbaImage {
        if !self.cache.contains_key(&kind) {
            let img = match self.try_load(kind) {
                Ok(img) => img,
                Err(e) => {
                    log::warn!("{e}; using placeholder");
                    placeholder(kind)
                }
            };
            self.cache.insert(kind, img);
        }
        &self.cache[&kind]
    }

    /// Load every sprite up front
    pub fn preload(&mut self) {
        for kind in AssetKind::ALL {
            self.image(kind);
        }
        log::info!("Preloaded {} sprites", self.cache.len());
    }

    /// Hitbox sizes derived from the resolved sprites
    pub fn sprite_metrics(&mut self) -> SpriteMetrics {
        let mut size = |kind| {
            let img = self.image(kind);
            Size::new(img.width() as i32, img.height() as i32)
        };
        SpriteMetrics {
            player: size(AssetKind::PlayerCar),
            enemy_car: size(AssetKind::EnemyCar),
            truck_cab: size(AssetKind::TruckCab),
            truck_trailer: size(AssetKind::TruckTrailer),
        }
    }

    /// Write placeholder PNGs for every sprite missing on disk.
    /// Returns how many files were created; failures are logged and skipped.
    pub fn export_missing_defaults(&self) -> usize {
        AssetKind::ALL
            .into_iter()
            .filter(|kind| !self.path(*kind).exists())
            .filter(|kind| match self.export_default(*kind) {
                Ok(()) => true,
                Err(e) => {
                    log::error!("{e}");
                    false
                }
            })
            .count()
    }

    fn export_default(&self, kind: AssetKind) -> Result<(), AssetError> {
        let path = self.path(kind);
        fs::create_dir_all(&self.root).map_err(|source| AssetError::Io {
            path: self.root.clone(),
            source,
        })?;
        placeholder(kind)
            .save(&path)
            .map_err(|source| AssetError::Image {
                path: path.clone(),
                source,
            })?;
        log::info!("Created default asset {}", path.display());
        Ok(())
    }
}

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const CYAN: Rgba<u8> = Rgba([0, 255, 255, 255]);
const LIGHT_GRAY: Rgba<u8> = Rgba([192, 192, 192, 255]);
const DARK_GRAY: Rgba<u8> = Rgba([64, 64, 64, 255]);

/// Generated stand-in art for a sprite
pub fn placeholder(kind: AssetKind) -> RgbaImage {
    match kind {
        AssetKind::PlayerCar => car(Rgba([255, 0, 0, 255])),
        AssetKind::EnemyCar => car(Rgba([0, 0, 255, 255])),
        AssetKind::Road => road(),
        AssetKind::TruckCab => {
            let mut img = RgbaImage::from_pixel(80, 60, CLEAR);
            fill_rect(&mut img, 10, 10, 60, 40, Rgba([30, 50, 150, 255]));
            // Windshield
            fill_rect(&mut img, 15, 15, 50, 15, LIGHT_GRAY);
            fill_rect(&mut img, 5, 30, 15, 20, BLACK);
            fill_rect(&mut img, 60, 30, 15, 20, BLACK);
            img
        }
        AssetKind::TruckTrailer => {
            let mut img = RgbaImage::from_pixel(80, 120, CLEAR);
            fill_rect(&mut img, 10, 0, 60, 110, Rgba([50, 50, 50, 255]));
            stroke_rect(&mut img, 15, 10, 50, 90, DARK_GRAY);
            fill_rect(&mut img, 5, 80, 15, 20, BLACK);
            fill_rect(&mut img, 60, 80, 15, 20, BLACK);
            img
        }
    }
}

fn car(body: Rgba<u8>) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(60, 100, CLEAR);
    fill_rect(&mut img, 10, 10, 40, 80, body);
    fill_rect(&mut img, 15, 20, 30, 20, CYAN);
    for (x, y) in [(5, 15), (45, 15), (5, 65), (45, 65)] {
        fill_rect(&mut img, x, y, 10, 20, BLACK);
    }
    img
}

fn road() -> RgbaImage {
    const LINE_WIDTH: u32 = 10;
    let mut img = RgbaImage::from_pixel(500, 700, Rgba([118, 110, 129, 255]));
    for x in [210, 290, 370, 450] {
        fill_rect(&mut img, x - LINE_WIDTH / 2, 0, LINE_WIDTH, 700, WHITE);
    }
    img
}

/// Fill a rectangle, clipped to the image
fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let x_end = (x + w).min(img.width());
    let y_end = (y + h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

/// One-pixel outline covering `w + 1` by `h + 1` pixels
fn stroke_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    fill_rect(img, x, y, w + 1, 1, color);
    fill_rect(img, x, y + h, w + 1, 1, color);
    fill_rect(img, x, y, 1, h + 1, color);
    fill_rect(img, x + w, y, 1, h + 1, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_sizes_match_default_metrics() {
        let metrics = SpriteMetrics::default();
        let player = placeholder(AssetKind::PlayerCar);
        assert_eq!(
            (player.width() as i32, player.height() as i32),
            (metrics.player.w, metrics.player.h)
        );
        let cab = placeholder(AssetKind::TruckCab);
        assert_eq!((cab.width(), cab.height()), (80, 60));
        let trailer = placeholder(AssetKind::TruckTrailer);
        assert_eq!((trailer.width(), trailer.height()), (80, 120));
        let road = placeholder(AssetKind::Road);
        assert_eq!((road.width(), road.height()), (500, 700));
    }

    #[test]
    fn test_placeholder_artwork() {
        let player = placeholder(AssetKind::PlayerCar);
        assert_eq!(*player.get_pixel(0, 0), CLEAR);
        assert_eq!(*player.get_pixel(30, 60), Rgba([255, 0, 0, 255]));
        assert_eq!(*player.get_pixel(30, 25), CYAN);
        assert_eq!(*player.get_pixel(6, 16), BLACK);

        let enemy = placeholder(AssetKind::EnemyCar);
        assert_eq!(*enemy.get_pixel(30, 60), Rgba([0, 0, 255, 255]));

        let road = placeholder(AssetKind::Road);
        assert_eq!(*road.get_pixel(210, 350), WHITE);
        assert_eq!(*road.get_pixel(100, 350), Rgba([118, 110, 129, 255]));
    }

    #[test]
    fn test_missing_files_fall_back_to_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let mut assets = Assets::new(dir.path());
        assert!(assets.try_load(AssetKind::Road).is_err());
        assert_eq!(assets.image(AssetKind::Road).width(), 500);
        assert_eq!(assets.sprite_metrics(), SpriteMetrics::default());
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("enemy_car.png"), b"not a png").unwrap();
        let mut assets = Assets::new(dir.path());
        let err = assets.try_load(AssetKind::EnemyCar).unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }));
        assert_eq!(assets.image(AssetKind::EnemyCar).height(), 100);
    }

    #[test]
    fn test_export_then_load_custom_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join(ASSET_DIR);
        let assets = Assets::new(&root);
        assert_eq!(assets.export_missing_defaults(), 5);
        assert_eq!(assets.export_missing_defaults(), 0);

        // A user-supplied wider enemy car changes the hitbox
        RgbaImage::from_pixel(70, 110, BLACK)
            .save(root.join("enemy_car.png"))
            .unwrap();
        let mut assets = Assets::new(&root);
        let metrics = assets.sprite_metrics();
        assert_eq!(metrics.enemy_car, Size::new(70, 110));
        assert_eq!(metrics.player, Size::new(60, 100));
        assert_eq!(*assets.image(AssetKind::PlayerCar), placeholder(AssetKind::PlayerCar));
    }
}
