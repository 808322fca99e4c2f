use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::egui::{ColorImage, Context, TextureHandle, TextureOptions};
use tracing::warn;

use crate::tree::SpriteDef;

type SheetResult = (String, Result<image::RgbaImage, String>);
type CropKey = (String, u32, u32, u32, u32);

enum SheetState {
    Loaded(image::RgbaImage),
    Failed,
}

/// Sprite-sheet store. Sheets decode on worker threads, at most one in
/// flight per sheet; crops are cut once per distinct rect and memoized as
/// textures. Both maps are append-only for the process lifetime.
pub struct SpriteCache {
    assets_dir: Option<PathBuf>,
    sheets: HashMap<String, SheetState>,
    pending: HashSet<String>,
    crops: HashMap<CropKey, Option<TextureHandle>>,
    tx: Sender<SheetResult>,
    rx: Receiver<SheetResult>,
    revision: u64,
}

impl SpriteCache {
    pub fn new(assets_dir: Option<PathBuf>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            assets_dir,
            sheets: HashMap::new(),
            pending: HashSet::new(),
            crops: HashMap::new(),
            tx,
            rx,
            revision: 0,
        }
    }

    /// Bumped whenever a sheet resolves; the scene renderer compares it to
    /// know a redraw will now show real sprites instead of placeholders.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn request_sheet(&mut self, sheet: &str) {
        if self.sheets.contains_key(sheet) || self.pending.contains(sheet) {
            return;
        }

        let Some(dir) = &self.assets_dir else {
            // No asset directory configured: placeholders forever.
            self.sheets.insert(sheet.to_string(), SheetState::Failed);
            return;
        };

        self.pending.insert(sheet.to_string());
        let path = dir.join(sheet);
        let name = sheet.to_string();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = image::open(&path)
                .map(|decoded| decoded.to_rgba8())
                .map_err(|error| error.to_string());
            let _ = tx.send((name, result));
        });
    }

    /// Drains finished sheet loads; returns true when anything resolved so
    /// the caller can invalidate the base layer and repaint.
    pub fn poll(&mut self) -> bool {
        let mut resolved = false;
        while let Ok((sheet, result)) = self.rx.try_recv() {
            self.pending.remove(&sheet);
            let state = match result {
                Ok(decoded) => SheetState::Loaded(decoded),
                Err(error) => {
                    warn!(sheet = %sheet, error = %error, "sprite sheet failed to load");
                    SheetState::Failed
                }
            };
            self.sheets.insert(sheet, state);
            self.revision = self.revision.wrapping_add(1);
            resolved = true;
        }
        resolved
    }

    /// Cropped texture for a sprite rect, or `None` while its sheet is still
    /// pending or has permanently failed (the placeholder path). The pixel
    /// copy runs once per distinct key, never per draw call.
    pub fn crop(&mut self, ctx: &Context, def: &SpriteDef) -> Option<TextureHandle> {
        let key: CropKey = (def.sheet.clone(), def.x, def.y, def.w, def.h);
        if let Some(cached) = self.crops.get(&key) {
            return cached.clone();
        }

        let sheet = match self.sheets.get(&def.sheet) {
            Some(SheetState::Loaded(sheet)) => sheet,
            Some(SheetState::Failed) => {
                self.crops.insert(key, None);
                return None;
            }
            None => {
                self.request_sheet(&def.sheet);
                return None;
            }
        };

        if def.w == 0
            || def.h == 0
            || def.x.saturating_add(def.w) > sheet.width()
            || def.y.saturating_add(def.h) > sheet.height()
        {
            warn!(
                sheet = %def.sheet,
                x = def.x,
                y = def.y,
                w = def.w,
                h = def.h,
                "sprite rect outside its sheet"
            );
            self.crops.insert(key, None);
            return None;
        }

        let cropped = image::imageops::crop_imm(sheet, def.x, def.y, def.w, def.h).to_image();
        let size = [def.w as usize, def.h as usize];
        let pixels = ColorImage::from_rgba_unmultiplied(size, cropped.as_raw());
        let handle = ctx.load_texture(
            format!("sprite:{}:{}:{}", def.sheet, def.x, def.y),
            pixels,
            TextureOptions::LINEAR,
        );
        self.crops.insert(key, Some(handle.clone()));
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(sheet: &str, x: u32, y: u32, w: u32, h: u32) -> SpriteDef {
        SpriteDef {
            sheet: sheet.to_string(),
            x,
            y,
            w,
            h,
        }
    }

    fn headless_crop(cache: &mut SpriteCache, def: &SpriteDef) -> Option<TextureHandle> {
        let ctx = Context::default();
        let mut result = None;
        let _ = ctx.run(Default::default(), |ctx| {
            result = cache.crop(ctx, def);
        });
        result
    }

    #[test]
    fn missing_assets_dir_never_goes_pending() {
        let mut cache = SpriteCache::new(None);
        cache.request_sheet("skills.png");
        assert!(cache.pending.is_empty());
        assert!(headless_crop(&mut cache, &def("skills.png", 0, 0, 16, 16)).is_none());
    }

    #[test]
    fn unresolved_sheet_yields_placeholder_and_requests_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = SpriteCache::new(Some(dir.path().to_path_buf()));
        let sprite = def("absent.png", 0, 0, 16, 16);

        assert!(headless_crop(&mut cache, &sprite).is_none());
        assert!(headless_crop(&mut cache, &sprite).is_none());

        // Let the worker report the missing file, then confirm permanent
        // placeholder fallback without retry.
        for _ in 0..200 {
            if cache.poll() {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(matches!(
            cache.sheets.get("absent.png"),
            Some(SheetState::Failed)
        ));
        assert!(headless_crop(&mut cache, &sprite).is_none());
        assert!(cache.pending.is_empty());
    }

    #[test]
    fn loaded_sheet_crops_and_memoizes() {
        let mut cache = SpriteCache::new(None);
        let mut sheet = image::RgbaImage::new(8, 8);
        sheet.put_pixel(2, 3, image::Rgba([255, 0, 0, 255]));
        cache
            .sheets
            .insert("sheet.png".to_string(), SheetState::Loaded(sheet));

        let sprite = def("sheet.png", 2, 3, 2, 2);
        let first = headless_crop(&mut cache, &sprite).unwrap();
        let second = headless_crop(&mut cache, &sprite).unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(cache.crops.len(), 1);
    }

    #[test]
    fn out_of_bounds_rect_falls_back_to_placeholder() {
        let mut cache = SpriteCache::new(None);
        cache.sheets.insert(
            "sheet.png".to_string(),
            SheetState::Loaded(image::RgbaImage::new(4, 4)),
        );
        assert!(headless_crop(&mut cache, &def("sheet.png", 2, 2, 8, 8)).is_none());
    }
}
