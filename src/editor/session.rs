use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::drag::DragController;
use super::store::{ImageKey, SettingsStore};
use super::viewport::Viewport;
use crate::export::BatchJob;
use crate::watermark::{
    BoundingBox, Composition, GridAnchor, LayerRenderer, RelativePosition, RenderError,
    WatermarkSettings, load_source, render_watermark,
};

struct ActiveImage {
    key: ImageKey,
    original: DynamicImage,
    settings: WatermarkSettings,
    composition: Composition,
    failure: Option<RenderError>,
}

impl ActiveImage {
    fn rerender(&mut self, renderer: &LayerRenderer, settings: &WatermarkSettings) {
        let outcome = render_watermark(&self.original, settings, renderer);
        self.composition = outcome.composition;
        self.failure = outcome.failure;
    }
}

/// Editor state for a working set of images.
///
/// Every settings change re-renders the preview from the untouched original
/// before returning. Settings of the active image are written back to the
/// store whenever another image is selected.
pub struct EditorSession {
    renderer: LayerRenderer,
    defaults: WatermarkSettings,
    store: SettingsStore,
    images: Vec<ImageKey>,
    active: Option<ActiveImage>,
    widget_size: Option<(u32, u32)>,
    drag: DragController,
}

impl EditorSession {
    pub fn new(renderer: LayerRenderer, defaults: WatermarkSettings) -> Self {
        Self {
            renderer,
            defaults,
            store: SettingsStore::new(),
            images: Vec::new(),
            active: None,
            widget_size: None,
            drag: DragController::new(),
        }
    }

    pub fn images(&self) -> &[ImageKey] {
        &self.images
    }

    /// Add an image to the working set without loading it
    pub fn add_image(&mut self, path: impl Into<PathBuf>) -> ImageKey {
        let key = ImageKey::from(path.into());
        if !self.images.contains(&key) {
            self.images.push(key.clone());
        }
        key
    }

    /// Make `path` the active image.
    ///
    /// The outgoing image's settings are flushed to the store first. If the
    /// new image cannot be loaded, the previous image stays active and the
    /// working set is unchanged.
    pub fn select_image(&mut self, path: &Path) -> Result<(), RenderError> {
        let key = ImageKey::from(path);
        if self.active.as_ref().is_some_and(|active| active.key == key) {
            return Ok(());
        }

        let original = load_source(path)?;
        self.add_image(path);

        self.drag.abort();
        self.flush_active();

        let settings = self.store.get_or_insert(&key, &self.defaults).clone();
        let outcome = render_watermark(&original, &settings, &self.renderer);
        info!(
            "Selected {:?} ({}x{})",
            path,
            original.width(),
            original.height()
        );

        self.active = Some(ActiveImage {
            key,
            original,
            settings,
            composition: outcome.composition,
            failure: outcome.failure,
        });
        Ok(())
    }

    /// Drop an image and its settings from the working set
    pub fn remove_image(&mut self, path: &Path) -> bool {
        let key = ImageKey::from(path);
        let Some(index) = self.images.iter().position(|k| *k == key) else {
            return false;
        };
        self.images.remove(index);
        self.store.remove(&key);

        if self.active.as_ref().is_some_and(|active| active.key == key) {
            self.drag.abort();
            self.active = None;
        }
        true
    }

    pub fn active_image(&self) -> Option<&ImageKey> {
        self.active.as_ref().map(|active| &active.key)
    }

    /// Committed settings of the active image
    pub fn settings(&self) -> Option<&WatermarkSettings> {
        self.active.as_ref().map(|active| &active.settings)
    }

    /// Committed settings for any image in the working set
    pub fn settings_for(&self, path: &Path) -> Option<&WatermarkSettings> {
        let key = ImageKey::from(path);
        match &self.active {
            Some(active) if active.key == key => Some(&active.settings),
            _ => self.store.get(&key),
        }
    }

    /// Edit the active image's settings and re-render.
    ///
    /// Returns false when no image is active.
    pub fn update_settings(&mut self, edit: impl FnOnce(&mut WatermarkSettings)) -> bool {
        let Some(active) = self.active.as_mut() else {
            return false;
        };

        if self.drag.abort() {
            debug!("Settings changed mid-drag, discarding live position");
        }

        edit(&mut active.settings);
        active.settings = active.settings.normalized();
        let settings = active.settings.clone();
        active.rerender(&self.renderer, &settings);
        true
    }

    /// Snap the active watermark to a cell of the 3×3 grid
    pub fn apply_grid_anchor(&mut self, anchor: GridAnchor) -> bool {
        self.update_settings(|settings| settings.position = anchor.position())
    }

    /// Resize the preview widget; an active drag is aborted
    pub fn set_widget_size(&mut self, size: (u32, u32)) {
        if self.widget_size == Some(size) {
            return;
        }
        self.widget_size = Some(size);
        self.abort_drag();
    }

    pub fn viewport(&self) -> Option<Viewport> {
        let active = self.active.as_ref()?;
        let canvas = (active.original.width(), active.original.height());
        Viewport::fit(canvas, self.widget_size?)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn pointer_down(&mut self, pointer: (f64, f64)) -> bool {
        let (Some(viewport), Some(active)) = (self.viewport(), self.active.as_ref()) else {
            return false;
        };
        let bounding_box = active.composition.bounding_box;
        let committed = active.settings.position;
        self.drag
            .pointer_down(pointer, viewport, bounding_box, committed)
    }

    /// Move the watermark with the pointer, re-rendering the live preview.
    ///
    /// Returns false if nothing moved, including when the drag was aborted.
    pub fn pointer_move(&mut self, pointer: (f64, f64)) -> bool {
        if !self.drag.is_dragging() {
            return false;
        }
        let (Some(viewport), Some(active)) = (self.viewport(), self.active.as_mut()) else {
            self.drag.abort();
            return false;
        };

        match self
            .drag
            .pointer_move(pointer, viewport, active.composition.bounding_box)
        {
            Some(live) => {
                let mut preview = active.settings.clone();
                preview.position = live;
                active.rerender(&self.renderer, &preview);
                true
            }
            None => {
                let settings = active.settings.clone();
                active.rerender(&self.renderer, &settings);
                false
            }
        }
    }

    /// Finish a drag and commit its position to the active image
    pub fn pointer_up(&mut self) -> Option<RelativePosition> {
        let position = self.drag.pointer_up()?;
        self.update_settings(|settings| settings.position = position);
        Some(position)
    }

    pub fn preview(&self) -> Option<&RgbaImage> {
        self.active.as_ref().map(|active| &active.composition.image)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.active
            .as_ref()
            .and_then(|active| active.composition.bounding_box)
    }

    pub fn last_failure(&self) -> Option<&RenderError> {
        self.active.as_ref().and_then(|active| active.failure.as_ref())
    }

    /// One export job per image, each with its own committed settings
    pub fn batch_jobs(&mut self) -> Vec<BatchJob> {
        self.flush_active();
        self.images
            .iter()
            .map(|key| BatchJob {
                input: key.path().to_path_buf(),
                settings: self
                    .store
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| self.defaults.clone()),
            })
            .collect()
    }

    fn abort_drag(&mut self) {
        if !self.drag.abort() {
            return;
        }
        warn!("Drag aborted, restoring committed position");
        if let Some(active) = self.active.as_mut() {
            let settings = active.settings.clone();
            active.rerender(&self.renderer, &settings);
        }
    }

    fn flush_active(&mut self) {
        if let Some(active) = &self.active {
            self.store.insert(active.key.clone(), active.settings.clone());
        }
    }
}
