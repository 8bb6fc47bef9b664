#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thumbnail_renderer::networking::assets::{AssetEndpoints, AssetError, PolyLookup, PolyRecord};
use thumbnail_renderer::rendering::{ExportError, OutputTree, Scene, SceneExporter};
use thumbnail_renderer::world::Attributes;
use thumbnail_renderer::RenderApp;

pub const API_URL: &str = "http://api.test";
pub const CDN_URL: &str = "http://cdn.test";

/// Poly lookup answering from a fixed table and recording every call.
#[derive(Default)]
pub struct FakeLookup {
    responses: HashMap<String, Result<Vec<PolyRecord>, AssetError>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeLookup {
    pub fn with(mut self, item: &str, response: Result<Vec<PolyRecord>, AssetError>) -> Self {
        self.responses.insert(item.to_string(), response);
        self
    }

    /// Item with a mesh `m<item>` and texture `t<item>`.
    pub fn with_item(self, item: &str) -> Self {
        let records = vec![record(&format!("asset://m{}", item), &format!("asset://t{}", item))];
        self.with(item, Ok(records))
    }

    /// Hold the answer for `item` back by `delay`.
    pub fn with_delay(mut self, item: &str, delay: Duration) -> Self {
        self.delays.insert(item.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        let mut calls = self.calls.lock().unwrap().clone();
        calls.sort();
        calls
    }
}

#[async_trait]
impl PolyLookup for FakeLookup {
    async fn fetch_poly(&self, item_id: &str) -> Result<Vec<PolyRecord>, AssetError> {
        self.calls.lock().unwrap().push(item_id.to_string());
        if let Some(delay) = self.delays.get(item_id) {
            tokio::time::sleep(*delay).await;
        }
        self.responses
            .get(item_id)
            .cloned()
            .unwrap_or(Err(AssetError::Status { status: 404 }))
    }
}

pub fn record(mesh: &str, texture: &str) -> PolyRecord {
    PolyRecord {
        mesh: mesh.to_string(),
        texture: texture.to_string(),
    }
}

/// Exporter keeping every scene it was handed, optionally failing.
#[derive(Default)]
pub struct RecordingExporter {
    exports: Mutex<Vec<(PathBuf, Scene)>>,
    fail: bool,
}

impl RecordingExporter {
    pub fn failing() -> Self {
        Self {
            exports: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn exports(&self) -> Vec<(PathBuf, Scene)> {
        self.exports.lock().unwrap().clone()
    }

    pub fn last_scene(&self) -> Scene {
        self.exports().pop().expect("nothing exported").1
    }
}

#[async_trait]
impl SceneExporter for RecordingExporter {
    async fn export(&self, scene: &Scene, destination: &Path) -> Result<(), ExportError> {
        if self.fail {
            return Err(ExportError::Renderer {
                reason: "rasterizer unavailable".to_string(),
            });
        }
        self.exports
            .lock()
            .unwrap()
            .push((destination.to_path_buf(), scene.clone()));
        Ok(())
    }
}

pub fn endpoints() -> AssetEndpoints {
    AssetEndpoints::new(API_URL, CDN_URL)
}

pub fn app(
    lookup: Arc<FakeLookup>,
    exporter: Arc<dyn SceneExporter>,
    output_root: &Path,
    access_key: Option<&str>,
) -> RenderApp {
    RenderApp::new(
        lookup,
        endpoints(),
        exporter,
        OutputTree::new(output_root),
        access_key.map(str::to_string),
    )
}

pub fn attrs(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Fresh directory under the system temp dir, unique per test name.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("thumbnail-it-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
