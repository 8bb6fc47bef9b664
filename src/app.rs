use crate::config::ServerSettings;
use crate::networking::assets::{AssetEndpoints, AssetError, AssetResolver, HttpPolyClient, PolyLookup};
use crate::rendering::{ExportError, OutputTree, Scene, SceneAssembler, SceneDocumentExporter, SceneExporter};
use crate::world::RenderJob;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Shared, read-only state behind every request.
pub struct RenderApp {
    assembler: SceneAssembler,
    exporter: Arc<dyn SceneExporter>,
    output: OutputTree,
    access_key: Option<String>,
}

/// Outcome of one successful render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub destination: PathBuf,
    pub object_count: usize,
    pub elapsed: Duration,
}

impl RenderApp {
    pub fn new(
        lookup: Arc<dyn PolyLookup>,
        endpoints: AssetEndpoints,
        exporter: Arc<dyn SceneExporter>,
        output: OutputTree,
        access_key: Option<String>,
    ) -> Self {
        let resolver = Arc::new(AssetResolver::new(lookup, endpoints));
        Self {
            assembler: SceneAssembler::new(resolver),
            exporter,
            output,
            access_key: access_key.filter(|key| !key.is_empty()),
        }
    }

    /// Production wiring: HTTP poly lookups and the scene document exporter.
    pub fn from_settings(settings: &ServerSettings) -> Result<Self, AssetError> {
        let endpoints = AssetEndpoints::new(settings.api_url.as_str(), settings.cdn_url.as_str());
        let lookup = HttpPolyClient::new(endpoints.clone(), settings.asset_timeout())?;

        Ok(Self::new(
            Arc::new(lookup),
            endpoints,
            Arc::new(SceneDocumentExporter),
            OutputTree::new(settings.cdn_directory.clone()),
            settings.access_key().map(str::to_string),
        ))
    }

    pub fn access_key(&self) -> Option<&str> {
        self.access_key.as_deref()
    }

    pub fn output(&self) -> &OutputTree {
        &self.output
    }

    /// Resolve, compose and export one job. The output name is checked
    /// before any asset lookup happens.
    pub async fn render(&self, job: &RenderJob) -> Result<RenderReport, ExportError> {
        let start = Instant::now();
        self.output.thumbnail_path(&job.output)?;

        let avatar = job.mode.descriptor();
        debug!("Rendering {} with {} equipped items", job.output, avatar.equipped_count());

        let objects = self.assembler.assemble(&avatar).await;
        let object_count = objects.len();
        let destination = self.output.prepare(&job.output).await?;

        self.exporter.export(&Scene::thumbnail(objects), &destination).await?;

        let elapsed = start.elapsed();
        info!(
            "Render ({}) of {} completed in {:?}",
            job.mode.render_type().as_str(),
            destination.display(),
            elapsed
        );

        Ok(RenderReport {
            destination,
            object_count,
            elapsed,
        })
    }
}
