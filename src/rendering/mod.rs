pub mod camera;
pub mod export;
pub mod light;
pub mod scene;

// Re-export the assembly and export interfaces
pub use export::{scene_document_path, ExportError, OutputTree, SceneDocumentExporter, SceneExporter};
pub use scene::{ObjectKind, Scene, SceneAssembler, SceneObject, SurfaceColor};
