pub mod graph;

use crate::networking::assets::{AssetEndpoints, MeshRef, ResolvedAsset, TextureRef};
use crate::rendering::camera::Camera;
use crate::rendering::light::Light;
use crate::world::HexColor;
use glam::Mat4;
use serde::Serialize;

pub use graph::{compose, ResolvedSlots, SceneAssembler};

/// Output edge length in pixels.
pub const THUMBNAIL_SIZE: u32 = 512;

/// Fixed body meshes served from the CDN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyMesh {
    Torso,
    LeftArm,
    LeftLeg,
    RightLeg,
    TShirt,
    Head,
    RightArm,
    /// Right arm posed to hold a tool.
    ArmHold,
}

impl BodyMesh {
    pub fn file_name(&self) -> &'static str {
        match self {
            BodyMesh::Torso => "Torso.obj",
            BodyMesh::LeftArm => "LeftArm.obj",
            BodyMesh::LeftLeg => "LeftLeg.obj",
            BodyMesh::RightLeg => "RightLeg.obj",
            BodyMesh::TShirt => "tshirt.obj",
            BodyMesh::Head => "Head.obj",
            BodyMesh::RightArm => "RightArm.obj",
            BodyMesh::ArmHold => "ArmHold.obj",
        }
    }

    pub fn mesh_ref(&self, endpoints: &AssetEndpoints) -> MeshRef {
        MeshRef::new(endpoints.cdn_asset(self.file_name()))
    }
}

/// What a scene object represents. Hats carry their slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Torso,
    LeftArm,
    LeftLeg,
    RightLeg,
    #[serde(rename = "tshirt")]
    TShirt,
    Head,
    Hat(usize),
    Tool,
    Arm,
}

/// Base colour of an object. `Transparent` lets the texture or the mesh's
/// own appearance show through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceColor {
    Hex(HexColor),
    Transparent,
}

/// One renderable unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub mesh: MeshRef,
    pub color: SurfaceColor,
    pub texture: Option<TextureRef>,
    pub transform: Mat4,
}

impl SceneObject {
    /// Body part tinted with a skin colour.
    pub fn body(
        kind: ObjectKind,
        mesh: BodyMesh,
        endpoints: &AssetEndpoints,
        color: &HexColor,
        texture: Option<TextureRef>,
    ) -> Self {
        Self {
            kind,
            mesh: mesh.mesh_ref(endpoints),
            color: SurfaceColor::Hex(color.clone()),
            texture,
            transform: Mat4::IDENTITY,
        }
    }

    /// Equipped item rendered with its own mesh and texture.
    pub fn item(kind: ObjectKind, asset: &ResolvedAsset) -> Self {
        Self {
            kind,
            mesh: asset.mesh.clone(),
            color: SurfaceColor::Transparent,
            texture: asset.texture.clone(),
            transform: Mat4::IDENTITY,
        }
    }
}

/// Everything the exporter needs for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub camera: Camera,
    pub light: Light,
    pub size: u32,
    pub scale: f32,
}

impl Scene {
    /// Wrap assembled objects with the fixed thumbnail camera and light.
    pub fn thumbnail(objects: Vec<SceneObject>) -> Self {
        Self {
            objects,
            camera: Camera::thumbnail(),
            light: Light::thumbnail(),
            size: THUMBNAIL_SIZE,
            scale: 1.0,
        }
    }

    pub fn kinds(&self) -> Vec<ObjectKind> {
        self.objects.iter().map(|object| object.kind).collect()
    }
}
