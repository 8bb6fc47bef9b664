//! Scene object assembly
//!
//! Resolution and ordering are split: [`SceneAssembler::resolve_slots`] looks
//! up every slot concurrently, then [`compose`] lays the results out in the
//! fixed layering order. Completion order of the lookups never affects the
//! output.
//!
//! Order: torso, left arm, left leg, right leg, [t-shirt], head, [hats in slot
//! order], [tool], arm.

use super::{BodyMesh, ObjectKind, SceneObject, SurfaceColor};
use crate::networking::assets::{AssetEndpoints, AssetResolver, ResolvedAsset, TextureRef};
use crate::world::{AvatarDescriptor, HAT_SLOTS};
use glam::Mat4;
use std::sync::Arc;
use tracing::debug;

/// Per-slot resolution results for one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSlots {
    pub shirt: Option<TextureRef>,
    /// The tool-clause arm looks the shirt up on its own.
    pub arm_shirt: Option<TextureRef>,
    pub pants: Option<TextureRef>,
    pub tshirt: Option<TextureRef>,
    /// Always present: falls back to the default face.
    pub face: TextureRef,
    pub hats: [Option<ResolvedAsset>; HAT_SLOTS],
    pub tool: Option<ResolvedAsset>,
}

#[derive(Debug, Clone)]
pub struct SceneAssembler {
    resolver: Arc<AssetResolver>,
}

impl SceneAssembler {
    pub fn new(resolver: Arc<AssetResolver>) -> Self {
        Self { resolver }
    }

    pub async fn assemble(&self, avatar: &AvatarDescriptor) -> Vec<SceneObject> {
        let slots = self.resolve_slots(avatar).await;
        let objects = compose(avatar, &slots, self.resolver.endpoints());
        debug!("Assembled {} scene objects", objects.len());
        objects
    }

    /// Resolve every slot of `avatar` concurrently. No caching: a repeated
    /// identifier is looked up once per slot it occupies.
    pub async fn resolve_slots(&self, avatar: &AvatarDescriptor) -> ResolvedSlots {
        let resolver = &self.resolver;
        let [hat1, hat2, hat3, hat4, hat5, hat6] = &avatar.hats;

        let (shirt, arm_shirt, pants, tshirt, face, tool, r1, r2, r3, r4, r5, r6) = tokio::join!(
            resolver.resolve_texture(&avatar.shirt),
            resolver.resolve_texture(&avatar.shirt),
            resolver.resolve_texture(&avatar.pants),
            resolver.resolve_texture(&avatar.tshirt),
            resolver.resolve_face(&avatar.face),
            resolver.resolve(&avatar.tool),
            resolver.resolve(hat1),
            resolver.resolve(hat2),
            resolver.resolve(hat3),
            resolver.resolve(hat4),
            resolver.resolve(hat5),
            resolver.resolve(hat6),
        );

        ResolvedSlots {
            shirt: shirt.resolved(),
            arm_shirt: arm_shirt.resolved(),
            pants: pants.resolved(),
            tshirt: tshirt.resolved(),
            face,
            hats: [
                r1.resolved(),
                r2.resolved(),
                r3.resolved(),
                r4.resolved(),
                r5.resolved(),
                r6.resolved(),
            ],
            tool: tool.resolved(),
        }
    }
}

/// Lay out resolved slots in layering order.
pub fn compose(avatar: &AvatarDescriptor, slots: &ResolvedSlots, endpoints: &AssetEndpoints) -> Vec<SceneObject> {
    let colors = &avatar.colors;
    let mut objects = Vec::with_capacity(8 + HAT_SLOTS);

    objects.push(SceneObject::body(
        ObjectKind::Torso,
        BodyMesh::Torso,
        endpoints,
        &colors.torso,
        slots.shirt.clone(),
    ));
    // The left arm mesh takes the right-arm colour, and the tool-clause arm
    // below takes the left-arm colour. Callers depend on this pairing.
    objects.push(SceneObject::body(
        ObjectKind::LeftArm,
        BodyMesh::LeftArm,
        endpoints,
        &colors.right_arm,
        slots.shirt.clone(),
    ));
    objects.push(SceneObject::body(
        ObjectKind::LeftLeg,
        BodyMesh::LeftLeg,
        endpoints,
        &colors.left_leg,
        slots.pants.clone(),
    ));
    objects.push(SceneObject::body(
        ObjectKind::RightLeg,
        BodyMesh::RightLeg,
        endpoints,
        &colors.right_leg,
        slots.pants.clone(),
    ));

    // Keyed on the slot, not the lookup: a failed t-shirt still gets the
    // overlay mesh, untextured.
    if !avatar.tshirt.is_empty_slot() {
        objects.push(SceneObject {
            kind: ObjectKind::TShirt,
            mesh: BodyMesh::TShirt.mesh_ref(endpoints),
            color: SurfaceColor::Transparent,
            texture: slots.tshirt.clone(),
            transform: Mat4::IDENTITY,
        });
    }

    objects.push(SceneObject::body(
        ObjectKind::Head,
        BodyMesh::Head,
        endpoints,
        &colors.head,
        Some(slots.face.clone()),
    ));

    for (index, hat) in slots.hats.iter().enumerate() {
        if let Some(asset) = hat {
            objects.push(SceneObject::item(ObjectKind::Hat(index), asset));
        }
    }

    tool_clause(avatar, slots, endpoints, &mut objects);
    objects
}

/// Append the optional tool and the right arm.
///
/// The holding pose depends only on the tool slot being occupied, not on the
/// tool resolving.
fn tool_clause(
    avatar: &AvatarDescriptor,
    slots: &ResolvedSlots,
    endpoints: &AssetEndpoints,
    objects: &mut Vec<SceneObject>,
) {
    let arm_mesh = if avatar.tool.is_empty_slot() {
        BodyMesh::RightArm
    } else {
        if let Some(tool) = &slots.tool {
            objects.push(SceneObject::item(ObjectKind::Tool, tool));
        }
        BodyMesh::ArmHold
    };

    objects.push(SceneObject::body(
        ObjectKind::Arm,
        arm_mesh,
        endpoints,
        &avatar.colors.left_arm,
        slots.arm_shirt.clone(),
    ));
}
