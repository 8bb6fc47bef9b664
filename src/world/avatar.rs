//! Avatar customization state
//!
//! An [`AvatarDescriptor`] is the fully defaulted set of body colours and
//! equipped items for one render. It is built fresh for every request from the
//! flat attribute map the caller sent; absent or empty attributes are resolved
//! to explicit defaults here, so nothing downstream ever sees an unset field.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Skin colour used for any body part the request does not colour.
pub const DEFAULT_BODY_COLOR: &str = "f3b700";

/// Sentinel marking an unoccupied item slot.
pub const EMPTY_SLOT: &str = "none";

/// Number of independent hat slots rendered at once.
pub const HAT_SLOTS: usize = 6;

/// Flat request attributes, keyed by parameter name.
pub type Attributes = HashMap<String, String>;

/// Hex colour string as sent by the caller (no leading `#`).
///
/// Not validated; the exporter decides what to do with a malformed value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HexColor(String);

impl HexColor {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.is_empty() {
            Self::default()
        } else {
            Self(raw)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self(DEFAULT_BODY_COLOR.to_string())
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to a remote asset record.
///
/// Always populated: an empty input collapses to the `"none"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.is_empty() {
            Self::none()
        } else {
            Self(raw)
        }
    }

    pub fn none() -> Self {
        Self(EMPTY_SLOT.to_string())
    }

    /// True for the `"none"` sentinel (and the empty string, which `new`
    /// already folds into it).
    pub fn is_empty_slot(&self) -> bool {
        self.0.is_empty() || self.0 == EMPTY_SLOT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Colourable body parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Head,
    Torso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl BodyPart {
    pub const ALL: [BodyPart; 6] = [
        BodyPart::Head,
        BodyPart::Torso,
        BodyPart::LeftArm,
        BodyPart::RightArm,
        BodyPart::LeftLeg,
        BodyPart::RightLeg,
    ];

    /// Request parameter carrying this part's colour.
    pub fn color_key(&self) -> &'static str {
        match self {
            BodyPart::Head => "head_color",
            BodyPart::Torso => "torso_color",
            BodyPart::LeftArm => "leftArm_color",
            BodyPart::RightArm => "rightArm_color",
            BodyPart::LeftLeg => "leftLeg_color",
            BodyPart::RightLeg => "rightLeg_color",
        }
    }
}

/// Item slots. Hats are indexed from zero; slot `n` is parameter `hat_{n+1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemSlot {
    Hat(usize),
    Face,
    Tool,
    Shirt,
    TShirt,
    Pants,
}

impl ItemSlot {
    pub fn param_key(&self) -> String {
        match self {
            ItemSlot::Hat(index) => format!("hat_{}", index + 1),
            ItemSlot::Face => "face".to_string(),
            ItemSlot::Tool => "tool".to_string(),
            ItemSlot::Shirt => "shirt".to_string(),
            ItemSlot::TShirt => "tshirt".to_string(),
            ItemSlot::Pants => "pants".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BodyColors {
    pub head: HexColor,
    pub torso: HexColor,
    pub left_arm: HexColor,
    pub right_arm: HexColor,
    pub left_leg: HexColor,
    pub right_leg: HexColor,
}

impl BodyColors {
    pub fn get(&self, part: BodyPart) -> &HexColor {
        match part {
            BodyPart::Head => &self.head,
            BodyPart::Torso => &self.torso,
            BodyPart::LeftArm => &self.left_arm,
            BodyPart::RightArm => &self.right_arm,
            BodyPart::LeftLeg => &self.left_leg,
            BodyPart::RightLeg => &self.right_leg,
        }
    }

    fn get_mut(&mut self, part: BodyPart) -> &mut HexColor {
        match part {
            BodyPart::Head => &mut self.head,
            BodyPart::Torso => &mut self.torso,
            BodyPart::LeftArm => &mut self.left_arm,
            BodyPart::RightArm => &mut self.right_arm,
            BodyPart::LeftLeg => &mut self.left_leg,
            BodyPart::RightLeg => &mut self.right_leg,
        }
    }
}

/// Complete customization state for one render.
///
/// `Default` is the bare baseline avatar: default skin everywhere, every slot
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AvatarDescriptor {
    pub colors: BodyColors,
    pub hats: [ItemId; HAT_SLOTS],
    pub face: ItemId,
    pub tool: ItemId,
    pub shirt: ItemId,
    pub tshirt: ItemId,
    pub pants: ItemId,
}

impl AvatarDescriptor {
    /// Builds a descriptor from request attributes, defaulting every colour to
    /// [`DEFAULT_BODY_COLOR`] and every item slot to [`EMPTY_SLOT`] when the
    /// attribute is missing or empty.
    pub fn from_attributes(attributes: &Attributes) -> Self {
        let mut avatar = Self::default();

        for part in BodyPart::ALL {
            if let Some(raw) = attributes.get(part.color_key()) {
                *avatar.colors.get_mut(part) = HexColor::new(raw.as_str());
            }
        }

        for slot in Self::item_slots() {
            if let Some(raw) = attributes.get(&slot.param_key()) {
                *avatar.slot_mut(slot) = ItemId::new(raw.as_str());
            }
        }

        avatar
    }

    /// Every item slot in parameter order.
    pub fn item_slots() -> impl Iterator<Item = ItemSlot> {
        (0..HAT_SLOTS)
            .map(ItemSlot::Hat)
            .chain([
                ItemSlot::Face,
                ItemSlot::Tool,
                ItemSlot::Shirt,
                ItemSlot::TShirt,
                ItemSlot::Pants,
            ])
    }

    pub fn slot(&self, slot: ItemSlot) -> &ItemId {
        match slot {
            ItemSlot::Hat(index) => &self.hats[index],
            ItemSlot::Face => &self.face,
            ItemSlot::Tool => &self.tool,
            ItemSlot::Shirt => &self.shirt,
            ItemSlot::TShirt => &self.tshirt,
            ItemSlot::Pants => &self.pants,
        }
    }

    /// Panics on a hat index outside `0..HAT_SLOTS`.
    pub fn slot_mut(&mut self, slot: ItemSlot) -> &mut ItemId {
        match slot {
            ItemSlot::Hat(index) => &mut self.hats[index],
            ItemSlot::Face => &mut self.face,
            ItemSlot::Tool => &mut self.tool,
            ItemSlot::Shirt => &mut self.shirt,
            ItemSlot::TShirt => &mut self.tshirt,
            ItemSlot::Pants => &mut self.pants,
        }
    }

    /// Number of occupied item slots.
    pub fn equipped_count(&self) -> usize {
        Self::item_slots()
            .filter(|slot| !self.slot(*slot).is_empty_slot())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_attributes_give_baseline() {
        let avatar = AvatarDescriptor::from_attributes(&Attributes::new());

        assert_eq!(avatar, AvatarDescriptor::default());
        for part in BodyPart::ALL {
            assert_eq!(avatar.colors.get(part).as_str(), DEFAULT_BODY_COLOR);
        }
        for slot in AvatarDescriptor::item_slots() {
            assert_eq!(avatar.slot(slot).as_str(), EMPTY_SLOT);
        }
        assert_eq!(avatar.equipped_count(), 0);
    }

    #[test]
    fn test_empty_strings_are_defaulted() {
        let avatar = AvatarDescriptor::from_attributes(&attrs(&[
            ("head_color", ""),
            ("hat_3", ""),
            ("tool", ""),
        ]));

        assert_eq!(avatar.colors.head.as_str(), DEFAULT_BODY_COLOR);
        assert_eq!(avatar.hats[2].as_str(), EMPTY_SLOT);
        assert_eq!(avatar.tool.as_str(), EMPTY_SLOT);
    }

    #[test]
    fn test_attributes_land_in_their_slots() {
        let avatar = AvatarDescriptor::from_attributes(&attrs(&[
            ("torso_color", "ff0000"),
            ("leftArm_color", "00ff00"),
            ("rightArm_color", "0000ff"),
            ("hat_1", "11"),
            ("hat_6", "16"),
            ("face", "20"),
            ("tool", "30"),
            ("shirt", "40"),
            ("tshirt", "50"),
            ("pants", "60"),
            ("unrelated", "ignored"),
        ]));

        assert_eq!(avatar.colors.torso.as_str(), "ff0000");
        assert_eq!(avatar.colors.left_arm.as_str(), "00ff00");
        assert_eq!(avatar.colors.right_arm.as_str(), "0000ff");
        assert_eq!(avatar.colors.head.as_str(), DEFAULT_BODY_COLOR);
        assert_eq!(avatar.hats[0].as_str(), "11");
        assert_eq!(avatar.hats[5].as_str(), "16");
        assert!(avatar.hats[1].is_empty_slot());
        assert_eq!(avatar.face.as_str(), "20");
        assert_eq!(avatar.tool.as_str(), "30");
        assert_eq!(avatar.shirt.as_str(), "40");
        assert_eq!(avatar.tshirt.as_str(), "50");
        assert_eq!(avatar.pants.as_str(), "60");
        assert_eq!(avatar.equipped_count(), 7);
    }

    #[test]
    fn test_malformed_values_pass_through() {
        let avatar = AvatarDescriptor::from_attributes(&attrs(&[
            ("head_color", "not-a-colour"),
            ("hat_2", "../weird id"),
        ]));

        assert_eq!(avatar.colors.head.as_str(), "not-a-colour");
        assert_eq!(avatar.hats[1].as_str(), "../weird id");
    }

    #[test]
    fn test_explicit_none_is_empty_slot() {
        assert!(ItemId::new("none").is_empty_slot());
        assert!(ItemId::new("").is_empty_slot());
        assert!(!ItemId::new("0").is_empty_slot());
    }
}
