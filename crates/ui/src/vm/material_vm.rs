use quiz_core::model::{Material, MaterialId};

use crate::vm::time_fmt::format_date;

const EXCERPT_CHARS: usize = 150;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaterialCardVm {
    pub id: MaterialId,
    pub title: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub changed_str: String,
}

#[must_use]
pub fn map_material_card(material: &Material) -> MaterialCardVm {
    MaterialCardVm {
        id: material.id.clone(),
        title: material.title.clone(),
        excerpt: material.excerpt(EXCERPT_CHARS),
        tags: material.tags.clone(),
        changed_str: format_date(material.last_changed()),
    }
}

#[must_use]
pub fn map_material_cards<'a>(materials: impl IntoIterator<Item = &'a Material>) -> Vec<MaterialCardVm> {
    materials.into_iter().map(map_material_card).collect()
}

/// Tags as shown in the comma-separated form field.
#[must_use]
pub fn tags_field_value(tags: &[String]) -> String {
    tags.join(", ")
}
