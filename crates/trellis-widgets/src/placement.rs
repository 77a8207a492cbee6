#![forbid(unsafe_code)]

//! Positioning of floating elements (tooltips, popovers) next to a trigger.

use trellis_core::dom::{Document, ElementId};
use trellis_core::geometry::{Rect, Side};

/// Place `floating` on `side` of `anchor`, `offset` units away.
///
/// The floating element keeps the size the host measured for it (zero if
/// never measured). The resulting box is stored as the element's rect and
/// mirrored into its inline `style`. Returns `None` when either element is
/// missing.
pub fn place(
    doc: &mut Document,
    floating: ElementId,
    anchor: ElementId,
    side: Side,
    offset: i32,
) -> Option<Rect> {
    let anchor_rect = doc.rect(anchor)?;
    let size = doc.rect(floating)?.size();
    let rect = side.place(anchor_rect, size, offset);
    doc.set_rect(floating, rect);
    doc.set_attr(
        floating,
        "style",
        format!("top: {}px; left: {}px;", rect.y, rect.x),
    );
    doc.set_attr(floating, "data-placement", side.as_str());
    Some(rect)
}
