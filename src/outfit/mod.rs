//! Outfit assembly: slot partitioning and candidate enumeration.
//!
//! Candidate policy: `top` and `bottom` gate generation. `shoes` and
//! `outerwear` join the product only when the wardrobe has them; otherwise
//! the candidate carries `None` for that slot. A wardrobe without footwear
//! therefore still yields outfits instead of collapsing to nothing.

pub mod scoring;

use crate::models::{ClothingItem, OutfitCandidate, Slot, SlotAssignment};

/// Default number of items kept per slot before taking the product.
pub const DEFAULT_CANDIDATES_PER_SLOT: usize = 3;

/// Partition items into outfit slots, preserving input order.
///
/// `None` entries and items whose body part has no slot (accessories,
/// unrecognized values) are dropped without error.
pub fn categorize(items: &[Option<ClothingItem>]) -> SlotAssignment {
    let mut slots = SlotAssignment::default();
    for item in items.iter().flatten() {
        if let Some(slot) = Slot::for_body_part(&item.tags.body_part) {
            slots.get_mut(slot).push(item.clone());
        }
    }
    slots
}

/// First `n` items as given. Positional, not a ranking.
pub fn top_n(items: &[ClothingItem], n: usize) -> &[ClothingItem] {
    &items[..items.len().min(n)]
}

/// Enumerate outfit combinations from a slot assignment.
///
/// Each slot is truncated to `per_slot` items, then the cartesian product
/// top × bottom [× shoes] [× outerwear] is emitted in lexicographic order.
/// Returns an empty vec when a required slot is empty.
pub fn generate_candidates(slots: &SlotAssignment, per_slot: usize) -> Vec<OutfitCandidate> {
    let tops = top_n(&slots.top, per_slot);
    let bottoms = top_n(&slots.bottom, per_slot);
    if tops.is_empty() || bottoms.is_empty() {
        return Vec::new();
    }

    let shoes = optional_choices(top_n(&slots.shoes, per_slot));
    let outerwear = optional_choices(top_n(&slots.outerwear, per_slot));

    let mut outfits =
        Vec::with_capacity(tops.len() * bottoms.len() * shoes.len() * outerwear.len());
    for top in tops {
        for bottom in bottoms {
            for shoe in &shoes {
                for outer in &outerwear {
                    outfits.push(OutfitCandidate::new(
                        top.clone(),
                        bottom.clone(),
                        shoe.cloned(),
                        outer.cloned(),
                    ));
                }
            }
        }
    }
    outfits
}

/// An empty optional slot contributes a single "absent" choice.
fn optional_choices(items: &[ClothingItem]) -> Vec<Option<&ClothingItem>> {
    if items.is_empty() {
        vec![None]
    } else {
        items.iter().map(Some).collect()
    }
}
