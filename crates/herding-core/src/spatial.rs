use crate::vec2::Vec2;
use rstar::{RTree, RTreeObject, AABB};

/// A point in the index carrying the index of the agent it came from.
#[derive(Clone, Debug)]
pub struct Location {
    pub index: usize,
    pub position: [f64; 2],
}

impl RTreeObject for Location {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Build an R*-tree over agent positions via bulk_load.
pub fn build_index(positions: impl IntoIterator<Item = Vec2>) -> RTree<Location> {
    let locations: Vec<Location> = positions
        .into_iter()
        .enumerate()
        .map(|(index, p)| Location {
            index,
            position: [p.x, p.y],
        })
        .collect();
    RTree::bulk_load(locations)
}

/// Indices of all points within `radius` of `center`.
/// Uses an AABB envelope query then filters by Euclidean distance.
pub fn query_radius(tree: &RTree<Location>, center: Vec2, radius: f64) -> Vec<usize> {
    let envelope = AABB::from_corners(
        [center.x - radius, center.y - radius],
        [center.x + radius, center.y + radius],
    );
    let r_sq = radius * radius;

    tree.locate_in_envelope(&envelope)
        .filter(|loc| {
            let dx = loc.position[0] - center.x;
            let dy = loc.position[1] - center.y;
            dx * dx + dy * dy <= r_sq
        })
        .map(|loc| loc.index)
        .collect()
}
