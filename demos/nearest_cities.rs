//! Example indexing cities by longitude and latitude.
//!
//! The k-d tree uses great-circle distances in meters, and a quadtree indexes the same cities by
//! a small box around each one.

use kdquad::kdtree::{DuplicateBehavior, KdTree};
use kdquad::quadtree::QuadTree;
use kdquad::{BoundingBox, GeographicMath};

const CITIES: [(&str, f64, f64); 10] = [
    ("London", -0.1276, 51.5072),
    ("Paris", 2.3522, 48.8566),
    ("Berlin", 13.4050, 52.5200),
    ("Madrid", -3.7038, 40.4168),
    ("Rome", 12.4964, 41.9028),
    ("Amsterdam", 4.9041, 52.3676),
    ("Vienna", 16.3738, 48.2082),
    ("New York", -74.0060, 40.7128),
    ("Tokyo", 139.6503, 35.6762),
    ("Sydney", 151.2093, -33.8688),
];

fn main() -> kdquad::Result<()> {
    println!("=== Nearest cities ===\n");

    let mut tree = KdTree::new_with_duplicate_behavior(2, GeographicMath, DuplicateBehavior::Skip);
    for (name, lon, lat) in CITIES {
        tree.add(&[lon, lat], name)?;
    }
    tree.balance();

    // Brussels
    let query = [4.3517, 50.8503];

    println!("1. Three closest cities to Brussels:");
    for node in tree.nearest_neighbours(&query, Some(3))? {
        let point = node.point();
        let meters = GeographicMath::distance_between_meters(query[0], query[1], point[0], point[1]);
        println!("   {:<10} {:>8.1} km", node.value(), meters / 1000.0);
    }

    println!("\n2. Cities within 1000 km of Brussels:");
    for node in tree.radial_search(&query, 1_000_000.0, None)? {
        println!("   {}", node.value());
    }

    println!("\n3. Cities in a box over western Europe:");
    let mut quadtree = QuadTree::new_with_max_items(2);
    for (name, lon, lat) in CITIES {
        quadtree.add(name, BoundingBox::from_point(lon, lat, 0.1))?;
    }
    let western_europe = BoundingBox::new(-10.0, 36.0, 10.0, 55.0)?;
    for name in quadtree.query_distinct(&western_europe) {
        println!("   {}", name);
    }

    Ok(())
}
