pub mod numeric;
pub mod interval;
pub mod ray;
pub mod bbox;
pub mod node;
pub mod builder;
pub mod acceleration;
pub mod traverser;

// Demo collaborators: sphere primitive, scene description, camera, output
pub mod shapes;
pub mod json_parser;
pub mod scene;
pub mod camera;
pub mod image;
pub mod renderer;

pub mod prelude;

pub use acceleration::{BVH, BVHStats};
pub use bbox::{BBox, BoxConverter};
pub use builder::{BuildConfig, SplitMethod};
pub use node::Node;
pub use ray::{Intersection, Ray};
pub use traverser::{intersector_fn, linear_scan, Intersector, Traverser};
