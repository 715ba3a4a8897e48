mod sphere;
pub mod validation;

pub use sphere::*;
pub use validation::{validate_mesh, MeshValidation};
