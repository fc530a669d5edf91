mod core_shell_sphere;
mod ellipsoid;
mod lorentz;
mod multilayer_vesicle;
mod sphere;
mod triaxial_ellipsoid;

pub use core_shell_sphere::CoreShellSphere;
pub use ellipsoid::Ellipsoid;
pub use lorentz::Lorentz;
pub use multilayer_vesicle::MultilayerVesicle;
pub use sphere::Sphere;
pub use triaxial_ellipsoid::TriaxialEllipsoid;
