pub mod domain;
pub mod garde;
pub mod postgres;
pub mod telemetry;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockAlertDispatcher;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockDeviceRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockMotionEventRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockPasswordHasher;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockUserRepository;
