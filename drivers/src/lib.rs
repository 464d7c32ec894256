//! loadgen-drivers: Bundled protocol drivers for loadgen
//!
//! Drivers implement the `loadgen_core::Driver` trait and are selected by
//! name through a `DriverRegistry`. Registration is explicit — nothing in
//! this crate registers itself as a side effect of being linked in. Bring
//! your own driver by starting from `DriverRegistry::new()` and registering
//! it alongside (or instead of) the bundled ones.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod echo;
pub mod noop;

pub use echo::TcpEchoDriver;
pub use noop::NoopDriver;

use std::sync::Arc;

use loadgen_core::{Driver, DriverConfig, DriverError, DriverRegistry};

/// Registry pre-populated with the bundled drivers
///
/// Registered names: `noop` (in-process, no server required) and
/// `tcp-echo` (length-prefixed echo over TCP).
pub fn builtin_registry() -> DriverRegistry {
    let mut registry = DriverRegistry::new();

    registry.register(
        "noop",
        |config: &DriverConfig| -> Result<Arc<dyn Driver>, DriverError> {
            Ok(Arc::new(NoopDriver::from_config(config)))
        },
    );

    registry.register(
        "tcp-echo",
        |config: &DriverConfig| -> Result<Arc<dyn Driver>, DriverError> {
            Ok(Arc::new(TcpEchoDriver::from_config(config)))
        },
    );

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_names() {
        let registry = builtin_registry();
        assert_eq!(registry.names(), vec!["noop", "tcp-echo"]);
    }

    #[test]
    fn test_builtin_registry_creates_noop() {
        let registry = builtin_registry();
        let driver = registry
            .create("noop", &DriverConfig::default())
            .expect("factory failed");
        assert_eq!(driver.name(), "noop");
    }

    #[test]
    fn test_builtin_registry_unknown_driver() {
        let registry = builtin_registry();
        let err = match registry.create("grpc", &DriverConfig::default()) {
            Ok(_) => panic!("expected create to fail for unknown driver"),
            Err(e) => e,
        };
        assert!(matches!(err, DriverError::UnknownDriver { .. }));
    }
}
