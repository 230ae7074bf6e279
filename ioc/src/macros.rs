//! Public macros for ergonomic service resolution.

/// Resolves a service from a container, panicking if it cannot be resolved.
///
/// Use it where a missing binding is a programming error. For a
/// non-panicking version, use `Container::get_as` directly.
///
/// # Panics
///
/// Panics with the resolution error if the token is unbound, the graph
/// fails to build, or the instance is not of the requested type.
///
/// # Examples
///
/// ```
/// use tangle_ioc::{resolve, ClassDescriptor, Container, MetadataTable};
///
/// let container = Container::new(MetadataTable::new());
/// container.bind("greeting", ClassDescriptor::new("Greeting", |_| Ok(String::from("hello"))));
///
/// let greeting = resolve!(container, String, "greeting");
/// assert_eq!(*greeting, "hello");
/// ```
#[macro_export]
macro_rules! resolve {
  // Arm for resolving an `Injectable` bound to its own name: resolve!(container, MyService)
  ($container:expr, $type:ty) => {
    $container
      .get_as::<$type>(<$type as $crate::Injectable>::NAME)
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required service {}: {}",
          std::any::type_name::<$type>(),
          err
        )
      })
  };

  // Arm for resolving by explicit token: resolve!(container, MyService, "token")
  ($container:expr, $type:ty, $token:expr) => {
    $container
      .get_as::<$type>($token)
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required service {} for token '{}': {}",
          std::any::type_name::<$type>(),
          $token,
          err
        )
      })
  };
}
