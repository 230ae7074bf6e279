use std::panic;
use tangle_ioc::{resolve, Container, Error, MetadataTable};

struct UnregisteredService;

fn main() {
  let container = Container::new(MetadataTable::new());

  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a service that was never registered...");

  let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
    // This line will panic!
    let _service = resolve!(container, UnregisteredService, "UnregisteredService");
  }));

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the fallible `get()` method ---
  println!("\nNow, attempting to resolve using the fallible `get()` method...");

  match container.get("UnregisteredService") {
    Ok(_) => panic!("Should not have found the service!"),
    Err(Error::UnboundToken(token)) => println!("Correctly received an error for `{}`.", token),
    Err(other) => panic!("Unexpected error: {}", other),
  }
}
