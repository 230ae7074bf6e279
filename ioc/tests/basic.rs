use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tangle_ioc::{
  resolve, ClassDescriptor, Container, Dependencies, Error, Injectable, MetadataTable, Result,
  Token,
};

// --- Test Fixtures ---

struct Logger {
  prefix: String,
}

impl Injectable for Logger {
  const NAME: &'static str = "Logger";

  fn construct(_: &mut Dependencies) -> Result<Self> {
    Ok(Logger {
      prefix: "<INFO>".to_string(),
    })
  }
}

struct Service {
  logger: Arc<Logger>,
}

impl Injectable for Service {
  const NAME: &'static str = "Service";

  fn construct(deps: &mut Dependencies) -> Result<Self> {
    Ok(Service {
      logger: deps.next()?,
    })
  }
}

fn service_metadata() -> MetadataTable {
  MetadataTable::new().with("Service", ["Logger"])
}

// --- Basic Tests ---

#[test]
fn test_service_shares_logger_singleton() {
  // Arrange
  let container = Container::new(service_metadata());
  container.bind("Logger", ClassDescriptor::of::<Logger>());
  container.bind("Service", ClassDescriptor::of::<Service>());

  // Act
  let service = container.get_as::<Service>("Service").unwrap();
  let logger = container.get_as::<Logger>("Logger").unwrap();

  // Assert
  assert_eq!(service.logger.prefix, "<INFO>");
  assert!(Arc::ptr_eq(&service.logger, &logger));
}

#[test]
fn test_get_is_idempotent() {
  let container = Container::new(service_metadata());
  container.bind_self(ClassDescriptor::of::<Logger>());
  container.bind_self(ClassDescriptor::of::<Service>());

  let r1 = container.get("Service").unwrap();
  let r2 = container.get("Service").unwrap();

  // Ensure it's a singleton by checking pointer equality.
  assert!(Arc::ptr_eq(&r1, &r2));
  assert_eq!(container.len(), 2);
}

#[test]
fn test_class_without_metadata_is_built_without_arguments() {
  static CALLS: AtomicUsize = AtomicUsize::new(0);

  let container = Container::new(MetadataTable::new());
  container.bind(
    "Clock",
    ClassDescriptor::new("SystemClock", |deps| {
      CALLS.fetch_add(1, Ordering::SeqCst);
      assert_eq!(deps.remaining(), 0);
      Ok(42u64)
    }),
  );

  let ticks = container.get_as::<u64>("Clock").unwrap();

  assert_eq!(*ticks, 42);
  assert_eq!(CALLS.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unbound_token_names_the_token_and_caches_nothing() {
  let container = Container::new(service_metadata());

  let err = container.get("Missing").unwrap_err();

  assert_eq!(err, Error::UnboundToken(Token::new("Missing")));
  assert_eq!(err.to_string(), "No binding was found for Missing");
  assert!(!container.is_resolved("Missing"));
  assert!(container.is_empty());
}

#[test]
fn test_unbound_dependency_fails_without_caching_siblings() {
  // `Logger` is resolved before `Mailer` fails; it must not be left behind.
  let metadata = MetadataTable::new().with("Service", ["Logger", "Mailer"]);
  let container = Container::new(metadata);
  container.bind_self(ClassDescriptor::of::<Logger>());
  container.bind_self(ClassDescriptor::of::<Service>());

  let err = container.get("Service").unwrap_err();

  assert_eq!(err, Error::UnboundToken(Token::new("Mailer")));
  assert!(!container.is_resolved("Logger"));
  assert!(!container.is_resolved("Service"));
  assert!(container.is_empty());
}

#[test]
fn test_constant_binding_passthrough() {
  let container = Container::new(MetadataTable::new());
  container.bind_value("answer", 42i32);

  let answer = container.get_as::<i32>("answer").unwrap();

  assert_eq!(*answer, 42);
  assert!(Arc::ptr_eq(&answer, &container.get_as::<i32>("answer").unwrap()));
}

#[test]
fn test_constant_binding_injected_into_class() {
  struct Mailer {
    sender: Arc<String>,
  }

  let metadata = MetadataTable::new().with("SmtpMailer", ["mail.sender"]);
  let container = Container::new(metadata);
  container.bind_value("mail.sender", String::from("noreply@example.com"));
  container.bind(
    "Mailer",
    ClassDescriptor::new("SmtpMailer", |deps| {
      Ok(Mailer {
        sender: deps.next()?,
      })
    }),
  );

  let mailer = container.get_as::<Mailer>("Mailer").unwrap();

  assert_eq!(*mailer.sender, "noreply@example.com");
}

#[test]
fn test_rebinding_before_get_uses_last_binding() {
  static FIRST: AtomicUsize = AtomicUsize::new(0);
  static SECOND: AtomicUsize = AtomicUsize::new(0);

  let container = Container::new(MetadataTable::new());
  container.bind(
    "Store",
    ClassDescriptor::new("MemoryStore", |_| {
      FIRST.fetch_add(1, Ordering::SeqCst);
      Ok("memory")
    }),
  );
  container.bind(
    "Store",
    ClassDescriptor::new("DiskStore", |_| {
      SECOND.fetch_add(1, Ordering::SeqCst);
      Ok("disk")
    }),
  );

  let store = container.get_as::<&'static str>("Store").unwrap();
  let again = container.get_as::<&'static str>("Store").unwrap();

  assert_eq!(*store, "disk");
  assert!(Arc::ptr_eq(&store, &again));
  assert_eq!(FIRST.load(Ordering::SeqCst), 0);
  assert_eq!(SECOND.load(Ordering::SeqCst), 1);
}

#[test]
fn test_rebinding_after_get_keeps_cached_instance() {
  let container = Container::new(MetadataTable::new());
  container.bind_value("level", 1u8);
  let before = container.get_as::<u8>("level").unwrap();

  container.bind_value("level", 2u8);
  let after = container.get_as::<u8>("level").unwrap();

  assert_eq!(*after, 1);
  assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn test_bind_self_uses_class_name() {
  let container = Container::new(MetadataTable::new());
  container.bind_self(ClassDescriptor::of::<Logger>());

  assert!(container.is_bound("Logger"));
  assert!(container.is_bound(Token::of::<Logger>()));
  assert!(container.get_as::<Logger>(&ClassDescriptor::of::<Logger>()).is_ok());
}

#[test]
fn test_get_as_reports_type_mismatch() {
  let container = Container::new(MetadataTable::new());
  container.bind_value("port", 8080u16);

  let err = container.get_as::<String>("port").unwrap_err();

  assert_eq!(
    err,
    Error::TypeMismatch {
      token: Token::new("port"),
      expected: std::any::type_name::<String>(),
    }
  );
}

#[test]
fn test_constructor_error_propagates() {
  let container = Container::new(MetadataTable::new());
  container.bind(
    "Database",
    ClassDescriptor::new("Database", |deps| -> Result<u32> {
      Err(Error::construction(deps.class(), "connection refused"))
    }),
  );

  let err = container.get("Database").unwrap_err();

  assert_eq!(err.to_string(), "Failed to construct Database: connection refused");
  assert!(!container.is_resolved("Database"));
}

#[test]
fn test_taking_more_arguments_than_declared() {
  let container = Container::new(MetadataTable::new());
  container.bind_self(ClassDescriptor::of::<Service>());

  let err = container.get("Service").unwrap_err();

  assert_eq!(
    err,
    Error::MissingDependency {
      class: Token::new("Service"),
      index: 0,
      declared: 0,
    }
  );
}

#[test]
fn test_resolve_macro() {
  let container = Container::new(service_metadata());
  container.bind_self(ClassDescriptor::of::<Logger>());
  container.bind_self(ClassDescriptor::of::<Service>());

  let service = resolve!(container, Service);
  let logger = resolve!(container, Logger, "Logger");

  assert!(Arc::ptr_eq(&service.logger, &logger));
}

#[test]
#[should_panic(expected = "Failed to resolve required service")]
fn test_resolve_macro_panics_on_missing_service() {
  let container = Container::new(MetadataTable::new());
  resolve!(container, Service);
}
