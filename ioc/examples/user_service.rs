use parking_lot::Mutex;
use std::sync::Arc;
use tangle_ioc::{resolve, ClassDescriptor, Container, Dependencies, Injectable, MetadataTable, Result};

// --- Domain ---

struct ConsoleLogger;

impl ConsoleLogger {
  fn log(&self, message: &str) {
    tracing::info!("{}", message);
  }
}

struct ConsoleMailer;

impl ConsoleMailer {
  fn send_mail(&self, email: &str, subject: &str, content: &str) -> bool {
    println!(
      "Sent mail to {} (\"{}\"), body is {} bytes.",
      email,
      subject,
      content.len()
    );
    true
  }
}

struct User {
  email: String,
  fullname: String,
}

struct UserRepository {
  users: Mutex<Vec<User>>,
}

impl UserRepository {
  fn save(&self, user: User) {
    println!("Saved user {}", user.email);
    self.users.lock().push(user);
  }
}

impl Injectable for UserRepository {
  const NAME: &'static str = "UserRepository";

  fn construct(_: &mut Dependencies) -> Result<Self> {
    Ok(UserRepository {
      users: Mutex::new(Vec::new()),
    })
  }
}

struct UserService {
  repository: Arc<UserRepository>,
  mailer: Arc<ConsoleMailer>,
  logger: Arc<ConsoleLogger>,
}

impl UserService {
  fn register(&self, fullname: &str, email: &str) {
    self.repository.save(User {
      email: email.to_string(),
      fullname: fullname.to_string(),
    });
    self.mailer.send_mail(
      email,
      "Welcome to our app!",
      "Here is your register email confirmation",
    );
    self
      .logger
      .log(&format!("Registered new user {} ({})", fullname, email));
  }
}

impl Injectable for UserService {
  const NAME: &'static str = "UserService";

  fn construct(deps: &mut Dependencies) -> Result<Self> {
    Ok(UserService {
      repository: deps.next()?,
      mailer: deps.next()?,
      logger: deps.next()?,
    })
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
    )
    .init();

  // Normally produced by a code generator; written by hand here.
  let metadata = MetadataTable::new().with("UserService", ["UserRepository", "IMailer", "ILogger"]);
  let container = Container::new(metadata);

  container.bind("ILogger", ClassDescriptor::new("ConsoleLogger", |_| Ok(ConsoleLogger)));
  container.bind("IMailer", ClassDescriptor::new("ConsoleMailer", |_| Ok(ConsoleMailer)));
  container.bind_self(ClassDescriptor::of::<UserRepository>());
  container.bind_self(ClassDescriptor::of::<UserService>());

  if let Err(err) = container.validate() {
    eprintln!("Container is not fully wired: {}", err);
    return;
  }

  let service = resolve!(container, UserService);
  service.register("Ada Lovelace", "ada@example.com");
  service.register("Alan Turing", "alan@example.com");

  let repository = resolve!(container, UserRepository);
  let users = repository.users.lock();
  println!("Repository now holds {} users:", users.len());
  for user in users.iter() {
    println!("  {} <{}>", user.fullname, user.email);
  }
  drop(users);

  println!("Released {} instances.", container.dispose());
}
