use tangle_ioc::{resolve, ClassDescriptor, Container, Dependencies, Injectable, MetadataTable, Ref, Result};

struct CircularA {
  b: Ref<CircularB>,
}

impl CircularA {
  fn value(&self) -> Result<u32> {
    Ok(42 * self.b.get()?.multiplier())
  }
}

impl Injectable for CircularA {
  const NAME: &'static str = "CircularA";

  fn construct(deps: &mut Dependencies) -> Result<Self> {
    println!("Init A");
    Ok(CircularA {
      b: deps.next_ref()?,
    })
  }
}

struct CircularB {
  a: Ref<CircularA>,
}

impl CircularB {
  fn multiplier(&self) -> u32 {
    1
  }

  fn say_value(&self) -> Result<String> {
    Ok(format!("Answer = {}", self.a.get()?.value()?))
  }
}

impl Injectable for CircularB {
  const NAME: &'static str = "CircularB";

  fn construct(deps: &mut Dependencies) -> Result<Self> {
    println!("Init B");
    Ok(CircularB {
      a: deps.next_ref()?,
    })
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .init();

  let metadata = MetadataTable::from_yaml_str(
    r#"
CircularA: [CircularB]
CircularB: [CircularA]
"#,
  )?;
  let container = Container::new(metadata);
  container.bind_self(ClassDescriptor::of::<CircularA>());
  container.bind_self(ClassDescriptor::of::<CircularB>());

  // B is built first, while A is still on the resolution path, so B gets a
  // deferred reference to A.
  let a = resolve!(container, CircularA);
  let b = resolve!(container, CircularB);
  println!("B holds a deferred A: {}", b.a.is_deferred());

  println!("{}", b.say_value()?);
  println!("A.value() = {}", a.value()?);
  Ok(())
}
