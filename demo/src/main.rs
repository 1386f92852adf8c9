use std::str::FromStr;

use notifying::{ArrayCell, Composite, Registry, ScalarCell, Scope, TextCodec, error::ParseError};
use tracing::{Level, info};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Color {
    #[default]
    Red,
    Blue,
    White,
    Yellow,
    Black,
}

impl TextCodec for Color {
    fn parse_text(text: &str) -> Result<Self, ParseError> {
        match text.trim() {
            "0" => Ok(Color::Red),
            "1" => Ok(Color::Blue),
            "2" => Ok(Color::White),
            "3" => Ok(Color::Yellow),
            "4" => Ok(Color::Black),
            _ => Err(ParseError::new::<Color>(text)),
        }
    }
    fn format_text(&self) -> String { (*self as i32).to_string() }
}

struct S1 {
    node: Composite,
    i1: i32,
    d1: ScalarCell<f64>,
    af1: ArrayCell<f32, 7>,
}

impl S1 {
    fn new(scope: Scope<'_>, key: &str) -> Self {
        let node = Composite::new(scope, key);
        let d1 = ScalarCell::with_value(node.scope(), "d1", 1.0);
        let af1 = ArrayCell::new(node.scope(), "af1");
        S1 { node, i1: 0, d1, af1 }
    }
}

/// A C-style structure where only some fields are observed
struct Values {
    i1: ScalarCell<u16>,
    f1: ScalarCell<f32>,
    i2: ScalarCell<i32>,
    d1: ScalarCell<f64>,
    e1: Color,
    e2: ScalarCell<Color>,
    a1: [u32; 4],
    a2: ArrayCell<u32, 4>,
    s1: S1,
}

impl Values {
    fn new(registry: &Registry) -> Self {
        let scope = registry.root();
        Values {
            i1: ScalarCell::new(scope, "i1"),
            f1: ScalarCell::new(scope, "f1"),
            i2: ScalarCell::new(scope, "i2"),
            d1: ScalarCell::new(scope, "d1"),
            e1: Color::Red,
            e2: ScalarCell::with_value(scope, "e2", Color::Red),
            a1: [0; 4],
            a2: ArrayCell::new(scope, "a2"),
            s1: S1::new(scope, "s1"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let level = std::env::var("LOG_LEVEL").ok().map(|l| Level::from_str(&l)).transpose()?.unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let registry = Registry::new();
    let mut values = Values::new(&registry);

    // every observed field reports its initial value
    registry.notify_all();

    println!("Update some values");
    values.i1.set(42);
    values.d1.set(6.555);
    values.f1.set(0.33);
    values.i2.set(-56);
    values.e1 = Color::Black;
    values.e2.set(Color::Blue);

    values.a1[0] = 5;
    values.a2[1].set(6);

    values.s1.i1 = 5;
    values.s1.d1.set(5.5);
    values.s1.af1[0].set(3.3);

    // reading back sends nothing
    let i = values.i1.get();
    let d = values.s1.d1.get();
    let f = values.s1.af1.get(0)?;
    info!(i, d, f, e1 = ?values.e1, a1 = ?values.a1, s1_i1 = values.s1.i1, "read back");

    if values.i1 == 42 {
        println!("Comparison works");
    }

    println!("Again send all updates");
    registry.notify_all();

    let applied = registry.update("i1", "45")?;
    info!(applied, i1 = values.i1.get(), "external update");
    info!("{}", values.s1.node);

    Ok(())
}
