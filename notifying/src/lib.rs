/*!
Value cells that report every change to a central registry.

Fields of an existing in-memory structure are wrapped in cells; the structure is
read and written as before, and each assignment produces a `(path, text)`
notification for the registry's listener. The registry also accepts inbound
textual updates addressed by dotted key path.

# Design requirements:
- Reads never notify. Every assignment notifies exactly once, with the new value.
- Inbound (textual) updates are silent, so an external writer does not see its own change echoed back.
- Parents are registered before their children; a node's path is the keys along its parent chain.
- The registry holds only weak references. The application owns the cells.
- `Observable` must stay dyn object safe.

# Basic usage

```rust
use notifying::*;

let registry = Registry::new();
let i1 = ScalarCell::<u16>::new(registry.root(), "i1");
let a2 = ArrayCell::<u32, 4>::new(registry.root(), "a2");

i1.set(42);
// i1 updated, new value: 42
a2.set(1, 6).unwrap();
// a2 updated, new value: [0 6 0 0 ]

// external writers address fields by path; no notification is sent
assert!(registry.update("i1", "45").unwrap());
assert_eq!(i1.get(), 45);
```

# Custom listeners

```rust
use notifying::*;
use std::sync::{Arc, Mutex};

let seen = Arc::new(Mutex::new(Vec::new()));
let registry = {
    let seen = seen.clone();
    Registry::with_listener(move |path: &KeyPath, value: &str| seen.lock().unwrap().push(format!("{path}={value}")))
};

let s1 = Composite::new(registry.root(), "s1");
let d1 = ScalarCell::with_value(s1.scope(), "d1", 1.0f64);
d1.set(5.5);
registry.notify_all();

assert_eq!(*seen.lock().unwrap(), ["s1.d1=5.5", "s1.d1=5.5"]);
```
*/

mod array;
mod codec;
mod composite;
pub mod error;
mod listener;
mod observable;
mod path;
mod registry;
mod scalar;

pub use array::*;
pub use codec::*;
pub use composite::*;
pub use listener::*;
pub use observable::*;
pub use path::*;
pub use registry::*;
pub use scalar::*;
