//! Single-threaded shared ownership of heap values.
//!
//! [`Shared`] is a reference-counted owning handle: clones are co-owners of one value and the last one to go
//! destroys it, exactly once, as the type it was allocated with. [`Unique`] is the exclusive counterpart.
//! The [`cast`] functions build co-owners that view the same value as another type.
//!
//! Counting is not atomic. Neither handle type can cross threads.
//!
//! ```
//! use shared_owner::*;
//!
//! trait Shape : AsAny { fn area(&self) -> f64; }
//! struct Square(f64);
//! impl Shape for Square { fn area(&self) -> f64 { self.0 * self.0 } }
//!
//! let square = Shared::new(Square(2.0));
//! let shape = static_pointer_cast::<dyn Shape, _, _>(&square, |s| s);
//! assert_eq!(shape.use_count(), 2);
//! assert_eq!(shape.area(), 4.0);
//!
//! let back = dynamic_pointer_cast::<Square, _>(&shape);
//! assert!(Shared::ptr_eq(&back, &square));
//! assert_eq!(square.use_count(), 3);
//! ```

pub mod error;
pub use crate::error::*;

pub mod ref_count;
pub use crate::ref_count::*;

pub mod unique;
pub use crate::unique::*;

pub mod shared;
pub use crate::shared::{Shared, swap};

pub mod cast;
pub use crate::cast::*;
