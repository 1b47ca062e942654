pub use crate::battlefield::*;
pub use crate::blueprints::*;
pub use crate::c;
pub use crate::cell::*;
pub use crate::combat::*;
pub use crate::cover::*;
pub use crate::events::*;
pub use crate::obstacle::*;
pub use crate::rules::*;
pub use crate::sight::*;
