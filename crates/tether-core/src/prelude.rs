pub use crate::effects::{Dispose, effect, on_unmount};
pub use crate::effects_ext::{disposable_effect, side_effect};
pub use crate::error::HookError;
pub use crate::locals::{local, local_or_default, provide};
pub use crate::runtime::{Binding, remember, remember_with_key, use_state};
pub use crate::scope::{Scope, current_scope, scoped_effect};
pub use crate::signal::{Signal, SubId, signal};
