//! Post-generation mixin merge boundary

use crate::settings::ReverseTarget;
use crate::ReverseError;

/// Merges supplementary definitions into already generated files
///
/// Implementations locate mixin sources under `target.mixin_dir_path` and
/// rewrite the files in `target.output_dir` in place. Every failure is
/// returned rather than raised so that one bad merge never hides the others.
pub trait MixinApplier: Send + Sync {
    fn apply(&self, target: &ReverseTarget) -> Vec<ReverseError>;
}

impl<F> MixinApplier for F
where
    F: Fn(&ReverseTarget) -> Vec<ReverseError> + Send + Sync,
{
    fn apply(&self, target: &ReverseTarget) -> Vec<ReverseError> {
        self(target)
    }
}
