//! Merge caller additions into the built-in list and drop exclusions.

use crate::rules::signature::Signature;

/// Build the effective rule list.
///
/// Built-ins whose source text equals some exclusion's source text are
/// removed; survivors keep their order and are followed by `additions` in the
/// order given. Exclusions apply to built-ins only. An exclusion that matches
/// nothing is ignored.
pub fn compose(
    builtins: &[Signature],
    additions: &[Signature],
    exclusions: &[Signature],
) -> Vec<Signature> {
    builtins
        .iter()
        .filter(|sig| !exclusions.iter().any(|ex| ex.source() == sig.source()))
        .chain(additions.iter())
        .cloned()
        .collect()
}
