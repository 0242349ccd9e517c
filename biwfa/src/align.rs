//! Single-pass alignment keeping every front, followed by a backtrace.
use crate::{
    abort::AbortCheck,
    backtrace::backtrace,
    extend::Direction,
    search::Search,
    AlignError, Result,
};
use biwfa_types::{AlignmentForm, Cigar, Component, Diag, Penalties};
use log::trace;
use pa_types::Seq;

/// Aligns `a` and `b` starting in `component_begin` and ending in `component_end`.
/// The score of the returned cigar is the negated cost.
#[allow(clippy::too_many_arguments)]
pub fn align_single_pass(
    a: Seq,
    b: Seq,
    penalties: &Penalties,
    form: &AlignmentForm,
    component_begin: Component,
    component_end: Component,
    band: Option<(Diag, Diag)>,
    abort: &AbortCheck,
) -> Result<Cigar> {
    let form = form.clamped(a.len(), b.len());
    let mut search = Search::new(
        a,
        b,
        Direction::Forward,
        penalties,
        &form.leading(),
        component_begin,
        band,
        false,
    );
    let end = loop {
        if let Some(end) = search.end_reached(&form.trailing(), component_end) {
            break end;
        }
        if search.is_exhausted() {
            return Err(AlignError::Configuration(format!(
                "no alignment of lengths {} and {} fits in band {band:?}",
                a.len(),
                b.len()
            )));
        }
        search.checked_step(abort, 0)?;
    };
    let mut cigar = backtrace(&search, end);
    cigar.set_score(-search.score());
    trace!(
        "Single pass {}x{} {component_begin:?}->{component_end:?}: score {}",
        a.len(),
        b.len(),
        search.score()
    );
    Ok(cigar)
}
