//! Weighted draw engine.
use log::{debug, trace};
use rand::Rng;
use std::collections::HashMap;

use crate::error::{ArgumentError, ConfigurationError, GachaResult};
use crate::item::Drawable;
use crate::numbers::percent_of;

/// Immutable snapshot of a catalog plus its precomputed total weight.
///
/// The engine owns its items, so mutating the collection it was built from
/// has no effect on later draws. It holds no interior mutability and can be
/// shared across threads behind an `Arc`; randomness comes in per call.
#[derive(Debug, Clone)]
pub struct DrawEngine<T> {
    items: Vec<T>,
    total_weight: f64,
}

impl<T: Drawable> DrawEngine<T> {
    /// Materialize `items` into a validated snapshot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the catalog is empty, any weight is
    /// NaN or infinite, any weight is not strictly positive, or the weights
    /// sum past the finite range.
    pub fn new<I>(items: I) -> GachaResult<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let items: Vec<T> = items.into_iter().collect();
        validate_items(&items)?;

        let total_weight = items.iter().map(Drawable::weight).sum::<f64>();
        if !total_weight.is_finite() {
            return Err(ConfigurationError::NonFiniteTotal.into());
        }

        debug!(
            "draw engine ready: {} items, total weight {total_weight}",
            items.len()
        );
        Ok(Self {
            items,
            total_weight,
        })
    }

    /// Pick one item with probability proportional to its weight.
    ///
    /// Rolls `r` in `[0, total_weight)` and returns the first item whose
    /// running weight sum exceeds `r`. When float accumulation leaves the
    /// walk short of `r`, the last item is returned.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        let roll = rng.gen_range(0.0..self.total_weight);
        let mut current = 0.0;
        for item in &self.items {
            current += item.weight();
            if roll < current {
                return item;
            }
        }

        trace!(
            "weighted walk ended at {current} for roll {roll}; falling back to last item"
        );
        // Non-empty by construction.
        &self.items[self.items.len() - 1]
    }

    /// Perform `count` independent draws, in order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `count` is zero.
    pub fn draw_multiple<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> GachaResult<Vec<&T>> {
        if count == 0 {
            return Err(ArgumentError::NonPositiveDrawCount.into());
        }
        Ok((0..count).map(|_| self.draw(rng)).collect())
    }

    /// Draw chance of each item as a percentage rounded to two decimals.
    #[must_use]
    pub fn probabilities(&self) -> HashMap<T::Id, f64> {
        self.items
            .iter()
            .map(|item| {
                (
                    item.id().clone(),
                    percent_of(item.weight(), self.total_weight),
                )
            })
            .collect()
    }

    /// Items whose rarity tag matches `tag`, ignoring case and surrounding whitespace.
    pub fn items_with_rarity<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a T> + 'a {
        let wanted = tag.trim();
        self.items
            .iter()
            .filter(move |item| item.rarity().trim().eq_ignore_ascii_case(wanted))
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a constructed engine; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn total_weight(&self) -> f64 {
        self.total_weight
    }
}

fn validate_items<T: Drawable>(items: &[T]) -> Result<(), ConfigurationError> {
    if items.is_empty() {
        return Err(ConfigurationError::EmptyCatalog);
    }
    if !items.iter().all(|item| item.weight().is_finite()) {
        return Err(ConfigurationError::UnusableWeight);
    }
    if !items.iter().all(|item| item.weight() > 0.0) {
        return Err(ConfigurationError::NonPositiveWeight);
    }
    Ok(())
}
