//! Fixed-size batch draws ("10-pull").
use rand::Rng;
use std::sync::Arc;

use crate::constants::DEFAULT_DRAW_COUNT;
use crate::engine::DrawEngine;
use crate::error::{ArgumentError, GachaResult};
use crate::item::Drawable;

/// A batch drawer bound to one engine and one draw count.
///
/// ```
/// use std::sync::Arc;
/// use gacha_core::{Card, DrawEngine, DrawRng, MultiDraw};
///
/// let engine = Arc::new(DrawEngine::new(vec![
///     Card::new("c-1", "Slime", 90.0, "common"),
///     Card::new("ur-1", "Dragon", 10.0, "ultra_rare"),
/// ])?);
/// let ten_pull = MultiDraw::ten_pull(engine);
/// let cards = ten_pull.execute(&mut DrawRng::from_user_seed(7))?;
/// assert_eq!(cards.len(), 10);
/// # Ok::<(), gacha_core::GachaError>(())
/// ```
#[derive(Debug, Clone)]
pub struct MultiDraw<T> {
    engine: Arc<DrawEngine<T>>,
    draw_count: usize,
}

impl<T: Drawable> MultiDraw<T> {
    /// # Errors
    ///
    /// Returns `InvalidArgument` when `draw_count` is zero.
    pub fn new(engine: Arc<DrawEngine<T>>, draw_count: usize) -> GachaResult<Self> {
        if draw_count == 0 {
            return Err(ArgumentError::NonPositiveDrawCount.into());
        }
        Ok(Self { engine, draw_count })
    }

    #[must_use]
    pub const fn ten_pull(engine: Arc<DrawEngine<T>>) -> Self {
        Self {
            engine,
            draw_count: DEFAULT_DRAW_COUNT,
        }
    }

    /// # Errors
    ///
    /// Never fails for a constructed drawer; the count was checked up front.
    pub fn execute<R: Rng + ?Sized>(&self, rng: &mut R) -> GachaResult<Vec<&T>> {
        self.engine.draw_multiple(self.draw_count, rng)
    }

    /// Alias for [`MultiDraw::execute`].
    ///
    /// # Errors
    ///
    /// Same as `execute`.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> GachaResult<Vec<&T>> {
        self.execute(rng)
    }

    #[must_use]
    pub const fn draw_count(&self) -> usize {
        self.draw_count
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<DrawEngine<T>> {
        &self.engine
    }
}
