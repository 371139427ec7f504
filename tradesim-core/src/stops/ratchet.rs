/// Ratchet invariant enforcement
///
/// **Core Rule:** a long trailing stop may rise, never fall (even if volatility
/// expands or a swing low is broken).
///
/// This prevents the "volatility trap" where an expanding ATR would widen the
/// stop after a favorable move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ratchet {
    /// Current stop level (high-water mark)
    level: Option<f64>,
}

impl Ratchet {
    pub fn new() -> Self {
        Self { level: None }
    }

    /// Apply the ratchet to a proposed stop level.
    ///
    /// The first finite proposal initializes the level; later calls keep
    /// `max(current, proposed)`. Non-finite proposals are ignored, so the
    /// result is `None` until a usable stop has been proposed.
    ///
    /// # Example
    /// ```
    /// use tradesim_core::stops::Ratchet;
    ///
    /// let mut ratchet = Ratchet::new();
    /// assert_eq!(ratchet.apply(95.0), Some(95.0));
    ///
    /// // Tightening: $95 → $100 (allowed)
    /// assert_eq!(ratchet.apply(100.0), Some(100.0));
    ///
    /// // Loosening: $100 → $90 (blocked, stays at $100)
    /// assert_eq!(ratchet.apply(90.0), Some(100.0));
    /// ```
    pub fn apply(&mut self, proposed: f64) -> Option<f64> {
        if !proposed.is_finite() {
            return self.level;
        }
        let next = match self.level {
            Some(current) if current >= proposed => current,
            _ => proposed,
        };
        self.level = Some(next);
        self.level
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }
}
