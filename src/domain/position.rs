//! Held-position tracking with weighted average cost.

/// A long position in one symbol. Quantity is always positive; the
/// ledger removes the position when it reaches zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: u64,
    pub average_cost: f64,
}

impl Position {
    pub fn open(symbol: String, quantity: u64, price: f64) -> Self {
        Position {
            symbol,
            quantity,
            average_cost: price,
        }
    }

    /// Add shares, recomputing the weighted average cost.
    pub fn add(&mut self, quantity: u64, price: f64) {
        let total_cost = self.quantity as f64 * self.average_cost + quantity as f64 * price;
        self.quantity += quantity;
        if self.quantity > 0 {
            self.average_cost = total_cost / self.quantity as f64;
        }
    }

    /// Remove shares. The caller must have checked `quantity <= self.quantity`.
    pub fn reduce(&mut self, quantity: u64) {
        self.quantity = self.quantity.saturating_sub(quantity);
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    /// Cost basis of `quantity` shares at the current average cost.
    pub fn cost_basis(&self, quantity: u64) -> f64 {
        quantity as f64 * self.average_cost
    }
}
