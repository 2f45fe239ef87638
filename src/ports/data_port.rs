//! Data access port trait.

use crate::domain::bar::Bar;
use crate::domain::error::QuantsimError;
use chrono::NaiveDate;

pub trait DataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, QuantsimError>;

    fn list_symbols(&self) -> Result<Vec<String>, QuantsimError>;
}
