use core_types::{PriceBar, Timeframe};

/// Percentage change of the latest close over `timeframe`.
///
/// Daily, weekly and monthly compare against the close 1, 5 and 21 bars back;
/// yearly compares against the first bar. Returns `None` when the history is
/// too short or the base close is zero.
pub fn price_change(bars: &[PriceBar], timeframe: Timeframe) -> Option<f64> {
    let latest = bars.last()?.close;
    let base = match timeframe.lookback() {
        Some(back) => bars.len().checked_sub(back + 1).map(|i| bars[i].close)?,
        None if bars.len() >= 2 => bars[0].close,
        None => return None,
    };

    if base == 0.0 {
        return None;
    }
    Some((latest - base) / base * 100.0)
}
