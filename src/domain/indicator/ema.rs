//! Exponential Moving Average.
//!
//! k = 2/(span+1), seeded with the first close, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! No warm-up truncation: every input carries a value. MACD builds its
//! lines and signal from this.

/// Recursive EMA over raw values, seeded by the first element.
pub fn ema_values(input: &[f64], span: usize) -> Vec<f64> {
    let k = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(input.len());
    let mut iter = input.iter();

    if let Some(&first) = iter.next() {
        let mut ema = first;
        out.push(ema);
        for &value in iter {
            ema = value * k + ema * (1.0 - k);
            out.push(ema);
        }
    }

    out
}
