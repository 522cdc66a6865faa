mod candle;

pub use candle::{Candle, OhlcvSeries};
