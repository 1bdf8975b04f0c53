mod call;
mod deltas;

pub use {call::Call, deltas::Deltas};
