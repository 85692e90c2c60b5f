//! # iftl-math: Fixed-point reward math.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! - **[`Quad`]**: a binary floating-point number with a 128-bit significand
//!   and the exponent range of IEEE 754 binary128. Every operation truncates
//!   toward zero, so results are bit-identical on every platform.
//! - **[`RewardEngine`]**: the reward minted on lock release,
//!   `principal * multiplier / exp(elapsed * ln(1 + rate))`.

pub mod quad;
pub mod reward;

pub use quad::{Quad, mul_div_floor};
pub use reward::{RewardEngine, compute_reward};
