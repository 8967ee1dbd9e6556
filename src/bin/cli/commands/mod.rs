pub mod new;
pub mod preview;
pub mod retrievability;
pub mod review;
pub mod simulate;
