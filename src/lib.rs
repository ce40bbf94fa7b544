pub mod cd;
pub mod cue;
pub mod wav;
