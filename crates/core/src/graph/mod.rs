pub mod transition;

pub use transition::TransitionGraph;
