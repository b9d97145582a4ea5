mod matching;
mod merge;
mod normalize;
mod run;
mod segment;
mod snippet;
mod split;

pub use run::run;
pub use segment::Segmenter;
