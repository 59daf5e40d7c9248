//! Leaf sequences: self-contained timed effects.

mod map_reveal;
mod message;
mod title;

pub use map_reveal::MapRevealSequence;
pub use message::{AsyncMessageRevealSequence, MessagePart, MessageRevealSequence, parse_message};
pub use title::TitleRevealSequence;
