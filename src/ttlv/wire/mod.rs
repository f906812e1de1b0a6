//! The TTLV wire layer: the zero-copy item view, the append-only
//! encoder, the tree codec over both, and the stream framer.

mod encoder;
mod framer;
mod reader;
mod view;
mod writer;

pub use encoder::TtlvEncoder;
pub use framer::{MessageFramer, DEFAULT_MAX_MESSAGE_SIZE};
pub use reader::TtlvWireReader;
pub use view::{padded_length, StructureIter, TtlvView};
pub use writer::TtlvWireWriter;
