//! Wire-level protocol pieces shared by the streaming codecs.

pub mod assembler;
pub mod frame;
pub mod length;
pub mod mask;
pub mod opcode;

pub use assembler::MessageAssembler;
pub use frame::{FrameHeader, MAX_CONTROL_PAYLOAD, write_frame};
pub use length::{
    PayloadLength, decode_hixie_length, decode_payload_length, encode_hixie_length,
    encode_payload_length,
};
pub use mask::apply_mask;
pub use opcode::OpCode;
