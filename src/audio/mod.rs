pub mod file;
pub mod frame;
pub mod wav;

pub use file::AudioFile;
pub use frame::{
    Frame, SpeakerId, BITS_PER_SAMPLE, BLOCK_ALIGN, CHANNELS, FRAME_BYTES, FRAME_DURATION_MS,
    SAMPLE_RATE,
};
pub use wav::{WaveformArtifact, WaveformWriter};
