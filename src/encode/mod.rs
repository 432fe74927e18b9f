pub(crate) mod engine;
pub(crate) mod ffmpeg;
pub(crate) mod progress;
