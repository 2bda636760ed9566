mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;
