mod ffprobe_info;
mod format;
mod path_validator;
mod video_scanner;

pub use ffprobe_info::{
    FfprobeProbe, MediaProbe, Resolution, THUMBNAIL_WIDTH, Thumbnail, parse_duration,
    parse_resolution,
};
pub use format::{format_duration, format_size};
pub use path_validator::{validate_directory_exists, validate_output_parent};
pub use video_scanner::scan_video_files;
