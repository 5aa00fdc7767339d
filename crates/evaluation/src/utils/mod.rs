pub mod file_archiver;
pub mod frame_image;
pub mod mot;
