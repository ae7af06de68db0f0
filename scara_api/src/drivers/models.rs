/// One camera frame as fetched from `/video_feed`.
///
/// The panel only inspects size and content type to drive its feed-health
/// indicator; the pixels are for richer front ends.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl VideoFrame {
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}
