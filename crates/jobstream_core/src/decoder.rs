use crate::Frame;

/// Incremental decoder for the `\n`-delimited frame stream.
///
/// Transport chunks do not align with frame boundaries: one chunk may carry
/// zero, one, or several frames, and a frame may span two chunks. Bytes are
/// buffered until a `\n` is seen, so a line is only classified once it is
/// complete. Buffering bytes (not text) also keeps a multi-byte UTF-8
/// character split across chunks intact.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk, returning every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buf.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]);
            if let Some(frame) = Frame::parse(&text) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Drain a trailing line that was never `\n`-terminated.
    ///
    /// Frames are `\n`-terminated on the wire, so this normally yields
    /// nothing; it tolerates a peer that closed without the final newline.
    pub fn finish(&mut self) -> Option<Frame> {
        if self.buf.is_empty() {
            return None;
        }
        let text = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        Frame::parse(&text)
    }
}
