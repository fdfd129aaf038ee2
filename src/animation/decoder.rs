//! GIF container decoding into an immutable [`FrameSequence`].
//!
//! Frames inside a GIF are partial updates drawn over a logical screen, so
//! every decoded frame is composited onto a full-size RGBA canvas and the
//! canvas snapshot becomes the frame's bitmap. Frames that cannot be placed
//! on the canvas are dropped; the remaining frames keep container order.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use gif::{ColorOutput, DecodeOptions, DisposalMethod};

/// Delay used when a frame carries no positive delay of its own.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// Largest logical screen we are willing to allocate a canvas for.
pub const MAX_CANVAS_PIXELS: usize = 4096 * 4096;

/// RGBA8 bitmap.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Wrap raw RGBA pixels. Returns `None` if the length does not match.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Fully transparent bitmap.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// One still bitmap plus how long it stays on screen.
#[derive(Debug, Clone)]
pub struct Frame {
    image: Arc<Bitmap>,
    delay: Duration,
}

impl Frame {
    /// Create a frame. A zero delay is replaced by [`DEFAULT_FRAME_DELAY`].
    pub fn new(image: Arc<Bitmap>, delay: Duration) -> Self {
        let delay = if delay.is_zero() {
            DEFAULT_FRAME_DELAY
        } else {
            delay
        };
        Self { image, delay }
    }

    pub fn image(&self) -> &Arc<Bitmap> {
        &self.image
    }

    /// Display duration, always positive.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn delay_secs(&self) -> f64 {
        self.delay.as_secs_f64()
    }
}

/// Ordered, immutable frames decoded from one byte buffer.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    width: u32,
    height: u32,
    source_frames: usize,
}

impl FrameSequence {
    /// The degenerate "nothing to play" sequence.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a sequence from already decoded frames.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        let (width, height) = frames
            .first()
            .map_or((0, 0), |f| (f.image.width(), f.image.height()));
        let source_frames = frames.len();
        Self {
            frames,
            width,
            height,
            source_frames,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Logical screen size of the container.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of frames the container held, including skipped ones.
    pub fn source_frames(&self) -> usize {
        self.source_frames
    }

    /// Length of one full loop.
    pub fn total_duration(&self) -> Duration {
        self.frames.iter().map(Frame::delay).sum()
    }
}

/// Whole-container decode failures.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Not a GIF container: {0}")]
    Container(#[source] gif::DecodingError),
    #[error("Logical screen {width}x{height} exceeds the canvas limit")]
    TooLarge { width: u32, height: u32 },
    #[error("Container yielded no decodable frames ({skipped} skipped)")]
    NoFrames { skipped: usize },
}

/// Reasons a single frame is dropped from the sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("Frame has no local or global color table")]
    MissingPalette,
    #[error("Frame rect {width}x{height} at ({left}, {top}) lies outside the {screen_width}x{screen_height} screen")]
    OutOfBounds {
        left: u32,
        top: u32,
        width: u32,
        height: u32,
        screen_width: u32,
        screen_height: u32,
    },
    #[error("Frame buffer holds {actual} pixels, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("Palette index {index} out of range ({colors} colors)")]
    PaletteIndex { index: u8, colors: usize },
}

/// Decode `bytes`, returning an empty sequence on any whole-container failure.
pub fn decode_frames(bytes: &[u8]) -> FrameSequence {
    match try_decode_frames(bytes) {
        Ok(sequence) => sequence,
        Err(e) => {
            log::debug!("No playable frames in {} byte buffer: {}", bytes.len(), e);
            FrameSequence::empty()
        }
    }
}

/// Decode `bytes`, reporting why nothing could be played.
pub fn try_decode_frames(bytes: &[u8]) -> Result<FrameSequence, DecodeError> {
    let mut options = DecodeOptions::new();
    options.set_color_output(ColorOutput::Indexed);
    let mut decoder = options.read_info(bytes).map_err(DecodeError::Container)?;

    let (width, height) = (u32::from(decoder.width()), u32::from(decoder.height()));
    if width as usize * height as usize > MAX_CANVAS_PIXELS {
        return Err(DecodeError::TooLarge { width, height });
    }
    let mut canvas = Canvas::new(width, height);
    let global_palette = decoder.global_palette().map(<[u8]>::to_vec);

    let mut frames = Vec::new();
    let mut source_frames = 0usize;

    loop {
        let frame = match decoder.read_next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                // Truncated or corrupt stream: keep what we already have
                log::warn!("GIF stream error after {} frames: {}", source_frames, e);
                break;
            }
        };
        let index = source_frames;
        source_frames += 1;

        match canvas.composite(frame, global_palette.as_deref()) {
            Ok(image) => frames.push(Frame::new(
                Arc::new(image),
                delay_from_centiseconds(frame.delay),
            )),
            Err(e) => log::debug!("Skipping GIF frame {}: {}", index, e),
        }
    }

    if frames.is_empty() {
        return Err(DecodeError::NoFrames {
            skipped: source_frames,
        });
    }

    log::debug!(
        "Decoded GIF: {}x{}, {}/{} frames",
        canvas.width,
        canvas.height,
        frames.len(),
        source_frames
    );

    Ok(FrameSequence {
        frames,
        width: canvas.width,
        height: canvas.height,
        source_frames,
    })
}

/// GIF delays are in hundredths of a second.
fn delay_from_centiseconds(delay: u16) -> Duration {
    if delay == 0 {
        DEFAULT_FRAME_DELAY
    } else {
        Duration::from_millis(u64::from(delay) * 10)
    }
}

/// Accumulated logical screen.
struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Draw `frame`, snapshot the canvas, then apply the frame's disposal.
    ///
    /// On error the canvas is left untouched.
    fn composite(
        &mut self,
        frame: &gif::Frame<'_>,
        global_palette: Option<&[u8]>,
    ) -> Result<Bitmap, FrameError> {
        let palette = frame
            .palette
            .as_deref()
            .or(global_palette)
            .ok_or(FrameError::MissingPalette)?;

        let left = u32::from(frame.left);
        let top = u32::from(frame.top);
        let width = u32::from(frame.width);
        let height = u32::from(frame.height);

        if left + width > self.width || top + height > self.height {
            return Err(FrameError::OutOfBounds {
                left,
                top,
                width,
                height,
                screen_width: self.width,
                screen_height: self.height,
            });
        }

        let expected = width as usize * height as usize;
        if frame.buffer.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: frame.buffer.len(),
            });
        }

        let colors = palette.len() / 3;
        if let Some(&index) = frame
            .buffer
            .iter()
            .find(|&&i| Some(i) != frame.transparent && usize::from(i) >= colors)
        {
            return Err(FrameError::PaletteIndex { index, colors });
        }

        let saved = matches!(frame.dispose, DisposalMethod::Previous).then(|| self.pixels.clone());

        for row in 0..height {
            for col in 0..width {
                let index = frame.buffer[(row * width + col) as usize];
                if Some(index) == frame.transparent {
                    continue;
                }
                let c = usize::from(index) * 3;
                let dst = (((top + row) * self.width + left + col) * 4) as usize;
                self.pixels[dst..dst + 4]
                    .copy_from_slice(&[palette[c], palette[c + 1], palette[c + 2], 255]);
            }
        }

        let image = Bitmap {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        };

        match frame.dispose {
            DisposalMethod::Background => self.clear_rect(left, top, width, height),
            DisposalMethod::Previous => {
                if let Some(saved) = saved {
                    self.pixels = saved;
                }
            }
            _ => {}
        }

        Ok(image)
    }

    fn clear_rect(&mut self, left: u32, top: u32, width: u32, height: u32) {
        for row in top..top + height {
            let start = ((row * self.width + left) * 4) as usize;
            let end = start + width as usize * 4;
            self.pixels[start..end].fill(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::test_support::{FixtureFrame, PALETTE, SIZE, encode_gif};
    use proptest::prelude::*;
    use std::borrow::Cow;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn raw_frame(width: u16, height: u16, buffer: Vec<u8>) -> gif::Frame<'static> {
        let mut frame = gif::Frame::default();
        frame.width = width;
        frame.height = height;
        frame.buffer = Cow::Owned(buffer);
        frame
    }

    #[test]
    fn test_decode_three_frames() {
        let bytes = encode_gif(&[
            FixtureFrame::solid(1, 10),
            FixtureFrame::solid(2, 20),
            FixtureFrame::solid(3, 5),
        ]);

        let sequence = try_decode_frames(&bytes).unwrap();
        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.source_frames(), 3);
        assert_eq!(sequence.dimensions(), (u32::from(SIZE), u32::from(SIZE)));

        let delays: Vec<_> = sequence.frames().iter().map(Frame::delay).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(50)
            ]
        );
        assert_eq!(sequence.total_duration(), Duration::from_millis(350));

        assert_eq!(sequence.get(0).unwrap().image().pixel(0, 0), Some(RED));
        assert_eq!(sequence.get(1).unwrap().image().pixel(1, 1), Some(GREEN));
        assert_eq!(sequence.get(2).unwrap().image().pixel(3, 3), Some(BLUE));
    }

    #[test]
    fn test_zero_delay_uses_default() {
        let bytes = encode_gif(&[FixtureFrame::solid(1, 0), FixtureFrame::solid(2, 7)]);
        let sequence = decode_frames(&bytes);

        assert_eq!(sequence.get(0).unwrap().delay(), DEFAULT_FRAME_DELAY);
        assert_eq!(sequence.get(1).unwrap().delay(), Duration::from_millis(70));
        assert!((sequence.get(0).unwrap().delay_secs() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_frame_new_never_zero_delay() {
        let frame = Frame::new(Arc::new(Bitmap::blank(1, 1)), Duration::ZERO);
        assert_eq!(frame.delay(), DEFAULT_FRAME_DELAY);
    }

    #[test]
    fn test_empty_buffer() {
        assert!(matches!(
            try_decode_frames(&[]),
            Err(DecodeError::Container(_))
        ));
        assert!(decode_frames(&[]).is_empty());
    }

    #[test]
    fn test_not_a_gif() {
        let sequence = decode_frames(b"\x89PNG\r\n\x1a\nnot really");
        assert!(sequence.is_empty());
        assert_eq!(sequence.source_frames(), 0);
    }

    #[test]
    fn test_single_frame_still() {
        let bytes = encode_gif(&[FixtureFrame::solid(2, 0)]);
        let sequence = decode_frames(&bytes);
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence.get(0).unwrap().delay(), DEFAULT_FRAME_DELAY);
    }

    #[test]
    fn test_undecodable_frame_is_skipped() {
        let bytes = encode_gif(&[
            FixtureFrame::solid(1, 10),
            FixtureFrame::solid(2, 10),
            FixtureFrame::solid(3, 10).offset(64, 64),
            FixtureFrame::solid(0, 10),
            FixtureFrame::solid(1, 20),
        ]);

        let sequence = decode_frames(&bytes);
        assert_eq!(sequence.source_frames(), 5);
        assert_eq!(sequence.len(), 4);

        let colors: Vec<_> = sequence
            .frames()
            .iter()
            .map(|f| f.image().pixel(0, 0).unwrap())
            .collect();
        assert_eq!(colors, vec![RED, GREEN, [0, 0, 0, 255], RED]);
        assert_eq!(sequence.get(3).unwrap().delay(), Duration::from_millis(200));
    }

    #[test]
    fn test_all_frames_undecodable() {
        let bytes = encode_gif(&[FixtureFrame::solid(1, 10).offset(32, 0)]);
        assert!(matches!(
            try_decode_frames(&bytes),
            Err(DecodeError::NoFrames { skipped: 1 })
        ));
    }

    #[test]
    fn test_truncated_keeps_prefix() {
        let bytes = encode_gif(&[
            FixtureFrame::solid(1, 10),
            FixtureFrame::solid(2, 10),
            FixtureFrame::solid(3, 10),
        ]);
        for cut in [bytes.len() / 3, bytes.len() / 2, bytes.len() - 2] {
            let sequence = decode_frames(&bytes[..cut]);
            assert!(sequence.len() <= 3);
            assert!(sequence.len() <= sequence.source_frames());
        }
    }

    #[test]
    fn test_partial_frame_composites_over_previous() {
        let bytes = encode_gif(&[
            FixtureFrame::solid(1, 10),
            FixtureFrame::solid(3, 10).sized(2, 2).offset(2, 2),
        ]);
        let sequence = decode_frames(&bytes);
        let second = sequence.get(1).unwrap().image();

        assert_eq!(second.pixel(0, 0), Some(RED));
        assert_eq!(second.pixel(3, 3), Some(BLUE));
        assert_eq!(second.width(), u32::from(SIZE));
    }

    #[test]
    fn test_composite_missing_palette() {
        let mut canvas = Canvas::new(2, 2);
        let frame = raw_frame(2, 2, vec![0; 4]);
        assert_eq!(
            canvas.composite(&frame, None).unwrap_err(),
            FrameError::MissingPalette
        );
    }

    #[test]
    fn test_composite_bad_palette_index() {
        let mut canvas = Canvas::new(2, 2);
        let frame = raw_frame(2, 2, vec![0, 1, 2, 9]);
        assert_eq!(
            canvas.composite(&frame, Some(&PALETTE[..])).unwrap_err(),
            FrameError::PaletteIndex {
                index: 9,
                colors: 4
            }
        );
        // Canvas untouched
        assert!(canvas.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_composite_buffer_size() {
        let mut canvas = Canvas::new(2, 2);
        let frame = raw_frame(2, 2, vec![0; 3]);
        assert_eq!(
            canvas.composite(&frame, Some(&PALETTE[..])).unwrap_err(),
            FrameError::BufferSize {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_composite_transparency_and_disposal() {
        let mut canvas = Canvas::new(2, 1);

        let base = raw_frame(2, 1, vec![1, 1]);
        canvas.composite(&base, Some(&PALETTE[..])).unwrap();

        // Transparent index leaves the red pixel visible
        let mut overlay = raw_frame(2, 1, vec![0, 2]);
        overlay.transparent = Some(0);
        overlay.dispose = DisposalMethod::Previous;
        let image = canvas.composite(&overlay, Some(&PALETTE[..])).unwrap();
        assert_eq!(image.pixel(0, 0), Some(RED));
        assert_eq!(image.pixel(1, 0), Some(GREEN));

        // Previous restores the canvas before the overlay
        assert_eq!(&canvas.pixels[4..8], &RED);

        let mut cleared = raw_frame(1, 1, vec![3]);
        cleared.dispose = DisposalMethod::Background;
        let image = canvas.composite(&cleared, Some(&PALETTE[..])).unwrap();
        assert_eq!(image.pixel(0, 0), Some(BLUE));
        assert_eq!(&canvas.pixels[0..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_bitmap_new_checks_length() {
        assert!(Bitmap::new(2, 2, vec![0; 16]).is_some());
        assert!(Bitmap::new(2, 2, vec![0; 15]).is_none());
        assert_eq!(Bitmap::blank(3, 1).pixel(3, 0), None);
    }

    proptest! {
        #[test]
        fn prop_arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let sequence = decode_frames(&bytes);
            prop_assert!(sequence.len() <= sequence.source_frames());
            for frame in sequence.frames() {
                prop_assert!(frame.delay() > Duration::ZERO);
            }
        }

        #[test]
        fn prop_delays_are_positive(delays in proptest::collection::vec(0u16..50, 1..6)) {
            let frames: Vec<_> = delays.iter().map(|&d| FixtureFrame::solid(1, d)).collect();
            let sequence = decode_frames(&encode_gif(&frames));
            prop_assert_eq!(sequence.len(), delays.len());
            for (frame, &cs) in sequence.frames().iter().zip(&delays) {
                let expected = if cs == 0 {
                    DEFAULT_FRAME_DELAY
                } else {
                    Duration::from_millis(u64::from(cs) * 10)
                };
                prop_assert_eq!(frame.delay(), expected);
            }
        }
    }
}
